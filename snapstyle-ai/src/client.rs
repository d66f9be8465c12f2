//! Image generation providers.
//!
//! [`ImageGenerator`] is the seam between the editor and whatever service
//! produces pictures. [`HttpImageGenerator`] speaks a generateContent-style
//! JSON API: one text part, optionally one inline PNG, and an inline image in
//! the reply.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use snapstyle_renderer::ImageFormat;
use tracing::{debug, info};
use url::Url;

use crate::error::{AiError, AiResult};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "SNAPSTYLE_AI_API_KEY";
/// Environment variable overriding the endpoint.
pub const ENV_ENDPOINT: &str = "SNAPSTYLE_AI_ENDPOINT";
/// Environment variable selecting the model (`flash` or `pro`).
pub const ENV_MODEL: &str = "SNAPSTYLE_AI_MODEL";

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// One generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Instruction text.
    pub prompt: String,
    /// Source image as PNG bytes, absent for text-to-image.
    pub source_png: Option<Vec<u8>>,
}

/// Something that turns a request into image bytes.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Produce an encoded image (PNG, JPEG, ...) for the request.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::NoImageGenerated`] when the provider answered
    /// without an image, or any transport/provider error.
    async fn generate(&self, request: &GenerationRequest) -> AiResult<Vec<u8>>;
}

/// Model tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiModel {
    /// Fast model.
    #[default]
    Flash,
    /// Higher quality model.
    Pro,
}

impl AiModel {
    /// Model path segment on the provider.
    #[must_use]
    pub fn model_name(self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash-image",
            Self::Pro => "gemini-3-pro-image-preview",
        }
    }
}

impl FromStr for AiModel {
    type Err = AiError;

    fn from_str(s: &str) -> AiResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "flash" => Ok(Self::Flash),
            "pro" => Ok(Self::Pro),
            other => Err(AiError::InvalidConfig(format!("unknown model '{other}'"))),
        }
    }
}

impl fmt::Display for AiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flash => write!(f, "flash"),
            Self::Pro => write!(f, "pro"),
        }
    }
}

/// Connection settings for [`HttpImageGenerator`].
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Base endpoint; model paths are resolved against it.
    pub endpoint: Url,
    /// API key sent with each request.
    pub api_key: String,
    /// Model tier.
    pub model: AiModel,
}

impl GeneratorConfig {
    /// Build a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::InvalidConfig`] for a malformed endpoint or an empty key.
    pub fn new(endpoint: &str, api_key: impl Into<String>, model: AiModel) -> AiResult<Self> {
        let mut endpoint =
            Url::parse(endpoint).map_err(|e| AiError::InvalidConfig(format!("endpoint: {e}")))?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AiError::InvalidConfig("API key is empty".to_string()));
        }
        Ok(Self {
            endpoint,
            api_key,
            model,
        })
    }

    /// Read the configuration from `SNAPSTYLE_AI_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::InvalidConfig`] if the key is missing or a value is invalid.
    pub fn from_env() -> AiResult<Self> {
        let api_key = std::env::var(ENV_API_KEY)
            .map_err(|_| AiError::InvalidConfig(format!("{ENV_API_KEY} is not set")))?;
        let endpoint = std::env::var(ENV_ENDPOINT).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = match std::env::var(ENV_MODEL) {
            Ok(value) => value.parse()?,
            Err(_) => AiModel::default(),
        };
        Self::new(&endpoint, api_key, model)
    }

    /// Full URL of the generate call for the configured model.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::InvalidConfig`] if the URL cannot be joined.
    pub fn generate_url(&self) -> AiResult<Url> {
        self.endpoint
            .join(&format!("models/{}:generateContent", self.model.model_name()))
            .map_err(|e| AiError::InvalidConfig(format!("endpoint: {e}")))
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(alias = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

fn build_request(request: &GenerationRequest) -> GenerateRequest {
    let mut parts = vec![Part {
        text: Some(request.prompt.clone()),
        inline_data: None,
    }];
    if let Some(png) = &request.source_png {
        parts.push(Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/png".to_string(),
                data: base64::engine::general_purpose::STANDARD.encode(png),
            }),
        });
    }
    GenerateRequest {
        contents: vec![Content { parts }],
    }
}

/// First inline image of the first candidate. Inline parts of other media
/// types are passed over.
fn extract_image(response: &GenerateResponse) -> AiResult<Vec<u8>> {
    let inline = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|c| {
            c.parts
                .iter()
                .filter_map(|p| p.inline_data.as_ref())
                .find(|d| ImageFormat::from_mime(&d.mime_type) != ImageFormat::Unknown)
        })
        .ok_or(AiError::NoImageGenerated)?;

    base64::engine::general_purpose::STANDARD
        .decode(inline.data.trim())
        .map_err(|e| AiError::Decode(format!("base64: {e}")))
}

fn check_status(status: StatusCode, body: &str) -> AiResult<()> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(AiError::PermissionDenied {
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown").to_string()
        } else {
            body.trim().to_string()
        };
        return Err(AiError::Provider {
            status: status.as_u16(),
            message,
        });
    }
    Ok(())
}

/// HTTP provider client.
#[derive(Clone)]
pub struct HttpImageGenerator {
    http: Client,
    config: GeneratorConfig,
}

impl HttpImageGenerator {
    /// Create a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the HTTP client fails to build.
    pub fn new(config: GeneratorConfig) -> AiResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("snapstyle/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// Create a client configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment is incomplete.
    pub fn from_env() -> AiResult<Self> {
        Self::new(GeneratorConfig::from_env()?)
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl fmt::Debug for HttpImageGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpImageGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    async fn generate(&self, request: &GenerationRequest) -> AiResult<Vec<u8>> {
        let url = self.config.generate_url()?;
        debug!(
            model = %self.config.model,
            with_source = request.source_png.is_some(),
            "sending generation request"
        );

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&build_request(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_status(status, &body)?;

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        let bytes = extract_image(&parsed)?;
        info!(bytes = bytes.len(), model = %self.config.model, "received generated image");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_prompt_and_source() {
        let request = GenerationRequest {
            prompt: "make it pop".to_string(),
            source_png: Some(vec![1, 2, 3]),
        };
        let json = serde_json::to_value(build_request(&request)).expect("json");
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "make it pop");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "AQID");
        assert!(parts[0].get("inlineData").is_none());
    }

    #[test]
    fn test_text_only_request_has_one_part() {
        let request = GenerationRequest {
            prompt: "a cat".to_string(),
            source_png: None,
        };
        let json = serde_json::to_value(build_request(&request)).expect("json");
        assert_eq!(json["contents"][0]["parts"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_extract_first_inline_image() {
        let body = r#"{"candidates":[{"content":{"parts":[
            {"text":"here you go"},
            {"inline_data":{"mime_type":"image/png","data":"AQID"}},
            {"inlineData":{"mimeType":"image/png","data":"BAUG"}}
        ]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(extract_image(&parsed).expect("image"), vec![1, 2, 3]);
    }

    #[test]
    fn test_non_image_inline_parts_are_skipped() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"inlineData":{"mimeType":"application/json","data":"e30="}},
                {"inlineData":{"mimeType":"image/webp","data":"BAUG"}}
            ]}}]
        }))
        .expect("response");
        assert_eq!(extract_image(&response).expect("image"), vec![4, 5, 6]);

        let only_audio: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"inlineData":{"mimeType":"audio/wav","data":"AQID"}}
            ]}}]
        }))
        .expect("response");
        assert!(matches!(extract_image(&only_audio), Err(AiError::NoImageGenerated)));
    }

    #[test]
    fn test_missing_image_is_soft_failure() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#)
                .expect("parse");
        assert!(matches!(extract_image(&parsed), Err(AiError::NoImageGenerated)));

        let empty: GenerateResponse = serde_json::from_str("{}").expect("parse");
        assert!(matches!(extract_image(&empty), Err(AiError::NoImageGenerated)));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, ""),
            Err(AiError::PermissionDenied { status: 403 })
        ));
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, "no"),
            Err(AiError::PermissionDenied { status: 401 })
        ));
        assert!(matches!(
            check_status(StatusCode::INTERNAL_SERVER_ERROR, ""),
            Err(AiError::Provider { status: 500, .. })
        ));
        assert!(check_status(StatusCode::OK, "{}").is_ok());
    }

    #[test]
    fn test_config_resolves_model_url() {
        let config = GeneratorConfig::new("https://example.com/v1beta", "secret", AiModel::Pro)
            .expect("config");
        let url = config.generate_url().expect("url");
        assert_eq!(
            url.as_str(),
            "https://example.com/v1beta/models/gemini-3-pro-image-preview:generateContent"
        );
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(GeneratorConfig::new("not a url", "key", AiModel::Flash).is_err());
        assert!(GeneratorConfig::new(DEFAULT_ENDPOINT, "  ", AiModel::Flash).is_err());
        assert_eq!("PRO".parse::<AiModel>().expect("model"), AiModel::Pro);
        assert!("turbo".parse::<AiModel>().is_err());
    }
}
