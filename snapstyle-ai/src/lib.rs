//! # SnapStyle AI
//!
//! Generative background adapter. The editor core knows nothing about the
//! provider: this crate takes an image from the session, asks an
//! [`ImageGenerator`] for a new version, optionally keys out the flat
//! background, and hands the result back to the session.
//!
//! ```text
//! BackgroundJob::start ──▶ ImageGenerator::generate ──▶ chroma key ──▶ finish
//!  (busy flag, source)       (HTTP or fake)              (optional)    (replace)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod chroma;
pub mod client;
pub mod error;
pub mod job;
pub mod prompt;

pub use chroma::{chroma_key, key_out_background, HARD_THRESHOLD, SOFT_THRESHOLD};
pub use client::{AiModel, GenerationRequest, GeneratorConfig, HttpImageGenerator, ImageGenerator};
pub use error::{AiError, AiResult};
pub use job::{generate_or_edit_background, BackgroundJob};
pub use prompt::{background_prompt, KEY_COLOR};
