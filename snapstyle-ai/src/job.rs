//! Background generation jobs.
//!
//! A job is split around the one await point so the session is never
//! borrowed while the provider works:
//!
//! 1. [`BackgroundJob::start`] checks the busy flag, picks the source image
//!    and builds the request.
//! 2. [`BackgroundJob::run`] talks to the provider and post-processes the
//!    result. It does not touch the session.
//! 3. [`BackgroundJob::finish`] clears the busy flag and applies the result.
//!    The image to replace is looked up again at this point, since the user
//!    may have deleted it in the meantime.

use snapstyle_core::{EditorSession, ObjectId, ObjectKindTag, RasterImage, SceneObject};
use snapstyle_renderer::{encode_png, load_image_from_bytes};
use tracing::{debug, info, warn};

use crate::chroma::key_out_background;
use crate::client::{GenerationRequest, ImageGenerator};
use crate::error::{AiError, AiResult};
use crate::prompt::background_prompt;

/// An in-flight background request.
#[derive(Debug, Clone)]
pub struct BackgroundJob {
    request: GenerationRequest,
    transparent: bool,
    target: Option<ObjectId>,
}

/// The selected image, or failing that the most recently added one.
fn source_image(session: &EditorSession) -> Option<ObjectId> {
    session
        .selected()
        .filter(|o| o.kind_tag() == ObjectKindTag::Image)
        .map(|o| o.id)
        .or_else(|| session.scene().most_recent_image())
}

impl BackgroundJob {
    /// Mark the session busy and prepare the request.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Busy`] while another job is running, or an encoding
    /// error for the source image. The session is left idle on error.
    pub fn start(session: &mut EditorSession, transparent: bool) -> AiResult<Self> {
        if session.is_ai_busy() {
            return Err(AiError::Busy);
        }

        let target = source_image(session);
        let source = target
            .and_then(|id| session.scene().get(id))
            .and_then(SceneObject::raster);
        let source_png = match source {
            Some(raster) => Some(encode_png(raster)?),
            None => None,
        };

        if !session.begin_ai_request() {
            return Err(AiError::Busy);
        }
        debug!(?target, transparent, "background job started");

        Ok(Self {
            request: GenerationRequest {
                prompt: background_prompt(transparent, source_png.is_some()),
                source_png,
            },
            transparent,
            target,
        })
    }

    /// Request sent to the provider.
    #[must_use]
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// Image chosen as the source when the job started.
    #[must_use]
    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    /// Whether the background is keyed out after generation.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Call the provider and decode its answer.
    ///
    /// # Errors
    ///
    /// Returns provider errors, [`AiError::NoImageGenerated`], or
    /// [`AiError::Decode`] for undecodable bytes.
    pub async fn run(&self, generator: &dyn ImageGenerator) -> AiResult<RasterImage> {
        let bytes = generator.generate(&self.request).await?;
        let image = load_image_from_bytes(&bytes).map_err(|e| AiError::Decode(e.to_string()))?;
        Ok(if self.transparent {
            key_out_background(image)
        } else {
            image
        })
    }

    /// Release the busy flag and put the result on the canvas.
    ///
    /// The new image takes the place of the source image if it still exists,
    /// otherwise of the most recent image; with no image left it is added as
    /// a fresh upload. Either way it becomes the active object. On error the
    /// scene is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the job's error, or a scene error while placing the image.
    pub fn finish(
        self,
        session: &mut EditorSession,
        result: AiResult<RasterImage>,
    ) -> AiResult<ObjectId> {
        session.end_ai_request();
        let image = result.inspect_err(|err| warn!(%err, "background job failed"))?;

        let target = self
            .target
            .filter(|id| session.scene().contains(*id))
            .or_else(|| session.scene().most_recent_image());

        let id = match target {
            Some(old) => replace_image(session, old, image)?,
            None => session.add_image(image)?,
        };
        info!(%id, replaced = ?target, transparent = self.transparent, "background applied");
        Ok(id)
    }
}

/// Put `image` where `old` is, matching its on-canvas width and center.
fn replace_image(
    session: &mut EditorSession,
    old: ObjectId,
    image: RasterImage,
) -> AiResult<ObjectId> {
    let Some(previous) = session.scene().get(old) else {
        return Ok(session.add_image(image)?);
    };

    let mut object = SceneObject::image(image);
    let (old_w, _) = previous.rendered_size();
    let (new_w, _) = object.base_size();
    let scale = if new_w > 0.0 { old_w / new_w } else { 1.0 };
    object.scale_x = scale;
    object.scale_y = scale;
    object.rotation = previous.rotation;
    object.opacity = previous.opacity;
    object.shadow = previous.shadow;
    object.set_center(previous.center());

    let id = session.replace(old, object)?;
    session.select(Some(id))?;
    Ok(id)
}

/// Generate or edit the background in one call.
///
/// Holds the session across the provider call, so it suits hosts that drive
/// the editor from a single task. Hosts that keep handling input meanwhile
/// should use [`BackgroundJob`] directly.
///
/// # Errors
///
/// See [`BackgroundJob::start`], [`BackgroundJob::run`] and
/// [`BackgroundJob::finish`].
pub async fn generate_or_edit_background(
    session: &mut EditorSession,
    generator: &dyn ImageGenerator,
    transparent: bool,
) -> AiResult<ObjectId> {
    let job = BackgroundJob::start(session, transparent)?;
    let result = job.run(generator).await;
    job.finish(session, result)
}
