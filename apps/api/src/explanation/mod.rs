//! Explanations: segment → output attributions.
//!
//! The backend is the authority. When it cannot answer, the heuristic
//! approximators in `text` and `image` stand in, and the result is tagged
//! `ExplanationSource::Heuristic` with the reason the backend was skipped.
//! A successful backend answer is never replaced.

pub mod handlers;
pub mod image;
pub mod text;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend_client::wire::{wire_segments, ImageExplainResponse, TextExplainResponse};
use crate::backend_client::{BackendClient, BackendError};
use crate::models::explanation::{ImageExplanation, TextExplanation};
use crate::models::segment::Segment;
use crate::state::heuristic_rng;

use self::image::approximate_image_explanation;
use self::text::approximate_text_explanation;

const DEFAULT_IMAGE_SIZE: u32 = 512;

fn default_image_size() -> u32 {
    DEFAULT_IMAGE_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextExplainRequest {
    pub session_id: String,
    pub generated_text: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageExplainRequest {
    pub session_id: String,
    pub image_url: String,
    pub segments: Vec<Segment>,
    #[serde(default = "default_image_size")]
    pub width: u32,
    #[serde(default = "default_image_size")]
    pub height: u32,
}

/// Source of authoritative explanations. Carried in `AppState` as
/// `Arc<dyn Explainer>`.
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain_text(&self, req: &TextExplainRequest)
        -> Result<TextExplanation, BackendError>;

    async fn explain_image(
        &self,
        req: &ImageExplainRequest,
    ) -> Result<ImageExplanation, BackendError>;
}

/// Asks the PromptLens backend's `/explain/*` endpoints.
pub struct BackendExplainer(pub BackendClient);

#[async_trait]
impl Explainer for BackendExplainer {
    async fn explain_text(
        &self,
        req: &TextExplainRequest,
    ) -> Result<TextExplanation, BackendError> {
        let body = crate::backend_client::wire::TextExplainRequest {
            session_id: &req.session_id,
            generated_text: &req.generated_text,
            segments: wire_segments(&req.segments),
        };
        let response: TextExplainResponse = self.0.post_json("/explain/text", &body).await?;
        Ok(response.into())
    }

    async fn explain_image(
        &self,
        req: &ImageExplainRequest,
    ) -> Result<ImageExplanation, BackendError> {
        let body = crate::backend_client::wire::ImageExplainRequest {
            session_id: &req.session_id,
            image_url: &req.image_url,
            segments: wire_segments(&req.segments),
        };
        let response: ImageExplainResponse = self.0.post_json("/explain/image", &body).await?;
        Ok(response.into_explanation(req.width, req.height))
    }
}

/// Backend explanation, or the token-overlap approximation when the backend
/// fails.
pub async fn explain_text_with_fallback(
    explainer: &dyn Explainer,
    req: &TextExplainRequest,
    seed: Option<u64>,
) -> TextExplanation {
    match explainer.explain_text(req).await {
        Ok(explanation) => explanation,
        Err(e) => {
            warn!(session_id = %req.session_id, "text explanation falling back to heuristic: {e}");
            let mut rng = heuristic_rng(seed);
            let mut explanation =
                approximate_text_explanation(&req.segments, &req.generated_text, &mut rng);
            explanation.fallback_reason = Some(e.to_string());
            explanation
        }
    }
}

/// Backend explanation, or a synthetic radial heatmap when the backend fails.
pub async fn explain_image_with_fallback(
    explainer: &dyn Explainer,
    req: &ImageExplainRequest,
    seed: Option<u64>,
) -> ImageExplanation {
    match explainer.explain_image(req).await {
        Ok(explanation) => explanation,
        Err(e) => {
            warn!(session_id = %req.session_id, "image explanation falling back to heuristic: {e}");
            let mut rng = heuristic_rng(seed);
            let mut explanation =
                approximate_image_explanation(&req.segments, req.width, req.height, &mut rng);
            explanation.fallback_reason = Some(e.to_string());
            explanation
        }
    }
}
