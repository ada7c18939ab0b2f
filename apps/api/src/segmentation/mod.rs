//! Prompt segmentation.
//!
//! The backend's `/prompt/submit` is the authority. `extractor` is the
//! local fallback, also used directly by the live socket where a round trip
//! per keystroke pause is too slow.

pub mod debounce;
pub mod extractor;
pub mod handlers;
pub mod keywords;
pub mod live;

use async_trait::async_trait;
use tracing::warn;

use crate::backend_client::wire::{PromptSubmitRequest, PromptSubmitResponse};
use crate::backend_client::{BackendClient, BackendError};
use crate::models::segment::SegmentedPrompt;
use crate::state::heuristic_rng;

use self::extractor::extract_segments;

/// Source of authoritative segmentations. Carried in `AppState` as
/// `Arc<dyn Segmenter>`.
#[async_trait]
pub trait Segmenter: Send + Sync {
    async fn segment(&self, prompt: &str, session_id: &str)
        -> Result<SegmentedPrompt, BackendError>;
}

/// Asks the PromptLens backend's `/prompt/submit`.
pub struct BackendSegmenter(pub BackendClient);

#[async_trait]
impl Segmenter for BackendSegmenter {
    async fn segment(
        &self,
        prompt: &str,
        session_id: &str,
    ) -> Result<SegmentedPrompt, BackendError> {
        let body = PromptSubmitRequest {
            prompt,
            session_id,
            generation_type: "text",
        };
        let response: PromptSubmitResponse = self.0.post_json("/prompt/submit", &body).await?;
        Ok(response.into_segmented(session_id))
    }
}

/// Backend segmentation, or the keyword heuristic when the backend fails.
pub async fn segment_with_fallback(
    segmenter: &dyn Segmenter,
    prompt: &str,
    session_id: &str,
    seed: Option<u64>,
) -> SegmentedPrompt {
    match segmenter.segment(prompt, session_id).await {
        Ok(segmented) => segmented,
        Err(e) => {
            warn!(session_id, "segmentation falling back to heuristic: {e}");
            let mut segmented = extract_segments(prompt, session_id, &mut heuristic_rng(seed));
            segmented.fallback_reason = Some(e.to_string());
            segmented
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;

    use super::*;
    use crate::models::segment::{
        Category, Segment, SegmentMetadata, SegmentType, SegmentationSource,
    };

    /// Always fails, as an unreachable backend would.
    pub struct DownSegmenter;

    #[async_trait]
    impl Segmenter for DownSegmenter {
        async fn segment(
            &self,
            _prompt: &str,
            _session_id: &str,
        ) -> Result<SegmentedPrompt, BackendError> {
            Err(BackendError::RetriesExhausted { retries: 3 })
        }
    }

    /// Answers with the whole prompt as one backend `Subject` segment.
    pub struct FixedSegmenter;

    #[async_trait]
    impl Segmenter for FixedSegmenter {
        async fn segment(
            &self,
            prompt: &str,
            session_id: &str,
        ) -> Result<SegmentedPrompt, BackendError> {
            Ok(SegmentedPrompt {
                session_id: session_id.to_string(),
                original_prompt: prompt.to_string(),
                segments: vec![Segment {
                    id: "backend-0".to_string(),
                    text: prompt.to_string(),
                    segment_type: SegmentType::for_text(prompt),
                    start_index: 0,
                    end_index: prompt.chars().count(),
                    metadata: SegmentMetadata {
                        category: Category::Subject,
                        importance: 0.9,
                        confidence: Some(0.85),
                        color: Category::Subject.color().to_string(),
                    },
                }],
                created_at: Utc::now(),
                source: SegmentationSource::Backend,
                fallback_reason: None,
            })
        }
    }
}
