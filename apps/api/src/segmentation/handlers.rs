//! Axum route handlers for the Segmentation API.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::segment::{Category, SegmentedPrompt};
use crate::segmentation::segment_with_fallback;
use crate::state::AppState;

/// Longest prompt accepted, in characters.
pub const MAX_PROMPT_CHARS: usize = 4000;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRequest {
    pub prompt: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSegmentRequest {
    pub segmented: SegmentedPrompt,
    pub segment_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/prompt/segment
///
/// Segments a prompt through the backend, falling back to the keyword
/// heuristic. A session id is minted when the caller has none.
pub async fn handle_segment(
    State(state): State<AppState>,
    Json(request): Json<SegmentRequest>,
) -> Result<Json<SegmentedPrompt>, AppError> {
    check_prompt_length(&request.prompt)?;

    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let segmented = segment_with_fallback(
        state.segmenter.as_ref(),
        &request.prompt,
        &session_id,
        state.config.heuristic_seed,
    )
    .await;
    info!(
        session_id = %segmented.session_id,
        source = ?segmented.source,
        "Segmented prompt into {} segments",
        segmented.segments.len()
    );

    Ok(Json(segmented))
}

/// POST /api/v1/prompt/segment/edit
///
/// Applies a user correction to one segment's text or category and returns
/// the updated snapshot.
pub async fn handle_edit_segment(
    Json(request): Json<EditSegmentRequest>,
) -> Result<Json<SegmentedPrompt>, AppError> {
    let mut segmented = request.segmented;
    segmented.edit_segment(
        &request.segment_id,
        request.text.as_deref(),
        request.category,
    )?;
    Ok(Json(segmented))
}

pub(crate) fn check_prompt_length(prompt: &str) -> Result<(), AppError> {
    let chars = prompt.chars().count();
    if chars > MAX_PROMPT_CHARS {
        return Err(AppError::Validation(format!(
            "prompt is {chars} characters; the limit is {MAX_PROMPT_CHARS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_length_limit_counts_characters() {
        assert!(check_prompt_length(&"é".repeat(MAX_PROMPT_CHARS)).is_ok());
        assert!(matches!(
            check_prompt_length(&"a".repeat(MAX_PROMPT_CHARS + 1)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_edit_request_accepts_partial_edits() {
        let json = r##"{
            "segmented": {
                "sessionId": "s",
                "originalPrompt": "rain",
                "segments": [],
                "createdAt": "2024-01-01T00:00:00Z"
            },
            "segmentId": "x",
            "category": "style"
        }"##;
        let request: EditSegmentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.category, Some(Category::Style));
        assert!(request.text.is_none());
    }
}
