//! Axum route handlers for the What-If API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::segment::SegmentedPrompt;
use crate::segmentation::handlers::check_prompt_length;
use crate::segmentation::segment_with_fallback;
use crate::state::AppState;
use crate::whatif::impact::{compare_outputs, summarize_impact, ComparisonMetrics, ImpactSummary};
use crate::whatif::segment_changes::{compute_segment_changes, SegmentChange};
use crate::whatif::word_diff::{diff_words, word_similarity, WordDiff};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffRequest {
    pub old_text: String,
    pub new_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResponse {
    pub diff: Vec<WordDiff>,
    pub similarity: f64,
}

/// The original side is either an existing segmentation or a raw prompt to
/// segment first.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub original: Option<SegmentedPrompt>,
    #[serde(default)]
    pub original_prompt: Option<String>,
    pub modified_prompt: String,
    #[serde(default)]
    pub original_output: Option<String>,
    #[serde(default)]
    pub modified_output: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub original: SegmentedPrompt,
    pub modified: SegmentedPrompt,
    pub changes: Vec<SegmentChange>,
    pub impact: ImpactSummary,
    pub prompt_diff: Vec<WordDiff>,
    /// Present only when both outputs were supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonMetrics>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/whatif/diff
pub async fn handle_diff(Json(request): Json<DiffRequest>) -> Json<DiffResponse> {
    Json(DiffResponse {
        diff: diff_words(&request.old_text, &request.new_text),
        similarity: word_similarity(&request.old_text, &request.new_text),
    })
}

/// POST /api/v1/whatif/analyze
///
/// Segments the modified prompt, pairs its segments with the original ones
/// and scores the change. Output metrics are added when both generated
/// outputs are supplied; the client produces them through the generation
/// endpoints.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    check_prompt_length(&request.modified_prompt)?;
    let seed = state.config.heuristic_seed;

    let original = match (request.original, request.original_prompt) {
        (Some(original), _) => original,
        (None, Some(prompt)) => {
            check_prompt_length(&prompt)?;
            let session_id = request
                .session_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            segment_with_fallback(state.segmenter.as_ref(), &prompt, &session_id, seed).await
        }
        (None, None) => {
            return Err(AppError::Validation(
                "either original or originalPrompt is required".to_string(),
            ))
        }
    };

    let session_id = request
        .session_id
        .unwrap_or_else(|| original.session_id.clone());
    let modified = segment_with_fallback(
        state.segmenter.as_ref(),
        &request.modified_prompt,
        &session_id,
        seed,
    )
    .await;

    let changes = compute_segment_changes(&original.segments, &modified.segments);
    for change in changes.iter().filter(|c| !c.is_unchanged()) {
        debug!(
            session_id = %session_id,
            impact = change.impact_score(),
            "segment change: {:?} -> {:?}",
            change.original().map(|s| s.text.as_str()),
            change.new_segment().map(|s| s.text.as_str())
        );
    }
    let impact = summarize_impact(&changes);
    let prompt_diff = diff_words(&original.original_prompt, &modified.original_prompt);
    let comparison = match (&request.original_output, &request.modified_output) {
        (Some(before), Some(after)) => Some(compare_outputs(before, after, &changes)),
        _ => None,
    };

    info!(
        session_id = %session_id,
        "What-if analysis: {} changed of {} segments",
        impact.segments_added + impact.segments_removed + impact.segments_modified,
        impact.total_segments_analyzed
    );

    Ok(Json(AnalyzeResponse {
        original,
        modified,
        changes,
        impact,
        prompt_diff,
        comparison,
    }))
}
