//! Axum route handlers for the Explanation API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::explanation::{
    explain_image_with_fallback, explain_text_with_fallback, ImageExplainRequest,
    TextExplainRequest,
};
use crate::models::explanation::{ImageExplanation, TextExplanation};
use crate::state::AppState;

/// POST /api/v1/explain/text
///
/// Maps prompt segments to sentences of a generated text. Always answers:
/// the backend's explanation when it has one, a labeled heuristic otherwise.
pub async fn handle_explain_text(
    State(state): State<AppState>,
    Json(request): Json<TextExplainRequest>,
) -> Result<Json<TextExplanation>, AppError> {
    if request.generated_text.trim().is_empty() {
        return Err(AppError::Validation(
            "generatedText cannot be empty".to_string(),
        ));
    }

    let explanation = explain_text_with_fallback(
        state.explainer.as_ref(),
        &request,
        state.config.heuristic_seed,
    )
    .await;

    Ok(Json(explanation))
}

/// POST /api/v1/explain/image
///
/// Attributes regions of a generated image to prompt segments.
pub async fn handle_explain_image(
    State(state): State<AppState>,
    Json(request): Json<ImageExplainRequest>,
) -> Result<Json<ImageExplanation>, AppError> {
    if request.width == 0 || request.height == 0 {
        return Err(AppError::Validation(
            "width and height must be positive".to_string(),
        ));
    }

    let explanation = explain_image_with_fallback(
        state.explainer.as_ref(),
        &request,
        state.config.heuristic_seed,
    )
    .await;

    Ok(Json(explanation))
}
