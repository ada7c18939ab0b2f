//! Axum route handlers for the Metrics API (backend proxy).

use axum::{extract::State, Json};
use tracing::info;

use crate::errors::AppError;
use crate::metrics::{MetricsReceipt, MetricsSubmission, MetricsSummary};
use crate::state::AppState;

/// POST /api/v1/metrics/submit
pub async fn handle_submit_metrics(
    State(state): State<AppState>,
    Json(submission): Json<MetricsSubmission>,
) -> Result<Json<MetricsReceipt>, AppError> {
    if submission.session_id.trim().is_empty() {
        return Err(AppError::Validation("sessionId cannot be empty".to_string()));
    }
    submission.metrics.validate().map_err(AppError::Validation)?;

    let receipt: MetricsReceipt = state.backend.post_json("/metrics/submit", &submission).await?;

    info!(
        session_id = %submission.session_id,
        consent = submission.consent_given,
        "Metrics submitted ({})",
        receipt.metrics_id
    );

    Ok(Json(receipt))
}

/// GET /api/v1/metrics/summary
pub async fn handle_metrics_summary(
    State(state): State<AppState>,
) -> Result<Json<MetricsSummary>, AppError> {
    let summary: MetricsSummary = state.backend.get_json("/metrics/summary").await?;
    Ok(Json(summary))
}
