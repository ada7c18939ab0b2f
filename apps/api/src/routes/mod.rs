pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::explanation::handlers as explanation;
use crate::generation::handlers as generation;
use crate::metrics::handlers as metrics;
use crate::segmentation::{handlers as segmentation, live};
use crate::state::AppState;
use crate::whatif::handlers as whatif;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Segmentation API
        .route("/api/v1/prompt/segment", post(segmentation::handle_segment))
        .route(
            "/api/v1/prompt/segment/edit",
            post(segmentation::handle_edit_segment),
        )
        .route("/api/v1/live/segments", get(live::handle_live_segments))
        // What-If API
        .route("/api/v1/whatif/diff", post(whatif::handle_diff))
        .route("/api/v1/whatif/analyze", post(whatif::handle_analyze))
        // Explanation API
        .route(
            "/api/v1/explain/text",
            post(explanation::handle_explain_text),
        )
        .route(
            "/api/v1/explain/image",
            post(explanation::handle_explain_image),
        )
        // Generation API (backend proxy)
        .route(
            "/api/v1/generate/text",
            post(generation::handle_generate_text),
        )
        .route(
            "/api/v1/generate/image",
            post(generation::handle_generate_image),
        )
        // Metrics API (backend proxy)
        .route("/api/v1/metrics/submit", post(metrics::handle_submit_metrics))
        .route("/api/v1/metrics/summary", get(metrics::handle_metrics_summary))
        .with_state(state)
}
