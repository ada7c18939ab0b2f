//! Live segmentation over a WebSocket.
//!
//! The client streams the whole prompt as text frames while the user types.
//! Frames are debounced; only the latest prompt of a quiet period is
//! segmented and pushed back as `SegmentedPrompt` JSON.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use rand::rngs::StdRng;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::segment::SegmentedPrompt;
use crate::segmentation::debounce::Debouncer;
use crate::segmentation::extractor::extract_segments;
use crate::segmentation::handlers::check_prompt_length;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveParams {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// GET /api/v1/live/segments
pub async fn handle_live_segments(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<LiveParams>,
) -> Response {
    let session_id = params
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    ws.on_upgrade(move |socket| run_session(socket, state, session_id))
}

/// Debouncer that segments each quiescent prompt under one session id.
pub fn live_segmenter(
    window: Duration,
    session_id: String,
    mut rng: StdRng,
) -> Debouncer<String, SegmentedPrompt> {
    Debouncer::spawn(window, move |prompt: String| {
        extract_segments(&prompt, &session_id, &mut rng)
    })
}

async fn run_session(mut socket: WebSocket, state: AppState, session_id: String) {
    info!(session_id = %session_id, "Live segmentation session opened");

    let window = Duration::from_millis(state.config.debounce_ms);
    let segmenter = live_segmenter(window, session_id.clone(), state.rng());
    let mut results = segmenter.subscribe();

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(prompt))) => {
                    if let Err(e) = check_prompt_length(&prompt) {
                        let frame = json!({
                            "error": { "code": "VALIDATION_ERROR", "message": e.to_string() }
                        });
                        if socket.send(Message::Text(frame.to_string())).await.is_err() {
                            break;
                        }
                        continue;
                    }
                    if !segmenter.submit(prompt) {
                        warn!(session_id = %session_id, "Debounce task stopped; closing session");
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Pings are answered by axum; binary frames are ignored.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(session_id = %session_id, "WebSocket receive failed: {e}");
                    break;
                }
            },
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = results.borrow_and_update().clone();
                let Some(segmented) = latest else { continue };
                match serde_json::to_string(&segmented) {
                    Ok(payload) => {
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(session_id = %session_id, "Failed to encode segments: {e}"),
                }
            }
        }
    }

    info!(session_id = %session_id, "Live segmentation session closed");
}
