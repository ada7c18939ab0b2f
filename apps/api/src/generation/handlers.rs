//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::backend_client::wire::{
    generation_image_explanation, generation_text_explanation, wire_segments,
    ImageGenerateRequest, ImageGenerateResponse, TextGenerateRequest, TextGenerateResponse,
};
use crate::errors::AppError;
use crate::models::explanation::{ImageExplanation, TextExplanation};
use crate::models::segment::Segment;
use crate::segmentation::handlers::check_prompt_length;
use crate::state::AppState;

const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_IMAGE_SIZE: u32 = 512;

const MAX_TOKENS_RANGE: std::ops::RangeInclusive<u32> = 50..=4096;
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;
const IMAGE_SIZE_RANGE: std::ops::RangeInclusive<u32> = 256..=1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTextRequest {
    pub session_id: String,
    pub prompt: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    pub session_id: String,
    pub prompt: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedText {
    pub session_id: String,
    pub generated_text: String,
    pub explanation: TextExplanation,
    pub metadata: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub session_id: String,
    pub image_url: String,
    pub width: u32,
    pub height: u32,
    pub explanation: ImageExplanation,
    pub metadata: Value,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generate/text
pub async fn handle_generate_text(
    State(state): State<AppState>,
    Json(request): Json<GenerateTextRequest>,
) -> Result<Json<GeneratedText>, AppError> {
    validate_prompt(&request.prompt)?;
    let max_tokens = request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    let temperature = request.temperature.unwrap_or(DEFAULT_TEMPERATURE);
    if !MAX_TOKENS_RANGE.contains(&max_tokens) {
        return Err(AppError::Validation(format!(
            "maxTokens must be between {} and {}",
            MAX_TOKENS_RANGE.start(),
            MAX_TOKENS_RANGE.end()
        )));
    }
    if !TEMPERATURE_RANGE.contains(&temperature) {
        return Err(AppError::Validation(format!(
            "temperature must be between {} and {}",
            TEMPERATURE_RANGE.start(),
            TEMPERATURE_RANGE.end()
        )));
    }

    let body = TextGenerateRequest {
        session_id: &request.session_id,
        prompt: &request.prompt,
        segments: wire_segments(&request.segments),
        max_tokens,
        temperature,
    };
    let response: TextGenerateResponse = state.backend.post_json("/generate/text", &body).await?;

    info!(
        session_id = %response.session_id,
        "Generated text ({} chars, {} sentence mappings)",
        response.generated_text.len(),
        response.sentence_mappings.len()
    );

    Ok(Json(GeneratedText {
        explanation: generation_text_explanation(&response.sentence_mappings),
        session_id: response.session_id,
        generated_text: response.generated_text,
        metadata: response.generation_metadata,
    }))
}

/// POST /api/v1/generate/image
pub async fn handle_generate_image(
    State(state): State<AppState>,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Json<GeneratedImage>, AppError> {
    validate_prompt(&request.prompt)?;
    let width = request.width.unwrap_or(DEFAULT_IMAGE_SIZE);
    let height = request.height.unwrap_or(DEFAULT_IMAGE_SIZE);
    if !IMAGE_SIZE_RANGE.contains(&width) || !IMAGE_SIZE_RANGE.contains(&height) {
        return Err(AppError::Validation(format!(
            "width and height must be between {} and {}",
            IMAGE_SIZE_RANGE.start(),
            IMAGE_SIZE_RANGE.end()
        )));
    }

    let body = ImageGenerateRequest {
        session_id: &request.session_id,
        prompt: &request.prompt,
        segments: wire_segments(&request.segments),
        width,
        height,
    };
    let response: ImageGenerateResponse =
        state.backend.post_json("/generate/image", &body).await?;

    info!(
        session_id = %response.session_id,
        "Generated {}x{} image with {} heatmap regions",
        response.image_width,
        response.image_height,
        response.heatmap_data.len()
    );

    let explanation = generation_image_explanation(&response);
    Ok(Json(GeneratedImage {
        session_id: response.session_id,
        image_url: response.image_url,
        width: response.image_width,
        height: response.image_height,
        explanation,
        metadata: response.generation_metadata,
    }))
}

fn validate_prompt(prompt: &str) -> Result<(), AppError> {
    if prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    check_prompt_length(prompt)
}
