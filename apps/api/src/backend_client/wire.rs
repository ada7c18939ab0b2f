//! Backend wire format. Field names are the backend's snake_case; each type
//! converts into the crate's own model types.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::explanation::{
    mean_confidence, ExplanationSource, HeatPoint, ImageExplanation, ImageMapping, MappingMethod,
    TextExplanation, TextMapping,
};
use crate::models::segment::{
    Category, Segment, SegmentMetadata, SegmentType, SegmentationSource, SegmentedPrompt,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireSegment {
    pub id: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub category: Category,
    pub confidence: f64,
    pub importance: f64,
}

impl From<&Segment> for WireSegment {
    fn from(segment: &Segment) -> Self {
        Self {
            id: segment.id.clone(),
            text: segment.text.clone(),
            start: segment.start_index,
            end: segment.end_index,
            category: segment.category(),
            confidence: segment.metadata.confidence.unwrap_or(0.5),
            importance: segment.importance(),
        }
    }
}

pub fn wire_segments(segments: &[Segment]) -> Vec<WireSegment> {
    segments.iter().map(WireSegment::from).collect()
}

impl From<WireSegment> for Segment {
    fn from(wire: WireSegment) -> Self {
        Segment {
            segment_type: SegmentType::for_text(&wire.text),
            id: wire.id,
            text: wire.text,
            start_index: wire.start,
            end_index: wire.end.max(wire.start),
            metadata: SegmentMetadata {
                category: wire.category,
                importance: wire.importance.clamp(0.0, 1.0),
                confidence: Some(wire.confidence.clamp(0.0, 1.0)),
                color: wire.category.color().to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PromptSubmitRequest<'a> {
    pub prompt: &'a str,
    pub session_id: &'a str,
    pub generation_type: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PromptSubmitResponse {
    pub original_prompt: String,
    pub segments: Vec<WireSegment>,
}

impl PromptSubmitResponse {
    /// The backend mints its own session id; the caller's is kept.
    pub fn into_segmented(self, session_id: &str) -> SegmentedPrompt {
        SegmentedPrompt {
            session_id: session_id.to_string(),
            original_prompt: self.original_prompt,
            segments: self.segments.into_iter().map(Segment::from).collect(),
            created_at: Utc::now(),
            source: SegmentationSource::Backend,
            fallback_reason: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceMapping {
    pub sentence_text: String,
    pub sentence_index: usize,
    pub contributing_segments: Vec<String>,
    #[serde(default)]
    pub confidence_scores: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapRegion {
    pub segment_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub intensity: f64,
}

#[derive(Debug, Serialize)]
pub struct TextExplainRequest<'a> {
    pub session_id: &'a str,
    pub generated_text: &'a str,
    pub segments: Vec<WireSegment>,
}

#[derive(Debug, Deserialize)]
pub struct TextExplainResponse {
    pub sentence_mappings: Vec<SentenceMapping>,
    #[serde(default)]
    pub overall_segment_importance: HashMap<String, f64>,
    pub explanation_confidence: f64,
}

#[derive(Debug, Serialize)]
pub struct ImageExplainRequest<'a> {
    pub session_id: &'a str,
    pub image_url: &'a str,
    pub segments: Vec<WireSegment>,
}

#[derive(Debug, Deserialize)]
pub struct ImageExplainResponse {
    pub heatmap_data: Vec<HeatmapRegion>,
    #[serde(default)]
    pub segment_contributions: HashMap<String, f64>,
    #[serde(default)]
    pub attention_summary: String,
    pub explanation_confidence: f64,
}

#[derive(Debug, Serialize)]
pub struct TextGenerateRequest<'a> {
    pub session_id: &'a str,
    pub prompt: &'a str,
    pub segments: Vec<WireSegment>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Deserialize)]
pub struct TextGenerateResponse {
    pub session_id: String,
    pub generated_text: String,
    pub sentence_mappings: Vec<SentenceMapping>,
    #[serde(default)]
    pub generation_metadata: Value,
}

#[derive(Debug, Serialize)]
pub struct ImageGenerateRequest<'a> {
    pub session_id: &'a str,
    pub prompt: &'a str,
    pub segments: Vec<WireSegment>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub struct ImageGenerateResponse {
    pub session_id: String,
    pub image_url: String,
    pub image_width: u32,
    pub image_height: u32,
    pub heatmap_data: Vec<HeatmapRegion>,
    #[serde(default)]
    pub segment_contributions: HashMap<String, f64>,
    #[serde(default)]
    pub generation_metadata: Value,
}

/// One `TextMapping` per (sentence, contributing segment) pair.
pub fn text_mappings(sentences: &[SentenceMapping]) -> Vec<TextMapping> {
    sentences
        .iter()
        .flat_map(|sentence| {
            sentence.contributing_segments.iter().map(move |id| TextMapping {
                segment_id: id.clone(),
                sentence_index: sentence.sentence_index,
                sentence_text: sentence.sentence_text.clone(),
                confidence: sentence
                    .confidence_scores
                    .get(id)
                    .copied()
                    .unwrap_or(0.0)
                    .clamp(0.0, 1.0),
                method: MappingMethod::Backend,
            })
        })
        .collect()
}

/// Regions are normalized to the unit square; mappings are in pixels.
pub fn image_mappings(regions: &[HeatmapRegion], width: u32, height: u32) -> Vec<ImageMapping> {
    regions
        .iter()
        .map(|region| {
            let intensity = region.intensity.clamp(0.0, 1.0);
            let cx = (region.x + region.width / 2.0).clamp(0.0, 1.0) * width as f64;
            let cy = (region.y + region.height / 2.0).clamp(0.0, 1.0) * height as f64;
            ImageMapping {
                segment_id: region.segment_id.clone(),
                center: (cx, cy),
                points: vec![HeatPoint {
                    x: cx,
                    y: cy,
                    intensity,
                }],
                confidence: intensity,
                method: MappingMethod::Backend,
            }
        })
        .collect()
}

impl From<TextExplainResponse> for TextExplanation {
    fn from(response: TextExplainResponse) -> Self {
        TextExplanation {
            mappings: text_mappings(&response.sentence_mappings),
            segment_importance: response.overall_segment_importance,
            overall_confidence: response.explanation_confidence.clamp(0.0, 1.0),
            source: ExplanationSource::Backend,
            fallback_reason: None,
        }
    }
}

impl ImageExplainResponse {
    pub fn into_explanation(self, width: u32, height: u32) -> ImageExplanation {
        ImageExplanation {
            width,
            height,
            mappings: image_mappings(&self.heatmap_data, width, height),
            segment_contributions: self.segment_contributions,
            attention_summary: self.attention_summary,
            overall_confidence: self.explanation_confidence.clamp(0.0, 1.0),
            source: ExplanationSource::Backend,
            fallback_reason: None,
        }
    }
}

/// Explanation attached to a generation response. The backend sends no
/// overall confidence there, so it is the mean over the mappings.
pub fn generation_text_explanation(sentences: &[SentenceMapping]) -> TextExplanation {
    let mappings = text_mappings(sentences);
    TextExplanation {
        overall_confidence: mean_confidence(mappings.iter().map(|m| m.confidence)),
        mappings,
        segment_importance: HashMap::new(),
        source: ExplanationSource::Backend,
        fallback_reason: None,
    }
}

pub fn generation_image_explanation(response: &ImageGenerateResponse) -> ImageExplanation {
    let mappings = image_mappings(
        &response.heatmap_data,
        response.image_width,
        response.image_height,
    );
    ImageExplanation {
        width: response.image_width,
        height: response.image_height,
        overall_confidence: mean_confidence(mappings.iter().map(|m| m.confidence)),
        mappings,
        segment_contributions: response.segment_contributions.clone(),
        attention_summary: String::new(),
        source: ExplanationSource::Backend,
        fallback_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_explain_response_converts_per_contributor() {
        let json = r#"{
            "session_id": "s1",
            "sentence_mappings": [
                {
                    "sentence_id": "x",
                    "sentence_text": "The city glows.",
                    "sentence_index": 0,
                    "contributing_segments": ["a", "b"],
                    "confidence_scores": {"a": 0.7, "b": 0.3}
                },
                {
                    "sentence_id": "y",
                    "sentence_text": "She waits.",
                    "sentence_index": 1,
                    "contributing_segments": ["b"],
                    "confidence_scores": {"b": 1.0}
                }
            ],
            "overall_segment_importance": {"a": 0.5, "b": 1.0},
            "explanation_confidence": 0.85,
            "timestamp": "2024-01-01T00:00:00"
        }"#;
        let response: TextExplainResponse = serde_json::from_str(json).unwrap();
        let explanation = TextExplanation::from(response);

        assert_eq!(explanation.source, ExplanationSource::Backend);
        assert_eq!(explanation.mappings.len(), 3);
        assert!(explanation
            .mappings
            .iter()
            .all(|m| m.method == MappingMethod::Backend));
        assert_eq!(explanation.mappings[2].segment_id, "b");
        assert_eq!(explanation.mappings[2].sentence_index, 1);
        assert_eq!(explanation.overall_confidence, 0.85);
        assert_eq!(explanation.segment_importance["b"], 1.0);
    }

    #[test]
    fn test_heatmap_regions_scale_to_pixels() {
        let regions = vec![HeatmapRegion {
            segment_id: "a".to_string(),
            x: 0.25,
            y: 0.5,
            width: 0.5,
            height: 0.2,
            intensity: 1.4,
        }];
        let mappings = image_mappings(&regions, 512, 256);
        assert_eq!(mappings[0].center, (256.0, 153.6));
        assert_eq!(mappings[0].confidence, 1.0);
    }

    #[test]
    fn test_prompt_submit_response_converts_segments() {
        let json = r#"{
            "session_id": "backend-session",
            "original_prompt": "dark cyberpunk city, a girl",
            "segments": [
                {"id": "a", "text": "dark cyberpunk city", "start": 0, "end": 19,
                 "category": "style", "confidence": 0.9, "importance": 0.8},
                {"id": "b", "text": "a girl", "start": 21, "end": 27,
                 "category": "subject", "confidence": 1.3, "importance": 0.7}
            ],
            "timestamp": "2024-01-01T00:00:00"
        }"#;
        let response: PromptSubmitResponse = serde_json::from_str(json).unwrap();
        let segmented = response.into_segmented("ui-session");

        assert_eq!(segmented.session_id, "ui-session");
        assert_eq!(segmented.source, SegmentationSource::Backend);
        assert_eq!(segmented.segments[0].segment_type, SegmentType::Phrase);
        assert_eq!(segmented.segments[0].metadata.color, Category::Style.color());
        assert_eq!(segmented.segments[1].segment_type, SegmentType::Keyword);
        assert_eq!(segmented.segments[1].start_index, 21);
        assert_eq!(segmented.segments[1].metadata.confidence, Some(1.0));
    }

    #[test]
    fn test_wire_segment_uses_backend_field_names() {
        let segment = Segment {
            id: "a".to_string(),
            text: "a girl".to_string(),
            segment_type: crate::models::segment::SegmentType::Keyword,
            start_index: 3,
            end_index: 9,
            metadata: crate::models::segment::SegmentMetadata {
                category: Category::Subject,
                importance: 0.9,
                confidence: None,
                color: Category::Subject.color().to_string(),
            },
        };
        let json = serde_json::to_value(WireSegment::from(&segment)).unwrap();
        assert_eq!(json["start"], 3);
        assert_eq!(json["end"], 9);
        assert_eq!(json["category"], "subject");
        assert_eq!(json["confidence"], 0.5);
    }
}
