use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Where a single mapping came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMethod {
    Backend,
    TokenOverlap,
    EmbeddingSimilarity,
    RadialHeatmap,
}

/// Who produced a whole explanation. `Heuristic` results are placeholders and
/// must be presented as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
    Backend,
    Heuristic,
}

/// Segment → output sentence edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMapping {
    pub segment_id: String,
    pub sentence_index: usize,
    pub sentence_text: String,
    pub confidence: f64,
    pub method: MappingMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub x: f64,
    pub y: f64,
    /// 0.0 – 1.0
    pub intensity: f64,
}

/// Segment → image region edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMapping {
    pub segment_id: String,
    pub center: (f64, f64),
    pub points: Vec<HeatPoint>,
    pub confidence: f64,
    pub method: MappingMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextExplanation {
    pub mappings: Vec<TextMapping>,
    pub segment_importance: HashMap<String, f64>,
    pub overall_confidence: f64,
    pub source: ExplanationSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageExplanation {
    pub width: u32,
    pub height: u32,
    pub mappings: Vec<ImageMapping>,
    pub segment_contributions: HashMap<String, f64>,
    pub attention_summary: String,
    pub overall_confidence: f64,
    pub source: ExplanationSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Arithmetic mean of the given confidences; 0 for an empty set.
pub fn mean_confidence(confidences: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = confidences
        .into_iter()
        .fold((0.0_f64, 0_usize), |(s, n), c| (s + c, n + 1));
    sum / count.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_confidence_empty_is_zero() {
        assert_eq!(mean_confidence(Vec::new()), 0.0);
    }

    #[test]
    fn test_mean_confidence_averages() {
        let mean = mean_confidence([0.2, 0.4, 0.9]);
        assert!((mean - 0.5).abs() < 1e-9, "mean was {mean}");
    }

    #[test]
    fn test_mapping_method_serde() {
        let json = serde_json::to_string(&MappingMethod::TokenOverlap).unwrap();
        assert_eq!(json, r#""token_overlap""#);
        let method: MappingMethod = serde_json::from_str(r#""radial_heatmap""#).unwrap();
        assert_eq!(method, MappingMethod::RadialHeatmap);
    }
}
