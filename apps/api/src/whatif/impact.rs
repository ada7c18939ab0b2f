//! Aggregate views over a what-if comparison: how much the prompt changed and
//! how much the output moved in response.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::whatif::segment_changes::{round3, SegmentChange};
use crate::whatif::word_diff::word_similarity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMagnitude {
    Minimal,
    Moderate,
    Significant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    pub total_segments_analyzed: usize,
    pub segments_added: usize,
    pub segments_removed: usize,
    pub segments_modified: usize,
    pub segments_unchanged: usize,
    pub total_impact_score: f64,
    pub average_impact_score: f64,
    pub change_ratio: f64,
    pub change_magnitude: ChangeMagnitude,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetrics {
    pub text_similarity: f64,
    pub word_overlap: f64,
    pub length_change_ratio: f64,
    pub input_output_correlation: f64,
    pub divergence_score: f64,
}

pub fn summarize_impact(changes: &[SegmentChange]) -> ImpactSummary {
    let mut summary = ImpactSummary {
        total_segments_analyzed: changes.len(),
        segments_added: 0,
        segments_removed: 0,
        segments_modified: 0,
        segments_unchanged: 0,
        total_impact_score: 0.0,
        average_impact_score: 0.0,
        change_ratio: 0.0,
        change_magnitude: ChangeMagnitude::Minimal,
    };

    let mut total_impact = 0.0;
    for change in changes {
        match change {
            SegmentChange::Added { .. } => summary.segments_added += 1,
            SegmentChange::Removed { .. } => summary.segments_removed += 1,
            SegmentChange::Modified { .. } => summary.segments_modified += 1,
            SegmentChange::Unchanged { .. } => summary.segments_unchanged += 1,
        }
        total_impact += change.impact_score();
    }

    let total = changes.len().max(1) as f64;
    let changed = changes.len() - summary.segments_unchanged;
    let ratio = changed as f64 / total;

    summary.total_impact_score = round3(total_impact);
    summary.average_impact_score = round3(total_impact / total);
    summary.change_ratio = round3(ratio);
    summary.change_magnitude = if ratio < 0.2 {
        ChangeMagnitude::Minimal
    } else if ratio < 0.5 {
        ChangeMagnitude::Moderate
    } else {
        ChangeMagnitude::Significant
    };
    summary
}

/// Compares the output generated for the original prompt with the output for
/// the modified one, relative to how much the prompt itself changed.
pub fn compare_outputs(
    original_output: &str,
    modified_output: &str,
    changes: &[SegmentChange],
) -> ComparisonMetrics {
    let similarity = word_similarity(original_output, modified_output);

    let original_words: HashSet<String> = original_output
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    let modified_words: HashSet<String> = modified_output
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    let union = original_words.union(&modified_words).count();
    let word_overlap = if union == 0 {
        1.0
    } else {
        original_words.intersection(&modified_words).count() as f64 / union as f64
    };

    let original_len = original_output.chars().count();
    let modified_len = modified_output.chars().count();
    let length_change = original_len.abs_diff(modified_len) as f64
        / original_len.max(modified_len).max(1) as f64;

    let input_change: f64 = changes
        .iter()
        .filter(|c| !c.is_unchanged())
        .map(SegmentChange::impact_score)
        .sum();
    let normalized_input_change = input_change / changes.len().max(1) as f64;
    let divergence = 1.0 - similarity;

    ComparisonMetrics {
        text_similarity: round3(similarity),
        word_overlap: round3(word_overlap),
        length_change_ratio: round3(length_change),
        input_output_correlation: round3(1.0 - (normalized_input_change - divergence).abs()),
        divergence_score: round3(divergence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::segment::{Category, Segment, SegmentMetadata, SegmentType};

    fn seg(id: &str, importance: f64) -> Segment {
        Segment {
            id: id.to_string(),
            text: id.to_string(),
            segment_type: SegmentType::Keyword,
            start_index: 0,
            end_index: id.len(),
            metadata: SegmentMetadata {
                category: Category::Subject,
                importance,
                confidence: Some(0.8),
                color: Category::Subject.color().to_string(),
            },
        }
    }

    fn unchanged(id: &str) -> SegmentChange {
        SegmentChange::Unchanged {
            original: seg(id, 0.5),
            new: seg(id, 0.5),
        }
    }

    #[test]
    fn test_summary_counts_and_magnitude() {
        let changes = vec![
            unchanged("a"),
            unchanged("b"),
            SegmentChange::Removed {
                original: seg("c", 0.6),
                impact_score: 0.6,
            },
            SegmentChange::Added {
                new: seg("d", 0.8),
                impact_score: 0.8,
            },
        ];
        let summary = summarize_impact(&changes);
        assert_eq!(summary.total_segments_analyzed, 4);
        assert_eq!(summary.segments_unchanged, 2);
        assert_eq!(summary.segments_removed, 1);
        assert_eq!(summary.segments_added, 1);
        assert_eq!(summary.segments_modified, 0);
        assert_eq!(summary.total_impact_score, 1.4);
        assert_eq!(summary.average_impact_score, 0.35);
        assert_eq!(summary.change_ratio, 0.5);
        assert_eq!(summary.change_magnitude, ChangeMagnitude::Significant);
    }

    #[test]
    fn test_summary_of_nothing_is_minimal() {
        let summary = summarize_impact(&[]);
        assert_eq!(summary.total_segments_analyzed, 0);
        assert_eq!(summary.average_impact_score, 0.0);
        assert_eq!(summary.change_magnitude, ChangeMagnitude::Minimal);
    }

    #[test]
    fn test_moderate_band() {
        let mut changes: Vec<SegmentChange> = (0..3).map(|i| unchanged(&i.to_string())).collect();
        changes.push(SegmentChange::Removed {
            original: seg("x", 0.5),
            impact_score: 0.5,
        });
        assert_eq!(
            summarize_impact(&changes).change_magnitude,
            ChangeMagnitude::Moderate
        );
    }

    #[test]
    fn test_identical_outputs() {
        let text = "The city glows. A girl waits in the rain.";
        let metrics = compare_outputs(text, text, &[unchanged("a")]);
        assert_eq!(metrics.text_similarity, 1.0);
        assert_eq!(metrics.word_overlap, 1.0);
        assert_eq!(metrics.length_change_ratio, 0.0);
        assert_eq!(metrics.divergence_score, 0.0);
        assert_eq!(metrics.input_output_correlation, 1.0);
    }

    #[test]
    fn test_disjoint_outputs() {
        let metrics = compare_outputs("red car", "blue boat sails", &[]);
        assert_eq!(metrics.text_similarity, 0.0);
        assert_eq!(metrics.word_overlap, 0.0);
        assert_eq!(metrics.divergence_score, 1.0);
        assert_eq!(metrics.input_output_correlation, 0.0);
        // |7 - 15| / 15
        assert_eq!(metrics.length_change_ratio, 0.533);
    }

    #[test]
    fn test_empty_outputs_overlap_fully() {
        let metrics = compare_outputs("", "", &[]);
        assert_eq!(metrics.word_overlap, 1.0);
        assert_eq!(metrics.text_similarity, 1.0);
    }
}
