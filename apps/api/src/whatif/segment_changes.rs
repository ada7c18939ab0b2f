//! Segment-level correspondence between two segmentations of a prompt.
//!
//! Greedy, first match wins. Each original segment tries an exact
//! (case-insensitive) match among the still-unmatched new segments, then a
//! prefix heuristic; anything left over on the new side is `Added`.

use serde::{Deserialize, Serialize};

use crate::models::segment::Segment;
use crate::whatif::word_diff::word_similarity;

/// Number of leading characters compared by the similarity heuristic.
const PREFIX_CHARS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SegmentChange {
    Unchanged {
        original: Segment,
        new: Segment,
    },
    Modified {
        original: Segment,
        new: Segment,
        impact_score: f64,
    },
    Removed {
        original: Segment,
        impact_score: f64,
    },
    Added {
        new: Segment,
        impact_score: f64,
    },
}

impl SegmentChange {
    pub fn original(&self) -> Option<&Segment> {
        match self {
            SegmentChange::Unchanged { original, .. }
            | SegmentChange::Modified { original, .. }
            | SegmentChange::Removed { original, .. } => Some(original),
            SegmentChange::Added { .. } => None,
        }
    }

    pub fn new_segment(&self) -> Option<&Segment> {
        match self {
            SegmentChange::Unchanged { new, .. }
            | SegmentChange::Modified { new, .. }
            | SegmentChange::Added { new, .. } => Some(new),
            SegmentChange::Removed { .. } => None,
        }
    }

    /// 0.0 – 1.0; how much this change is expected to move the output.
    pub fn impact_score(&self) -> f64 {
        match self {
            SegmentChange::Unchanged { .. } => 0.0,
            SegmentChange::Modified { impact_score, .. }
            | SegmentChange::Removed { impact_score, .. }
            | SegmentChange::Added { impact_score, .. } => *impact_score,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, SegmentChange::Unchanged { .. })
    }
}

/// Classifies every segment of both snapshots exactly once.
///
/// The result holds one entry per original segment, in original order,
/// followed by one `Added` entry per unmatched new segment, in new order.
pub fn compute_segment_changes(original: &[Segment], new: &[Segment]) -> Vec<SegmentChange> {
    let new_lower: Vec<String> = new.iter().map(|s| s.text.to_lowercase()).collect();
    let mut matched = vec![false; new.len()];
    let mut changes = Vec::with_capacity(original.len() + new.len());

    for orig in original {
        let orig_lower = orig.text.to_lowercase();

        let exact = (0..new.len()).find(|&k| !matched[k] && new_lower[k] == orig_lower);
        if let Some(k) = exact {
            matched[k] = true;
            changes.push(SegmentChange::Unchanged {
                original: orig.clone(),
                new: new[k].clone(),
            });
            continue;
        }

        let similar =
            (0..new.len()).find(|&k| !matched[k] && is_similar(&orig_lower, &new_lower[k]));
        match similar {
            Some(k) => {
                matched[k] = true;
                let similarity = word_similarity(&orig_lower, &new_lower[k]);
                changes.push(SegmentChange::Modified {
                    original: orig.clone(),
                    new: new[k].clone(),
                    impact_score: round3(orig.importance() * (1.0 - similarity)),
                });
            }
            None => changes.push(SegmentChange::Removed {
                original: orig.clone(),
                impact_score: round3(orig.importance()),
            }),
        }
    }

    for (k, seg) in new.iter().enumerate() {
        if !matched[k] {
            changes.push(SegmentChange::Added {
                new: seg.clone(),
                impact_score: round3(seg.importance()),
            });
        }
    }

    changes
}

/// Either text contains the other's first few characters.
fn is_similar(a: &str, b: &str) -> bool {
    let prefix_a: String = a.chars().take(PREFIX_CHARS).collect();
    let prefix_b: String = b.chars().take(PREFIX_CHARS).collect();
    (!prefix_a.is_empty() && b.contains(&prefix_a))
        || (!prefix_b.is_empty() && a.contains(&prefix_b))
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
