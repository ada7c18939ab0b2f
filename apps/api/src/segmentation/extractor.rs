//! Heuristic prompt segmentation.
//!
//! Splits a prompt on commas and a few connective words, locates every
//! fragment in the original text, and labels it with a category, an
//! importance and a display color.

use chrono::Utc;
use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use crate::models::segment::{
    Category, Segment, SegmentMetadata, SegmentType, SegmentationSource, SegmentedPrompt,
};
use crate::segmentation::keywords::{classify, SEPARATOR};

/// Segments `prompt` into labeled spans. Never fails: when nothing survives
/// the split, the whole prompt becomes a single `SemanticChunk`.
///
/// `rng` drives the importance score; pass a seeded generator for
/// reproducible output.
pub fn extract_segments<R: Rng>(
    prompt: &str,
    session_id: &str,
    rng: &mut R,
) -> SegmentedPrompt {
    let mut segments = Vec::new();
    // Byte offset in `prompt` where the search for the next fragment starts.
    let mut cursor = 0;

    for raw in SEPARATOR.split(prompt) {
        let fragment = raw.trim();
        if fragment.is_empty() {
            continue;
        }

        let Some(found) = prompt[cursor..].find(fragment) else {
            debug!(fragment, cursor, "fragment not found after cursor, dropping");
            continue;
        };
        let start = cursor + found;
        let end = start + fragment.len();
        cursor = end;

        segments.push(build_segment(prompt, fragment, start, end, rng));
    }

    if segments.is_empty() {
        segments.push(whole_prompt_segment(prompt));
    }

    SegmentedPrompt {
        session_id: session_id.to_string(),
        original_prompt: prompt.to_string(),
        segments,
        created_at: Utc::now(),
        source: SegmentationSource::Heuristic,
        fallback_reason: None,
    }
}

fn build_segment<R: Rng>(
    prompt: &str,
    fragment: &str,
    start: usize,
    end: usize,
    rng: &mut R,
) -> Segment {
    let word_count = fragment.split_whitespace().count();
    let (category, hits) = classify(fragment);
    let confidence = (hits > 0)
        .then(|| (0.5 + 0.5 * hits as f64 / word_count.max(1) as f64).min(0.95));

    Segment {
        id: Uuid::new_v4().to_string(),
        text: fragment.to_string(),
        segment_type: SegmentType::for_text(fragment),
        start_index: char_offset(prompt, start),
        end_index: char_offset(prompt, end),
        metadata: SegmentMetadata {
            category,
            importance: 0.5 + rng.gen::<f64>() * 0.5,
            confidence,
            color: category.color().to_string(),
        },
    }
}

fn whole_prompt_segment(prompt: &str) -> Segment {
    Segment {
        id: Uuid::new_v4().to_string(),
        text: prompt.to_string(),
        segment_type: SegmentType::SemanticChunk,
        start_index: 0,
        end_index: prompt.chars().count(),
        metadata: SegmentMetadata {
            category: Category::Context,
            importance: 1.0,
            confidence: None,
            color: Category::Context.color().to_string(),
        },
    }
}

/// Converts a byte offset on a char boundary into a character offset.
fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
