//! Word-level diff between two texts.
//!
//! A forward-scanning lookahead alignment, not a minimal edit script. It is
//! cheap and stable, and keeps the UI's highlighting predictable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordDiffKind {
    Added,
    Removed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDiff {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: WordDiffKind,
}

impl WordDiff {
    fn new(text: &str, kind: WordDiffKind) -> Self {
        Self {
            text: text.to_string(),
            kind,
        }
    }
}

/// Aligns the whitespace-separated words of `old_text` and `new_text`.
///
/// At a mismatch, the new word is looked up in the remaining old words and
/// the old word in the remaining new words. The shorter lookahead wins:
/// found-in-old consumes the old word as `Removed`, found-in-new consumes the
/// new word as `Added`. Ties go to `Removed`. When neither is found both words
/// are consumed, old first.
pub fn diff_words(old_text: &str, new_text: &str) -> Vec<WordDiff> {
    let old: Vec<&str> = old_text.split_whitespace().collect();
    let new: Vec<&str> = new_text.split_whitespace().collect();
    let mut diffs = Vec::with_capacity(old.len().max(new.len()));

    let (mut i, mut j) = (0, 0);
    while i < old.len() || j < new.len() {
        if i == old.len() {
            diffs.push(WordDiff::new(new[j], WordDiffKind::Added));
            j += 1;
            continue;
        }
        if j == new.len() {
            diffs.push(WordDiff::new(old[i], WordDiffKind::Removed));
            i += 1;
            continue;
        }
        if old[i] == new[j] {
            diffs.push(WordDiff::new(old[i], WordDiffKind::Unchanged));
            i += 1;
            j += 1;
            continue;
        }

        let new_word_in_old = lookahead(&old[i..], new[j]);
        let old_word_in_new = lookahead(&new[j..], old[i]);

        match (new_word_in_old, old_word_in_new) {
            (Some(in_old), Some(in_new)) if in_new < in_old => {
                diffs.push(WordDiff::new(new[j], WordDiffKind::Added));
                j += 1;
            }
            (Some(_), _) => {
                diffs.push(WordDiff::new(old[i], WordDiffKind::Removed));
                i += 1;
            }
            (None, Some(_)) => {
                diffs.push(WordDiff::new(new[j], WordDiffKind::Added));
                j += 1;
            }
            (None, None) => {
                diffs.push(WordDiff::new(old[i], WordDiffKind::Removed));
                diffs.push(WordDiff::new(new[j], WordDiffKind::Added));
                i += 1;
                j += 1;
            }
        }
    }

    diffs
}

fn lookahead(words: &[&str], target: &str) -> Option<usize> {
    words.iter().position(|w| *w == target)
}

/// Dice coefficient over the aligned words: `2 * unchanged / (|old| + |new|)`.
/// Two empty texts are identical.
pub fn word_similarity(old_text: &str, new_text: &str) -> f64 {
    let diffs = diff_words(old_text, new_text);
    let unchanged = diffs
        .iter()
        .filter(|d| d.kind == WordDiffKind::Unchanged)
        .count();
    let total = old_text.split_whitespace().count() + new_text.split_whitespace().count();
    if total == 0 {
        return 1.0;
    }
    2.0 * unchanged as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(diffs: &[WordDiff]) -> Vec<(WordDiffKind, &str)> {
        diffs.iter().map(|d| (d.kind, d.text.as_str())).collect()
    }

    fn side(diffs: &[WordDiff], skip: WordDiffKind) -> Vec<&str> {
        diffs
            .iter()
            .filter(|d| d.kind != skip)
            .map(|d| d.text.as_str())
            .collect()
    }

    #[test]
    fn test_substitution() {
        use WordDiffKind::*;
        let diffs = diff_words("a red car", "a blue car");
        assert_eq!(
            render(&diffs),
            vec![
                (Unchanged, "a"),
                (Removed, "red"),
                (Added, "blue"),
                (Unchanged, "car")
            ]
        );
    }

    #[test]
    fn test_insertion_is_added() {
        use WordDiffKind::*;
        let diffs = diff_words("a car", "a fast car");
        assert_eq!(
            render(&diffs),
            vec![(Unchanged, "a"), (Added, "fast"), (Unchanged, "car")]
        );
    }

    #[test]
    fn test_deletion_is_removed() {
        use WordDiffKind::*;
        let diffs = diff_words("a very old car", "a car");
        assert_eq!(
            render(&diffs),
            vec![
                (Unchanged, "a"),
                (Removed, "very"),
                (Removed, "old"),
                (Unchanged, "car")
            ]
        );
    }

    #[test]
    fn test_tie_prefers_removed() {
        use WordDiffKind::*;
        // "x" is one ahead in new, "y" is one ahead in old.
        let diffs = diff_words("x y", "y x");
        assert_eq!(
            render(&diffs),
            vec![(Removed, "x"), (Unchanged, "y"), (Added, "x")]
        );
    }

    #[test]
    fn test_shorter_lookahead_wins() {
        use WordDiffKind::*;
        // "q" never occurs in old while "a" is one ahead in new.
        let diffs = diff_words("a x b", "q a b");
        assert_eq!(
            render(&diffs),
            vec![
                (Added, "q"),
                (Unchanged, "a"),
                (Removed, "x"),
                (Unchanged, "b")
            ]
        );
    }

    #[test]
    fn test_sides_reconstruct_inputs() {
        let cases = [
            ("a red car", "a blue car"),
            ("the quick brown fox", "a quick fox jumps"),
            ("one two three", ""),
            ("", "four five"),
            ("x y x y", "y x y x"),
            ("a a b b c", "c b a a b"),
        ];
        for (old, new) in cases {
            let diffs = diff_words(old, new);
            let old_words: Vec<&str> = old.split_whitespace().collect();
            let new_words: Vec<&str> = new.split_whitespace().collect();
            assert_eq!(side(&diffs, WordDiffKind::Added), old_words, "{old:?} -> {new:?}");
            assert_eq!(side(&diffs, WordDiffKind::Removed), new_words, "{old:?} -> {new:?}");
        }
    }

    #[test]
    fn test_identical_texts_are_all_unchanged() {
        for text in ["", "one", "dark cyberpunk city, a girl with neon umbrella", "a a a"] {
            let diffs = diff_words(text, text);
            assert!(diffs.iter().all(|d| d.kind == WordDiffKind::Unchanged));
            assert_eq!(diffs.len(), text.split_whitespace().count());
        }
    }

    #[test]
    fn test_empty_inputs() {
        assert!(diff_words("", "").is_empty());
        assert!(diff_words("   ", "\n").is_empty());
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let diffs = diff_words("Car", "car");
        assert_eq!(diffs.len(), 2);
    }

    #[test]
    fn test_word_similarity() {
        assert_eq!(word_similarity("", ""), 1.0);
        assert_eq!(word_similarity("a b", "a b"), 1.0);
        assert_eq!(word_similarity("a b", "c d"), 0.0);
        // 2 unchanged of 3 + 3 words
        let sim = word_similarity("a red car", "a blue car");
        assert!((sim - 4.0 / 6.0).abs() < 1e-9);
    }
}
