//! Keyword tables used to classify prompt fragments.
//!
//! Each table is compiled once into a case-insensitive, whole-word regex.
//! Multi-word keywords allow any run of whitespace between their words.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::segment::Category;

const STYLE_KEYWORDS: &[&str] = &[
    "realistic",
    "photorealistic",
    "hyperrealistic",
    "cartoon",
    "anime",
    "manga",
    "abstract",
    "impressionist",
    "surreal",
    "surrealist",
    "minimalist",
    "cyberpunk",
    "steampunk",
    "vaporwave",
    "retro",
    "vintage",
    "futuristic",
    "gothic",
    "baroque",
    "watercolor",
    "oil painting",
    "sketch",
    "pixel art",
    "digital art",
    "3d",
    "rendered",
    "cinematic",
    "dramatic",
    "artistic",
    "style",
    "aesthetic",
    "art style",
    "high quality",
    "4k",
    "8k",
    "hd",
    "masterpiece",
    "detailed",
    "highly detailed",
];

/// Color and light vocabulary.
const MODIFIER_KEYWORDS: &[&str] = &[
    "red",
    "orange",
    "yellow",
    "green",
    "blue",
    "purple",
    "violet",
    "pink",
    "black",
    "white",
    "gray",
    "grey",
    "golden",
    "silver",
    "neon",
    "pastel",
    "colorful",
    "vibrant",
    "muted",
    "monochrome",
    "dark",
    "bright",
    "light",
    "dim",
    "glowing",
    "shiny",
    "shadowy",
    "sunlit",
    "moonlit",
    "backlit",
    "soft light",
    "golden hour",
];

/// Person and object nouns.
const SUBJECT_KEYWORDS: &[&str] = &[
    "person",
    "people",
    "man",
    "woman",
    "boy",
    "girl",
    "child",
    "kid",
    "warrior",
    "knight",
    "wizard",
    "hero",
    "villain",
    "character",
    "portrait",
    "animal",
    "dog",
    "cat",
    "bird",
    "horse",
    "dragon",
    "robot",
    "alien",
    "creature",
    "car",
    "ship",
    "house",
    "castle",
    "tower",
    "tree",
    "flower",
    "umbrella",
    "sword",
    "book",
];

const ACTION_VERBS: &[&str] = &[
    "run", "walk", "sit", "stand", "fly", "swim", "dance", "fight", "jump", "eat", "sleep",
    "play", "read", "write", "hold", "hug", "climb", "ride", "sing", "cry", "smile", "laugh",
];

pub(crate) static STYLE: LazyLock<Regex> = LazyLock::new(|| keyword_regex(STYLE_KEYWORDS));
pub(crate) static MODIFIER: LazyLock<Regex> = LazyLock::new(|| keyword_regex(MODIFIER_KEYWORDS));
pub(crate) static SUBJECT: LazyLock<Regex> = LazyLock::new(|| keyword_regex(SUBJECT_KEYWORDS));

/// Common verbs plus any word ending in a gerund suffix.
pub(crate) static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    let verbs = ACTION_VERBS.join("|");
    Regex::new(&format!(r"(?i)\b(?:(?:{verbs})s?|[a-z]{{3,}}ing)\b"))
        .expect("action keyword regex is valid")
});

/// Separators between prompt fragments: commas and the whole words
/// and / with / in / on / at.
pub(crate) static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i),|\b(?:and|with|in|on|at)\b").expect("separator regex is valid")
});

fn keyword_regex(keywords: &[&str]) -> Regex {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| {
            k.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
        .expect("keyword regex is valid")
}

/// Keyword categories in the order `classify` tries them.
pub(crate) const CLASSIFY_ORDER: [Category; 4] = [
    Category::Style,
    Category::Modifier,
    Category::Subject,
    Category::Action,
];

// CLASSIFY_ORDER must ascend in `Category::priority`.
const _: () = {
    let mut i = 1;
    while i < CLASSIFY_ORDER.len() {
        assert!(CLASSIFY_ORDER[i - 1].priority() < CLASSIFY_ORDER[i].priority());
        i += 1;
    }
};

fn keyword_table(category: Category) -> Option<&'static Regex> {
    match category {
        Category::Style => Some(&*STYLE),
        Category::Modifier => Some(&*MODIFIER),
        Category::Subject => Some(&*SUBJECT),
        Category::Action => Some(&*ACTION),
        Category::Context | Category::Unknown => None,
    }
}

/// Classifies a fragment by the first keyword table (in priority order) with a
/// match. Returns the category and the number of keyword hits, or `Context`
/// with zero hits.
pub fn classify(fragment: &str) -> (Category, usize) {
    for category in CLASSIFY_ORDER {
        let Some(regex) = keyword_table(category) else {
            continue;
        };
        let hits = regex.find_iter(fragment).count();
        if hits > 0 {
            return (category, hits);
        }
    }
    (Category::Context, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_follow_priority() {
        assert!(CLASSIFY_ORDER.iter().all(|c| keyword_table(*c).is_some()));
        assert_eq!(
            CLASSIFY_ORDER.to_vec(),
            vec![
                Category::Style,
                Category::Modifier,
                Category::Subject,
                Category::Action
            ]
        );
    }

    #[test]
    fn test_style_wins_over_subject() {
        let (category, _) = classify("cyberpunk girl");
        assert_eq!(category, Category::Style);
    }

    #[test]
    fn test_modifier_wins_over_subject() {
        assert_eq!(classify("neon umbrella").0, Category::Modifier);
    }

    #[test]
    fn test_subject_and_action() {
        assert_eq!(classify("a girl").0, Category::Subject);
        assert_eq!(classify("slowly walking").0, Category::Action);
        assert_eq!(classify("dancing").0, Category::Action);
    }

    #[test]
    fn test_default_is_context() {
        assert_eq!(classify("the city"), (Category::Context, 0));
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        // "scar" contains "car" but is not the word "car"
        assert_eq!(classify("scarlet scar").0, Category::Context);
        assert_eq!(classify("Oil   Painting").0, Category::Style);
    }

    #[test]
    fn test_separator_is_case_insensitive_whole_word() {
        let parts: Vec<&str> = SEPARATOR.split("sand AND stone, island").collect();
        assert_eq!(parts, vec!["sand ", " stone", " island"]);
    }

    #[test]
    fn test_hits_are_counted() {
        assert_eq!(classify("red and blue"), (Category::Modifier, 2));
    }
}
