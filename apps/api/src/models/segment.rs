use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic role of a prompt segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Style,
    Subject,
    Context,
    Modifier,
    Action,
    Unknown,
}

impl Category {
    /// Display color. Keyed by category so a segment keeps its color across
    /// re-segmentation and edits.
    pub fn color(self) -> &'static str {
        match self {
            Category::Style => "#8B5CF6",
            Category::Subject => "#3B82F6",
            Category::Context => "#10B981",
            Category::Modifier => "#F59E0B",
            Category::Action => "#EF4444",
            Category::Unknown => "#6B7280",
        }
    }

    /// Classification rank. Lower ranks are tested first by the extractor.
    pub const fn priority(self) -> u8 {
        match self {
            Category::Style => 0,
            Category::Modifier => 1,
            Category::Subject => 2,
            Category::Action => 3,
            Category::Context => 4,
            Category::Unknown => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Style => "style",
            Category::Subject => "subject",
            Category::Context => "context",
            Category::Modifier => "modifier",
            Category::Action => "action",
            Category::Unknown => "unknown",
        }
    }
}

/// Granularity of a segment, derived from its word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    Keyword,
    Phrase,
    SemanticChunk,
}

impl SegmentType {
    /// Fragments with more words than this are phrases.
    const KEYWORD_MAX_WORDS: usize = 2;

    pub fn for_text(text: &str) -> Self {
        if text.split_whitespace().count() > Self::KEYWORD_MAX_WORDS {
            SegmentType::Phrase
        } else {
            SegmentType::Keyword
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetadata {
    pub category: Category,
    /// 0.0 – 1.0
    pub importance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub color: String,
}

/// A contiguous labeled span of a prompt.
///
/// `start_index` / `end_index` are character offsets (Unicode scalar values)
/// into the owning prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    pub start_index: usize,
    pub end_index: usize,
    pub metadata: SegmentMetadata,
}

impl Segment {
    pub fn category(&self) -> Category {
        self.metadata.category
    }

    pub fn importance(&self) -> f64 {
        self.metadata.importance
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SegmentError {
    #[error("segment {0} not found")]
    NotFound(String),

    #[error("segment text must not be empty")]
    EmptyText,
}

/// Who segmented a prompt. Heuristic segmentations stand in for the backend
/// and are labeled as such.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationSource {
    Backend,
    #[default]
    Heuristic,
}

/// A snapshot of one prompt and the segments extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentedPrompt {
    pub session_id: String,
    pub original_prompt: String,
    pub segments: Vec<Segment>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub source: SegmentationSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl SegmentedPrompt {
    /// Applies a user edit to one segment. The color follows the category.
    pub fn edit_segment(
        &mut self,
        id: &str,
        text: Option<&str>,
        category: Option<Category>,
    ) -> Result<&Segment, SegmentError> {
        let segment = self
            .segments
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SegmentError::NotFound(id.to_string()))?;

        if let Some(text) = text {
            let text = text.trim();
            if text.is_empty() {
                return Err(SegmentError::EmptyText);
            }
            segment.text = text.to_string();
        }
        if let Some(category) = category {
            segment.metadata.category = category;
            segment.metadata.color = category.color().to_string();
        }
        Ok(segment)
    }
}
