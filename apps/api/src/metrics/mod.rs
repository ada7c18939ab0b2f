//! Trust metrics: user-reported transparency, understanding, trust and
//! usefulness scores plus interaction counters.
//!
//! Storage and aggregation belong to the backend; this module validates
//! what the UI submits and relays summaries back. Field names are camelCase
//! towards the UI and snake_case towards the backend.

pub mod handlers;

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Likert scale of every score.
pub const SCORE_RANGE: RangeInclusive<i64> = 1..=5;

fn consent_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"))]
pub struct UserMetrics {
    pub session_id: String,
    pub transparency_score: i64,
    pub understanding_score: i64,
    pub trust_score: i64,
    pub usefulness_score: i64,
    pub interaction_count: i64,
    pub time_spent_seconds: f64,
    pub segments_edited: i64,
    pub whatif_uses: i64,
    pub heatmap_interactions: i64,
}

impl UserMetrics {
    /// Scores must be 1–5; counters and time must not be negative.
    pub fn validate(&self) -> Result<(), String> {
        let scores = [
            ("transparencyScore", self.transparency_score),
            ("understandingScore", self.understanding_score),
            ("trustScore", self.trust_score),
            ("usefulnessScore", self.usefulness_score),
        ];
        for (name, score) in scores {
            if !SCORE_RANGE.contains(&score) {
                return Err(format!(
                    "{name} must be between {} and {}, got {score}",
                    SCORE_RANGE.start(),
                    SCORE_RANGE.end()
                ));
            }
        }

        let counters = [
            ("interactionCount", self.interaction_count),
            ("segmentsEdited", self.segments_edited),
            ("whatifUses", self.whatif_uses),
            ("heatmapInteractions", self.heatmap_interactions),
        ];
        for (name, count) in counters {
            if count < 0 {
                return Err(format!("{name} must not be negative, got {count}"));
            }
        }

        if !self.time_spent_seconds.is_finite() || self.time_spent_seconds < 0.0 {
            return Err("timeSpentSeconds must be a non-negative number".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"))]
pub struct MetricsSubmission {
    pub session_id: String,
    pub metrics: UserMetrics,
    #[serde(default)]
    pub feedback_text: Option<String>,
    /// Without consent the backend acknowledges but does not store.
    #[serde(default = "consent_default")]
    pub consent_given: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct MetricsReceipt {
    pub success: bool,
    pub message: String,
    pub metrics_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct MetricsSummary {
    pub total_sessions: u64,
    pub average_transparency: f64,
    pub average_understanding: f64,
    pub average_trust: f64,
    pub average_usefulness: f64,
    pub average_time_spent: f64,
    pub total_whatif_uses: u64,
    /// metric name → score ("1".."5") → count
    #[serde(default)]
    pub distribution: BTreeMap<String, BTreeMap<String, u64>>,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> UserMetrics {
        UserMetrics {
            session_id: "s1".to_string(),
            transparency_score: 4,
            understanding_score: 5,
            trust_score: 3,
            usefulness_score: 1,
            interaction_count: 12,
            time_spent_seconds: 95.5,
            segments_edited: 2,
            whatif_uses: 1,
            heatmap_interactions: 0,
        }
    }

    #[test]
    fn test_valid_metrics_pass() {
        assert!(metrics().validate().is_ok());
    }

    #[test]
    fn test_scores_outside_scale_are_rejected() {
        let zero = UserMetrics {
            trust_score: 0,
            ..metrics()
        };
        assert!(zero.validate().unwrap_err().contains("trustScore"));

        let six = UserMetrics {
            transparency_score: 6,
            ..metrics()
        };
        assert!(six.validate().unwrap_err().contains("transparencyScore"));
    }

    #[test]
    fn test_negative_counters_are_rejected() {
        let negative = UserMetrics {
            whatif_uses: -1,
            ..metrics()
        };
        assert!(negative.validate().unwrap_err().contains("whatifUses"));

        let time = UserMetrics {
            time_spent_seconds: -0.5,
            ..metrics()
        };
        assert!(time.validate().is_err());
    }

    #[test]
    fn test_submission_reads_camel_case_and_writes_snake_case() {
        let json = r#"{
            "sessionId": "s1",
            "metrics": {
                "sessionId": "s1",
                "transparencyScore": 4, "understandingScore": 5,
                "trustScore": 3, "usefulnessScore": 1,
                "interactionCount": 12, "timeSpentSeconds": 95.5,
                "segmentsEdited": 2, "whatifUses": 1, "heatmapInteractions": 0
            }
        }"#;
        let submission: MetricsSubmission = serde_json::from_str(json).unwrap();
        assert!(submission.consent_given);
        assert_eq!(submission.metrics, metrics());

        let wire = serde_json::to_value(&submission).unwrap();
        assert_eq!(wire["session_id"], "s1");
        assert_eq!(wire["metrics"]["trust_score"], 3);
        assert_eq!(wire["consent_given"], true);
    }

    #[test]
    fn test_summary_reads_backend_and_writes_camel_case() {
        let json = r#"{
            "total_sessions": 2,
            "average_transparency": 4.5,
            "average_understanding": 4.0,
            "average_trust": 3.5,
            "average_usefulness": 3.0,
            "average_time_spent": 120.0,
            "total_whatif_uses": 3,
            "distribution": {"trust": {"1": 0, "2": 0, "3": 1, "4": 1, "5": 0}},
            "timestamp": "2024-01-01T00:00:00"
        }"#;
        let summary: MetricsSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.distribution["trust"]["4"], 1);

        let ui = serde_json::to_value(&summary).unwrap();
        assert_eq!(ui["totalSessions"], 2);
        assert_eq!(ui["averageTrust"], 3.5);
        assert_eq!(ui["distribution"]["trust"]["3"], 1);
    }
}
