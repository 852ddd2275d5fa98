//! Shared types for the classification pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Message ─────────────────────────────────────────────────────────

/// The subject text of one classification request.
///
/// Immutable, created per request, never persisted. There is no identity
/// beyond the content itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

// ── Category ────────────────────────────────────────────────────────

/// The two classification outcomes. Closed set — no third value exists.
///
/// The serde representation doubles as the wire and storage value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Productive,
    Unproductive,
}

impl Category {
    /// Stable wire string, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Productive => "Productive",
            Self::Unproductive => "Unproductive",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Productive" => Ok(Self::Productive),
            "Unproductive" => Ok(Self::Unproductive),
            other => Err(format!("unknown category: '{other}'")),
        }
    }
}

// ── Provenance tags ─────────────────────────────────────────────────

/// `classify_source` when the toxicity override fired.
pub const SOURCE_TOXICITY_GUARD: &str = "toxicity_guard";

/// `classify_source` for the statistical classifier.
pub const SOURCE_NAIVE_BAYES: &str = "naive_bayes";

// ── Pipeline outcome ────────────────────────────────────────────────

/// Result of one pipeline invocation.
///
/// Constructed once at the end of `execute`, returned to the caller,
/// not retained. The two source tags record which decision path
/// produced the category and the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub category: Category,
    /// Posterior probability of the predicted category, in [0, 1].
    pub confidence: f64,
    pub suggested_reply: String,
    pub classify_source: String,
    pub reply_source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_strings_are_stable() {
        assert_eq!(Category::Productive.as_str(), "Productive");
        assert_eq!(Category::Unproductive.as_str(), "Unproductive");
        assert_eq!(
            serde_json::to_string(&Category::Productive).unwrap(),
            "\"Productive\""
        );
    }

    #[test]
    fn category_round_trips_through_from_str() {
        for cat in [Category::Productive, Category::Unproductive] {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
        assert!("Spam".parse::<Category>().is_err());
    }

    #[test]
    fn outcome_serializes_contract_fields() {
        let outcome = PipelineOutcome {
            category: Category::Productive,
            confidence: 0.8732,
            suggested_reply: "Olá!".into(),
            classify_source: SOURCE_NAIVE_BAYES.into(),
            reply_source: "template".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["category"], "Productive");
        assert_eq!(json["confidence"], 0.8732);
        assert_eq!(json["classify_source"], "naive_bayes");
        assert_eq!(json["reply_source"], "template");
        assert!(json["suggested_reply"].is_string());
    }
}
