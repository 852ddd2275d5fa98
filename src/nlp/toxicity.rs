//! Lexicon-based toxicity guard.
//!
//! Runs before the statistical classifier and short-circuits it: abusive
//! input is forced to `Unproductive` at near-certain confidence, keeping
//! the override auditable independent of model drift.
//!
//! Matching is deliberately crude — lower-cased substring membership on
//! the raw text, no normalization — so punctuation-mangled abuse still
//! matches.

use std::path::Path;

use tracing::debug;

/// Confidence attached to the override — near-certain by policy.
pub const TOXIC_CONFIDENCE: f64 = 0.99;

/// Default lexicon shipped with the repo. Tunable policy, not contract.
const DEFAULT_LEXICON: &str = include_str!("../../assets/toxicity_lexicon.txt");

/// Lexicon-based abusive-input predicate.
#[derive(Debug, Clone)]
pub struct ToxicityGuard {
    terms: Vec<String>,
}

impl ToxicityGuard {
    /// Build a guard from lexicon file contents: one term per line,
    /// blank lines and `#` comments skipped, terms lower-cased.
    pub fn from_lexicon(contents: &str) -> Self {
        let terms = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Self { terms }
    }

    /// Load the lexicon from `path`, or fall back to the embedded copy
    /// when no path is configured or the file is unreadable.
    pub fn load(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            match std::fs::read_to_string(path) {
                Ok(contents) => return Self::from_lexicon(&contents),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read toxicity lexicon, using embedded default"
                    );
                }
            }
        }
        Self::from_lexicon(DEFAULT_LEXICON)
    }

    /// True when any lexicon term occurs in the lower-cased raw text.
    pub fn is_toxic(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        for term in &self.terms {
            if lowered.contains(term.as_str()) {
                debug!(term = %term, "Toxicity guard matched");
                return true;
            }
        }
        false
    }

    /// Number of loaded lexicon terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for ToxicityGuard {
    fn default() -> Self {
        Self::from_lexicon(DEFAULT_LEXICON)
    }
}
