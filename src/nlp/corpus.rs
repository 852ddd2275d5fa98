//! Seed corpus loading.
//!
//! The labeled sentences that bootstrap the classifier when no persisted
//! model exists are a versioned configuration asset, not code — quality
//! iterations must not touch orchestration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrainError;
use crate::pipeline::Category;

/// Default corpus shipped with the repo.
const DEFAULT_CORPUS: &str = include_str!("../../assets/seed_corpus.json");

/// One labeled training sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledExample {
    pub text: String,
    pub label: Category,
}

/// Load the seed corpus from `path`, or the embedded copy when no path
/// is configured. A configured-but-unreadable file is an error — a
/// deployment that points at a corpus should not silently train on the
/// default one.
pub fn load_seed_corpus(path: Option<&Path>) -> Result<Vec<LabeledExample>, TrainError> {
    match path {
        Some(path) => {
            let contents =
                std::fs::read_to_string(path).map_err(|e| TrainError::CorpusUnreadable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            parse_corpus(&contents, &path.display().to_string())
        }
        None => parse_corpus(DEFAULT_CORPUS, "embedded"),
    }
}

fn parse_corpus(contents: &str, source: &str) -> Result<Vec<LabeledExample>, TrainError> {
    serde_json::from_str(contents).map_err(|e| TrainError::CorpusUnreadable {
        path: source.to_string(),
        reason: e.to_string(),
    })
}
