//! The classification-and-reply pipeline.

pub mod orchestrator;
pub mod types;

pub use orchestrator::TriagePipeline;
pub use types::{
    Category, Message, PipelineOutcome, SOURCE_NAIVE_BAYES, SOURCE_TOXICITY_GUARD,
};
