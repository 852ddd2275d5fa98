//! Text processing: normalization, toxicity guard, statistical
//! classification, seed corpus loading.

pub mod classifier;
pub mod corpus;
pub mod normalize;
pub mod toxicity;

pub use classifier::{NaiveBayesClassifier, TrainedModel};
pub use corpus::{LabeledExample, load_seed_corpus};
pub use normalize::{clean_text, normalize};
pub use toxicity::{TOXIC_CONFIDENCE, ToxicityGuard};
