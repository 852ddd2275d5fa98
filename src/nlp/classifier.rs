//! Statistical text classifier — multinomial naive Bayes over
//! unigram+bigram bag-of-words features.
//!
//! Lifecycle: load a persisted artifact if one exists, otherwise fit on
//! the seed corpus and try to persist. The fitted state is immutable
//! after construction and shared read-only across requests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::TrainError;
use crate::nlp::corpus::LabeledExample;
use crate::nlp::normalize::feature_tokens;
use crate::pipeline::{Category, Message};
use crate::store::ModelStore;

/// Laplace smoothing constant.
const ALPHA: f64 = 1.0;

/// Class order inside the flattened parameter arrays.
const CLASSES: [Category; 2] = [Category::Productive, Category::Unproductive];

fn class_index(category: Category) -> usize {
    match category {
        Category::Productive => 0,
        Category::Unproductive => 1,
    }
}

/// Unigrams plus adjacent-pair bigrams over the normalized tokens.
fn extract_features(text: &str) -> Vec<String> {
    let tokens = feature_tokens(text);
    let mut features = tokens.clone();
    for pair in tokens.windows(2) {
        features.push(format!("{} {}", pair[0], pair[1]));
    }
    features
}

// ── Trained state ───────────────────────────────────────────────────

/// Fitted model parameters. Opaque to everything but the classifier and
/// the model store; any store capable of round-tripping this struct is
/// acceptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    vocab: HashMap<String, usize>,
    /// ln P(class), indexed like `CLASSES`.
    class_log_prior: [f64; 2],
    /// ln P(token | class), flattened `[2 * vocab_size]`.
    token_log_likelihood: Vec<f64>,
    vocab_size: usize,
    pub trained_at: DateTime<Utc>,
}

impl TrainedModel {
    /// Fit on a labeled corpus. Fails only when fitting is impossible:
    /// an empty corpus, or a corpus missing one of the two categories.
    pub fn fit(corpus: &[LabeledExample]) -> Result<Self, TrainError> {
        if corpus.is_empty() {
            return Err(TrainError::EmptyCorpus);
        }
        for category in CLASSES {
            if !corpus.iter().any(|e| e.label == category) {
                return Err(TrainError::MissingCategory(category));
            }
        }

        // Vocabulary over all features, min document frequency 1.
        let mut vocab: HashMap<String, usize> = HashMap::new();
        for example in corpus {
            for feature in extract_features(&example.text) {
                let next = vocab.len();
                vocab.entry(feature).or_insert(next);
            }
        }
        let vocab_size = vocab.len().max(1);

        let mut class_doc_counts = [0u32; 2];
        let mut class_token_counts = vec![0u32; 2 * vocab_size];
        let mut class_total_tokens = [0u32; 2];

        for example in corpus {
            let c = class_index(example.label);
            class_doc_counts[c] += 1;
            for feature in extract_features(&example.text) {
                if let Some(&ti) = vocab.get(&feature) {
                    class_token_counts[c * vocab_size + ti] += 1;
                    class_total_tokens[c] += 1;
                }
            }
        }

        let total_docs = f64::from(class_doc_counts[0] + class_doc_counts[1]);
        let mut class_log_prior = [0f64; 2];
        for c in 0..2 {
            class_log_prior[c] = (f64::from(class_doc_counts[c]) / total_docs).ln();
        }

        let mut token_log_likelihood = vec![0f64; 2 * vocab_size];
        for c in 0..2 {
            let denom = f64::from(class_total_tokens[c]) + ALPHA * vocab_size as f64;
            for ti in 0..vocab_size {
                let count = f64::from(class_token_counts[c * vocab_size + ti]);
                token_log_likelihood[c * vocab_size + ti] = ((count + ALPHA) / denom).ln();
            }
        }

        Ok(Self {
            vocab,
            class_log_prior,
            token_log_likelihood,
            vocab_size,
            trained_at: Utc::now(),
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Joint log scores for both classes on the given text.
    fn log_scores(&self, text: &str) -> [f64; 2] {
        let mut scores = self.class_log_prior;
        for feature in extract_features(text) {
            if let Some(&ti) = self.vocab.get(&feature) {
                for c in 0..2 {
                    scores[c] += self.token_log_likelihood[c * self.vocab_size + ti];
                }
            }
        }
        scores
    }
}

// ── Classifier ──────────────────────────────────────────────────────

/// Trainable two-class text classifier with calibrated confidence.
pub struct NaiveBayesClassifier {
    model: TrainedModel,
}

impl NaiveBayesClassifier {
    /// Fit a fresh model on the given corpus.
    pub fn train(corpus: &[LabeledExample]) -> Result<Self, TrainError> {
        Ok(Self {
            model: TrainedModel::fit(corpus)?,
        })
    }

    /// Load a persisted model, or fit on the seed corpus when the store
    /// is empty or unreadable. A failed save after training is logged
    /// and ignored — construction either yields a usable fitted model
    /// or fails because training itself was impossible.
    pub fn load_or_train(
        store: &dyn ModelStore,
        corpus: &[LabeledExample],
    ) -> Result<Self, TrainError> {
        match store.load() {
            Ok(Some(model)) => {
                info!(
                    vocab_size = model.vocab_size(),
                    trained_at = %model.trained_at,
                    "Loaded persisted classifier model"
                );
                return Ok(Self { model });
            }
            Ok(None) => {
                info!("No persisted model found, fitting on seed corpus");
            }
            Err(e) => {
                warn!(error = %e, "Persisted model unreadable, fitting on seed corpus");
            }
        }

        let model = TrainedModel::fit(corpus)?;
        info!(
            examples = corpus.len(),
            vocab_size = model.vocab_size(),
            "Classifier fitted on seed corpus"
        );
        if let Err(e) = store.save(&model) {
            warn!(error = %e, "Failed to persist trained model, serving in-memory");
        }
        Ok(Self { model })
    }

    /// Wrap an already-fitted model.
    pub fn from_model(model: TrainedModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    /// Predict the category and its posterior probability.
    ///
    /// Total: a degenerate score (non-finite after normalization) yields
    /// the safe default `(Unproductive, 0.5)` instead of an error, so a
    /// classifier fault can never abort the request.
    pub fn predict(&self, message: &Message) -> (Category, f64) {
        let scores = self.model.log_scores(message.text());

        // Normalize to a posterior with log-sum-exp.
        let max = scores[0].max(scores[1]);
        let lse = max + ((scores[0] - max).exp() + (scores[1] - max).exp()).ln();

        let best = if scores[0] >= scores[1] { 0 } else { 1 };
        let confidence = (scores[best] - lse).exp();

        if !confidence.is_finite() {
            warn!("Non-finite posterior from classifier, using safe default");
            return (Category::Unproductive, 0.5);
        }
        (CLASSES[best], confidence.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::nlp::corpus::load_seed_corpus;
    use crate::store::MemoryModelStore;

    fn seed() -> Vec<LabeledExample> {
        load_seed_corpus(None).unwrap()
    }

    fn example(text: &str, label: Category) -> LabeledExample {
        LabeledExample {
            text: text.into(),
            label,
        }
    }

    #[test]
    fn empty_corpus_fails_training() {
        assert!(matches!(
            NaiveBayesClassifier::train(&[]),
            Err(TrainError::EmptyCorpus)
        ));
    }

    #[test]
    fn single_class_corpus_fails_training() {
        let corpus = vec![
            example("preciso de status", Category::Productive),
            example("qual o andamento", Category::Productive),
        ];
        assert!(matches!(
            NaiveBayesClassifier::train(&corpus),
            Err(TrainError::MissingCategory(Category::Unproductive))
        ));
    }

    #[test]
    fn seed_corpus_round_trips_its_own_labels() {
        let corpus = seed();
        let clf = NaiveBayesClassifier::train(&corpus).unwrap();
        for ex in &corpus {
            let (category, confidence) = clf.predict(&Message::new(&ex.text));
            assert_eq!(category, ex.label, "misclassified seed: {}", ex.text);
            assert!((0.0..=1.0).contains(&confidence));
        }
    }

    #[test]
    fn prediction_is_deterministic() {
        let clf = NaiveBayesClassifier::train(&seed()).unwrap();
        let msg = Message::new("Poderiam verificar o status do chamado?");
        let (c1, p1) = clf.predict(&msg);
        let (c2, p2) = clf.predict(&msg);
        assert_eq!(c1, c2);
        assert_eq!(p1.to_bits(), p2.to_bits());
    }

    #[test]
    fn out_of_vocabulary_input_is_finite() {
        let clf = NaiveBayesClassifier::train(&seed()).unwrap();
        let (_, confidence) = clf.predict(&Message::new("zzz qqq xxx"));
        assert!(confidence.is_finite());
        assert!((0.0..=1.0).contains(&confidence));
    }

    #[test]
    fn password_request_is_productive() {
        let clf = NaiveBayesClassifier::train(&seed()).unwrap();
        let (category, _) = clf.predict(&Message::new("Preciso resetar a senha de acesso"));
        assert_eq!(category, Category::Productive);
    }

    #[test]
    fn holiday_greeting_is_unproductive() {
        let clf = NaiveBayesClassifier::train(&seed()).unwrap();
        let (category, _) = clf.predict(&Message::new("Feliz Natal! Boas festas."));
        assert_eq!(category, Category::Unproductive);
    }

    #[test]
    fn model_survives_serde_round_trip() {
        let clf = NaiveBayesClassifier::train(&seed()).unwrap();
        let json = serde_json::to_string(clf.model()).unwrap();
        let restored = NaiveBayesClassifier::from_model(serde_json::from_str(&json).unwrap());

        let msg = Message::new("Segue em anexo o relatório solicitado.");
        let (c1, p1) = clf.predict(&msg);
        let (c2, p2) = restored.predict(&msg);
        assert_eq!(c1, c2);
        assert_eq!(p1.to_bits(), p2.to_bits());
    }

    #[test]
    fn load_or_train_persists_freshly_fitted_model() {
        let store = MemoryModelStore::new();
        let _clf = NaiveBayesClassifier::load_or_train(&store, &seed()).unwrap();
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn load_or_train_prefers_the_persisted_model() {
        let tiny = vec![
            example("alfa beta", Category::Productive),
            example("gama delta", Category::Unproductive),
        ];
        let persisted = TrainedModel::fit(&tiny).unwrap();
        let stamp = persisted.trained_at;
        let store = MemoryModelStore::with_model(persisted);

        let clf = NaiveBayesClassifier::load_or_train(&store, &seed()).unwrap();
        assert_eq!(clf.model().trained_at, stamp);
        assert_eq!(clf.model().vocab_size(), 6);
    }

    /// Store whose load always fails, as a corrupt artifact would.
    struct CorruptStore;

    impl ModelStore for CorruptStore {
        fn save(&self, _model: &TrainedModel) -> Result<(), StoreError> {
            Err(StoreError::Corrupt {
                path: "corrupt".into(),
                reason: "write refused".into(),
            })
        }
        fn load(&self) -> Result<Option<TrainedModel>, StoreError> {
            Err(StoreError::Corrupt {
                path: "corrupt".into(),
                reason: "bad artifact".into(),
            })
        }
    }

    #[test]
    fn corrupt_store_falls_back_to_training() {
        let clf = NaiveBayesClassifier::load_or_train(&CorruptStore, &seed()).unwrap();
        let (category, _) = clf.predict(&Message::new("Poderiam resetar minha senha?"));
        assert_eq!(category, Category::Productive);
    }
}
