//! Classification orchestrator — the request-scoped decision pipeline.
//!
//! Two terminal paths per invocation, both producing a `PipelineOutcome`:
//! the toxicity override (deterministic rule, takes absolute precedence)
//! and the normal path (statistical classifier, then reply strategy).
//! Provenance of every decision is attached to the output.
//!
//! `execute` is total: every internal failure mode has a defined local
//! fallback, so a well-formed input always yields an outcome.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::nlp::classifier::NaiveBayesClassifier;
use crate::nlp::toxicity::{TOXIC_CONFIDENCE, ToxicityGuard};
use crate::pipeline::types::{
    Category, Message, PipelineOutcome, SOURCE_NAIVE_BAYES, SOURCE_TOXICITY_GUARD,
};
use crate::reply::{ReplyGenerator, TemplateReply};

/// Decimal digits kept on the reported confidence.
const CONFIDENCE_PRECISION: f64 = 10_000.0;

fn round_confidence(confidence: f64) -> f64 {
    (confidence * CONFIDENCE_PRECISION).round() / CONFIDENCE_PRECISION
}

/// Composes guard, classifier and reply strategy into one pipeline.
pub struct TriagePipeline {
    guard: ToxicityGuard,
    classifier: Arc<NaiveBayesClassifier>,
    reply: Arc<dyn ReplyGenerator>,
    /// Per-request fallback when the active strategy fails.
    fallback: TemplateReply,
}

impl TriagePipeline {
    pub fn new(
        guard: ToxicityGuard,
        classifier: Arc<NaiveBayesClassifier>,
        reply: Arc<dyn ReplyGenerator>,
    ) -> Self {
        Self {
            guard,
            classifier,
            reply,
            fallback: TemplateReply::new(),
        }
    }

    /// Tag of the active reply strategy.
    pub fn reply_source(&self) -> &'static str {
        self.reply.name()
    }

    /// Run the full pipeline on one message.
    pub async fn execute(&self, text: &str) -> PipelineOutcome {
        // Deterministic safety rule first — bypasses the classifier.
        if self.guard.is_toxic(text) {
            info!("Toxicity guard fired, overriding classification");
            let (suggested_reply, reply_source) = self.toxic_reply(text).await;
            return PipelineOutcome {
                category: Category::Unproductive,
                confidence: TOXIC_CONFIDENCE,
                suggested_reply,
                classify_source: SOURCE_TOXICITY_GUARD.to_string(),
                reply_source,
            };
        }

        let message = Message::new(text);
        let (category, confidence) = self.classifier.predict(&message);
        debug!(
            category = %category,
            confidence,
            "Statistical classification complete"
        );

        let (suggested_reply, reply_source) = self.reply_for(category, text).await;
        PipelineOutcome {
            category,
            confidence: round_confidence(confidence),
            suggested_reply,
            classify_source: SOURCE_NAIVE_BAYES.to_string(),
            reply_source,
        }
    }

    /// Reply via the active strategy, falling back to templates for this
    /// request on any provider error. The tag names whichever generator
    /// actually produced the text, so fallbacks stay observable.
    async fn reply_for(&self, category: Category, text: &str) -> (String, String) {
        match self.reply.generate(category, text).await {
            Ok(reply) => (reply, self.reply.name().to_string()),
            Err(e) => {
                warn!(
                    strategy = self.reply.name(),
                    error = %e,
                    "Reply strategy failed, falling back to templates"
                );
                let reply = self
                    .fallback
                    .generate(category, text)
                    .await
                    .unwrap_or_default();
                (reply, self.fallback.name().to_string())
            }
        }
    }

    async fn toxic_reply(&self, text: &str) -> (String, String) {
        match self.reply.generate_toxic(text).await {
            Ok(reply) => (reply, self.reply.name().to_string()),
            Err(e) => {
                warn!(
                    strategy = self.reply.name(),
                    error = %e,
                    "Toxic reply failed, falling back to templates"
                );
                let reply = self.fallback.generate_toxic(text).await.unwrap_or_default();
                (reply, self.fallback.name().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::LlmError;
    use crate::nlp::load_seed_corpus;

    fn pipeline_with(reply: Arc<dyn ReplyGenerator>) -> TriagePipeline {
        let corpus = load_seed_corpus(None).unwrap();
        let classifier = Arc::new(NaiveBayesClassifier::train(&corpus).unwrap());
        TriagePipeline::new(ToxicityGuard::default(), classifier, reply)
    }

    fn template_pipeline() -> TriagePipeline {
        pipeline_with(Arc::new(TemplateReply::new()))
    }

    /// Strategy that always fails, as a timed-out provider would.
    struct FailingReply;

    #[async_trait]
    impl ReplyGenerator for FailingReply {
        fn name(&self) -> &'static str {
            "failing"
        }
        async fn generate(
            &self,
            _category: Category,
            _text: &str,
        ) -> Result<String, LlmError> {
            Err(LlmError::RequestFailed {
                provider: "failing".into(),
                reason: "timeout".into(),
            })
        }
    }

    /// Strategy with a fixed canned output.
    struct CannedReply(&'static str);

    #[async_trait]
    impl ReplyGenerator for CannedReply {
        fn name(&self) -> &'static str {
            "canned"
        }
        async fn generate(&self, _category: Category, _text: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn toxic_input_short_circuits_the_classifier() {
        let pipeline = template_pipeline();
        let outcome = pipeline.execute("vocês são uns idiotas").await;
        assert_eq!(outcome.category, Category::Unproductive);
        assert_eq!(outcome.confidence, TOXIC_CONFIDENCE);
        assert_eq!(outcome.classify_source, SOURCE_TOXICITY_GUARD);
    }

    #[tokio::test]
    async fn toxic_override_fires_in_any_casing() {
        let pipeline = template_pipeline();
        let outcome = pipeline.execute("VOCÊS SÃO UNS IDIOTAS!!!").await;
        assert_eq!(outcome.classify_source, SOURCE_TOXICITY_GUARD);
        assert_eq!(outcome.confidence, TOXIC_CONFIDENCE);
    }

    #[tokio::test]
    async fn toxic_path_uses_the_specialized_template() {
        let pipeline = template_pipeline();
        let outcome = pipeline.execute("seu idiota").await;
        assert!(outcome.suggested_reply.contains("respeitoso"));
        assert_eq!(outcome.reply_source, "template");
    }

    #[tokio::test]
    async fn non_toxic_text_never_carries_the_guard_tag() {
        let pipeline = template_pipeline();
        for text in [
            "Poderiam resetar minha senha?",
            "Feliz Natal! Boas festas.",
            "Qual o status do chamado?",
        ] {
            let outcome = pipeline.execute(text).await;
            assert_eq!(outcome.classify_source, SOURCE_NAIVE_BAYES);
        }
    }

    #[tokio::test]
    async fn password_request_scenario() {
        let pipeline = template_pipeline();
        let outcome = pipeline.execute("Poderiam resetar minha senha?").await;
        assert_eq!(outcome.category, Category::Productive);
        assert!(outcome.suggested_reply.contains("reset"));
        assert_eq!(outcome.reply_source, "template");
    }

    #[tokio::test]
    async fn holiday_greeting_scenario() {
        let pipeline = template_pipeline();
        let outcome = pipeline.execute("Feliz Natal! Boas festas.").await;
        assert_eq!(outcome.category, Category::Unproductive);
        assert!(outcome.suggested_reply.contains("Não há ação necessária"));
    }

    #[tokio::test]
    async fn confidence_is_rounded_and_bounded() {
        let pipeline = template_pipeline();
        let outcome = pipeline.execute("Preciso de atualização do chamado #1234.").await;
        assert!((0.0..=1.0).contains(&outcome.confidence));
        let rescaled = outcome.confidence * 10_000.0;
        assert!((rescaled - rescaled.round()).abs() < 1e-9);
    }

    #[tokio::test]
    async fn execute_is_deterministic_for_fixed_model() {
        let pipeline = template_pipeline();
        let a = pipeline.execute("Segue em anexo o relatório.").await;
        let b = pipeline.execute("Segue em anexo o relatório.").await;
        assert_eq!(a.category, b.category);
        assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
        assert_eq!(a.suggested_reply, b.suggested_reply);
    }

    #[tokio::test]
    async fn failing_strategy_falls_back_to_templates() {
        let pipeline = pipeline_with(Arc::new(FailingReply));
        let outcome = pipeline.execute("Poderiam resetar minha senha?").await;
        // Category/confidence from the classifier are preserved.
        assert_eq!(outcome.category, Category::Productive);
        assert_eq!(outcome.classify_source, SOURCE_NAIVE_BAYES);
        // The fallback decision is visible in the provenance tag.
        assert_eq!(outcome.reply_source, "template");
        assert!(outcome.suggested_reply.contains("reset"));
    }

    #[tokio::test]
    async fn failing_strategy_falls_back_on_the_toxic_path_too() {
        let pipeline = pipeline_with(Arc::new(FailingReply));
        let outcome = pipeline.execute("vai se ferrar").await;
        assert_eq!(outcome.classify_source, SOURCE_TOXICITY_GUARD);
        assert_eq!(outcome.reply_source, "template");
        assert!(outcome.suggested_reply.contains("respeitoso"));
    }

    #[tokio::test]
    async fn active_strategy_output_is_used_when_it_succeeds() {
        let pipeline = pipeline_with(Arc::new(CannedReply("resposta do modelo")));
        let outcome = pipeline.execute("Qual o status do chamado?").await;
        assert_eq!(outcome.suggested_reply, "resposta do modelo");
        assert_eq!(outcome.reply_source, "canned");
    }

    #[tokio::test]
    async fn empty_text_still_yields_an_outcome() {
        // The boundary rejects empty input; the orchestrator itself must
        // stay total even if handed one.
        let pipeline = template_pipeline();
        let outcome = pipeline.execute("").await;
        assert!((0.0..=1.0).contains(&outcome.confidence));
        assert!(!outcome.suggested_reply.is_empty());
    }
}
