//! Reply generation strategies.
//!
//! Exactly one strategy is active per process, selected at startup and
//! injected into the orchestrator. The template strategy is always
//! constructible and doubles as the per-request fallback when the
//! external strategy fails.

pub mod gemini;
pub mod templates;

pub use gemini::{GeminiConfig, GeminiReply};
pub use templates::TemplateReply;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::pipeline::Category;

/// A swappable generator turning (category, original text) into a
/// natural-language reply.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Provenance tag recorded as `reply_source` in the outcome.
    fn name(&self) -> &'static str;

    /// Produce a reply for the given category and original text.
    async fn generate(&self, category: Category, original_text: &str) -> Result<String, LlmError>;

    /// Specialized reply for input flagged by the toxicity guard.
    ///
    /// Strategies without a dedicated toxic sub-reply fall back to the
    /// plain `Unproductive` reply — the capability is this overridable
    /// method, never a runtime probe.
    async fn generate_toxic(&self, original_text: &str) -> Result<String, LlmError> {
        self.generate(Category::Unproductive, original_text).await
    }
}
