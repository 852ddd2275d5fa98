//! Gemini-backed reply strategy.
//!
//! Direct REST client against the Generative Language API. The remote
//! model identifier is resolved lazily on first use and cached for the
//! process lifetime; the resolution decision itself is a pure function
//! over the provider's model listing so it can be tested offline.
//!
//! Besides reply generation, the strategy can classify text on its own
//! through a structured-JSON prompt, falling back to a local keyword
//! heuristic when the remote output is malformed. The primary pipeline
//! configuration does not use this capability — categorization belongs
//! to the statistical classifier.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::ReplyGenerator;
use crate::error::{ConfigError, LlmError};
use crate::pipeline::Category;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Ordered fallback candidates when no usable model is configured.
const PREFERRED_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro-latest",
];

/// Truncation bound for the original text inside the reply prompt.
const REPLY_TEXT_MAX_CHARS: usize = 1200;

/// Truncation bound for the original text inside the classification prompt.
const CLASSIFY_TEXT_MAX_CHARS: usize = 3000;

/// Confidence attached to the local keyword heuristic.
const HEURISTIC_CONFIDENCE: f64 = 0.65;

// ── Configuration ───────────────────────────────────────────────────

/// Connection settings for the Gemini strategy.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    /// Desired model id; resolution falls back when unset or unlisted.
    pub desired_model: Option<String>,
    /// Upper bound on any single provider call.
    pub timeout: Duration,
}

// ── Model resolution ────────────────────────────────────────────────

/// One entry of the provider's model listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    /// Absent in some listings — treated as supported.
    #[serde(default, rename = "supportedGenerationMethods")]
    pub supported_generation_methods: Option<Vec<String>>,
}

impl ModelInfo {
    fn supports_generation(&self) -> bool {
        match &self.supported_generation_methods {
            Some(methods) => methods.iter().any(|m| m == "generateContent"),
            None => true,
        }
    }
}

fn normalize_model_name(name: &str) -> &str {
    name.trim().strip_prefix("models/").unwrap_or(name.trim())
}

/// Pick the model id to bind: the desired id when listed and usable, a
/// `-latest` alias for unlisted `-flash` ids, then the preference list,
/// then the first listed model that supports generation.
pub fn resolve_model_name(
    desired: Option<&str>,
    available: &[ModelInfo],
) -> Result<String, LlmError> {
    let usable = |id: &str| {
        available
            .iter()
            .find(|m| normalize_model_name(&m.name) == id)
            .is_some_and(ModelInfo::supports_generation)
    };

    if let Some(desired) = desired.map(normalize_model_name).filter(|d| !d.is_empty()) {
        if usable(desired) {
            info!(model = desired, "Using configured Gemini model");
            return Ok(desired.to_string());
        }
        if desired.ends_with("-flash") {
            let alt = format!("{desired}-latest");
            if usable(&alt) {
                warn!(model = desired, alt = %alt, "Configured model not listed, using alias");
                return Ok(alt);
            }
        }
        warn!(model = desired, "Configured model unsupported, trying fallbacks");
    }

    for candidate in PREFERRED_MODELS {
        if usable(candidate) {
            info!(model = candidate, "Using fallback Gemini model");
            return Ok((*candidate).to_string());
        }
    }

    if let Some(model) = available.iter().find(|m| m.supports_generation()) {
        let name = normalize_model_name(&model.name).to_string();
        info!(model = %name, "Using first listed model with generation support");
        return Ok(name);
    }

    Err(LlmError::NoUsableModel)
}

// ── Strategy ────────────────────────────────────────────────────────

/// External-service reply strategy, bound lazily to a resolved model.
pub struct GeminiReply {
    client: reqwest::Client,
    api_key: SecretString,
    desired_model: Option<String>,
    resolved_model: OnceCell<String>,
}

impl GeminiReply {
    /// Build the strategy. The credential must already be present in
    /// the config — its absence is a configuration error raised before
    /// this point, never at request time.
    pub fn new(config: GeminiConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "GEMINI_TIMEOUT_SECS".into(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            api_key: config.api_key,
            desired_model: config.desired_model,
            resolved_model: OnceCell::new(),
        })
    }

    /// The bound model id, resolving it on first use.
    async fn model_id(&self) -> Result<&str, LlmError> {
        self.resolved_model
            .get_or_try_init(|| async {
                let available = self.list_models().await?;
                resolve_model_name(self.desired_model.as_deref(), &available)
            })
            .await
            .map(String::as_str)
    }

    /// `GET /models` — the provider's listing of supported models.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        #[derive(Deserialize)]
        struct ModelListing {
            #[serde(default)]
            models: Vec<ModelInfo>,
        }

        let response = self
            .client
            .get(format!("{API_BASE}/models"))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: "gemini".into(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                provider: "gemini".into(),
                reason: format!("list models failed ({status}): {body}"),
            });
        }

        let listing: ModelListing =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                provider: "gemini".into(),
                reason: e.to_string(),
            })?;
        Ok(listing.models)
    }

    /// `POST /models/{id}:generateContent` — one generation call.
    async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
        let model = self.model_id().await?;
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(format!("{API_BASE}/models/{model}:generateContent"))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: "gemini".into(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                provider: "gemini".into(),
                reason: format!("generateContent failed ({status}): {body}"),
            });
        }

        #[derive(Deserialize)]
        struct GenerateResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: CandidateContent,
        }
        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<Part>,
        }
        #[derive(Deserialize)]
        struct Part {
            #[serde(default)]
            text: String,
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                provider: "gemini".into(),
                reason: e.to_string(),
            })?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: "gemini".into(),
                reason: "empty candidate text".into(),
            });
        }
        Ok(text.trim().to_string())
    }

    /// Ancillary classification through the remote model; recovers to
    /// the local keyword heuristic on malformed output or any provider
    /// error.
    pub async fn classify(&self, raw_text: &str) -> (Category, f64) {
        let prompt = build_classify_prompt(raw_text);
        match self.generate_content(&prompt).await {
            Ok(output) => match parse_classification(&output) {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "Unparseable Gemini classification, using keyword heuristic");
                    keyword_heuristic(raw_text)
                }
            },
            Err(e) => {
                warn!(error = %e, "Gemini classification call failed, using keyword heuristic");
                keyword_heuristic(raw_text)
            }
        }
    }
}

#[async_trait]
impl ReplyGenerator for GeminiReply {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, category: Category, original_text: &str) -> Result<String, LlmError> {
        let prompt = build_reply_prompt(category, original_text);
        self.generate_content(&prompt).await
    }
}

// ── Prompts ─────────────────────────────────────────────────────────

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn build_reply_prompt(category: Category, original_text: &str) -> String {
    format!(
        "Você é um assistente de atendimento de uma empresa do setor financeiro.\n\
         Classificação do email: {category}.\n\
         Escreva uma resposta breve, clara e cordial em PT-BR, com tom profissional.\n\
         Se for Productive, agradeça, diga que analisará/atualizará o status e peça \
         informações extras.\n\
         Se for Unproductive, agradeça e diga que não há ação necessária.\n\n\
         Email original (resuma discretamente, NÃO copie tudo):\n{}",
        truncate_chars(original_text, REPLY_TEXT_MAX_CHARS)
    )
}

fn build_classify_prompt(raw_text: &str) -> String {
    format!(
        "Classifique o email como \"Productive\" ou \"Unproductive\" e retorne JSON:\n\
         {{\"category\":\"Productive|Unproductive\",\"confidence\":0.xx}}\n\n\
         Email:\n{}",
        truncate_chars(raw_text, CLASSIFY_TEXT_MAX_CHARS)
    )
}

// ── Response parsing ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    category: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
}

fn default_confidence() -> f64 {
    HEURISTIC_CONFIDENCE
}

/// Parse the structured classification reply. Out-of-domain categories
/// are rejected so the fallback heuristic can take over.
fn parse_classification(raw: &str) -> Result<(Category, f64), LlmError> {
    let json = extract_json_object(raw);
    let parsed: ClassificationResponse = serde_json::from_str(&json)?;
    let category: Category =
        parsed
            .category
            .trim()
            .parse()
            .map_err(|reason| LlmError::InvalidResponse {
                provider: "gemini".into(),
                reason,
            })?;
    Ok((category, parsed.confidence.clamp(0.0, 1.0)))
}

/// Extract a JSON object from model output (handles markdown wrapping).
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}

// ── Local heuristic fallback ────────────────────────────────────────

/// Disjoint keyword sets; the category with more hits wins, ties
/// resolve to `Unproductive`.
const PRODUCTIVE_HINTS: &[&str] = &[
    "status", "ticket", "chamado", "senha", "fatura", "erro", "anexo", "suporte", "acesso",
    "boleto",
];
const UNPRODUCTIVE_HINTS: &[&str] = &[
    "obrigado", "obrigada", "parabéns", "feliz", "festas", "abraços", "agradeço", "bom dia",
];

fn keyword_heuristic(text: &str) -> (Category, f64) {
    let lowered = text.to_lowercase();
    let hits = |keywords: &[&str]| keywords.iter().filter(|k| lowered.contains(*k)).count();

    let category = if hits(PRODUCTIVE_HINTS) > hits(UNPRODUCTIVE_HINTS) {
        Category::Productive
    } else {
        Category::Unproductive
    };
    (category, HEURISTIC_CONFIDENCE)
}
