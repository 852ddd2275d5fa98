//! Service configuration, built from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::reply::GeminiConfig;

/// Which reply strategy to activate at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyProvider {
    #[default]
    Template,
    Gemini,
}

/// Service settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// HTTP listen port.
    pub port: u16,
    /// Directory holding the persisted model artifact.
    pub model_dir: PathBuf,
    /// Artifact file name inside `model_dir`.
    pub model_file: String,
    /// Active reply strategy.
    pub reply_provider: ReplyProvider,
    /// Gemini credential; absence disables the Gemini strategy.
    pub gemini_api_key: Option<SecretString>,
    /// Desired Gemini model id, resolved against the provider listing.
    pub gemini_model: Option<String>,
    /// Upper bound on any single Gemini call.
    pub gemini_timeout: Duration,
    /// Optional override for the seed corpus asset.
    pub seed_corpus_path: Option<PathBuf>,
    /// Optional override for the toxicity lexicon asset.
    pub toxicity_lexicon_path: Option<PathBuf>,
}

impl Settings {
    /// Build settings from environment variables, with defaults for
    /// everything that has a sensible one.
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8000);

        let model_dir = std::env::var("MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("model_artifacts"));

        let model_file =
            std::env::var("MODEL_FILE").unwrap_or_else(|_| "clf_nb_bow.json".to_string());

        let reply_provider = match std::env::var("REPLY_PROVIDER").as_deref() {
            Ok("gemini") => ReplyProvider::Gemini,
            _ => ReplyProvider::Template,
        };

        // GOOGLE_API_KEY accepted as an alternative credential variable.
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        let gemini_model = std::env::var("GEMINI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty());

        let gemini_timeout = Duration::from_secs(
            std::env::var("GEMINI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
        );

        let seed_corpus_path = std::env::var("SEED_CORPUS_PATH").ok().map(PathBuf::from);
        let toxicity_lexicon_path = std::env::var("TOXICITY_LEXICON_PATH")
            .ok()
            .map(PathBuf::from);

        Self {
            port,
            model_dir,
            model_file,
            reply_provider,
            gemini_api_key,
            gemini_model,
            gemini_timeout,
            seed_corpus_path,
            toxicity_lexicon_path,
        }
    }

    /// Gemini strategy configuration. A missing credential is a
    /// configuration error raised here, at construction time, never at
    /// request time.
    pub fn gemini_config(&self) -> Result<GeminiConfig, ConfigError> {
        let api_key = self
            .gemini_api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("GEMINI_API_KEY".into()))?;
        Ok(GeminiConfig {
            api_key,
            desired_model: self.gemini_model.clone(),
            timeout: self.gemini_timeout,
        })
    }
}
