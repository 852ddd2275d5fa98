//! Error types for mail-triage.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model store error: {0}")]
    Store(#[from] StoreError),

    #[error("Training error: {0}")]
    Train(#[from] TrainError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Model artifact persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt model artifact at {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Classifier training errors — the only fatal initialization failures.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("Seed corpus is empty — cannot fit a classifier")]
    EmptyCorpus,

    #[error("Seed corpus has no {0} examples — cannot separate classes")]
    MissingCategory(crate::pipeline::Category),

    #[error("Failed to read seed corpus from {path}: {reason}")]
    CorpusUnreadable { path: String, reason: String },
}

/// Remote generation provider errors. Always recovered locally — these
/// never surface past the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("No listed model supports content generation")]
    NoUsableModel,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Input/extraction errors — the only errors visible at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("No text and no file supplied")]
    EmptyInput,

    #[error("Unsupported file type: {0}. Use .txt or .pdf")]
    UnsupportedKind(String),

    #[error("Failed to extract text from {kind} upload: {reason}")]
    ExtractionFailed { kind: String, reason: String },
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
