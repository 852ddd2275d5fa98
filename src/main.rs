use std::sync::Arc;

use mail_triage::config::{ReplyProvider, Settings};
use mail_triage::nlp::{NaiveBayesClassifier, ToxicityGuard, load_seed_corpus};
use mail_triage::pipeline::TriagePipeline;
use mail_triage::reply::{GeminiReply, ReplyGenerator, TemplateReply};
use mail_triage::store::FileModelStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading configuration.
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let settings = Settings::from_env();

    // ── Classifier ──────────────────────────────────────────────────
    let corpus = load_seed_corpus(settings.seed_corpus_path.as_deref())?;
    let store = FileModelStore::new(&settings.model_dir, &settings.model_file);
    let classifier = Arc::new(NaiveBayesClassifier::load_or_train(&store, &corpus)?);

    // ── Toxicity guard ──────────────────────────────────────────────
    let guard = ToxicityGuard::load(settings.toxicity_lexicon_path.as_deref());

    // ── Reply strategy ──────────────────────────────────────────────
    // Strategy construction failures degrade to templates; they must
    // never prevent startup.
    let reply: Arc<dyn ReplyGenerator> = match settings.reply_provider {
        ReplyProvider::Gemini => match settings.gemini_config().and_then(GeminiReply::new) {
            Ok(gemini) => Arc::new(gemini),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Gemini strategy failed to initialize, substituting templates"
                );
                Arc::new(TemplateReply::new())
            }
        },
        ReplyProvider::Template => Arc::new(TemplateReply::new()),
    };

    let pipeline = Arc::new(TriagePipeline::new(guard, classifier, reply));

    eprintln!("📬 mail-triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/process_email", settings.port);
    eprintln!("   Health: http://0.0.0.0:{}/health", settings.port);
    eprintln!("   Reply strategy: {}", pipeline.reply_source());
    eprintln!("   Model artifact: {}", store.path().display());

    // ── HTTP server ─────────────────────────────────────────────────
    let app = mail_triage::server::api_routes(pipeline);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", settings.port)).await?;
    tracing::info!(port = settings.port, "HTTP server started");
    axum::serve(listener, app).await?;

    Ok(())
}
