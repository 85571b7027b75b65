//! Brewflow server entry point

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use brewflow_agent::{Agent, FlowController, LlmFieldExtractor, MemoryLeadSink};
use brewflow_config::{load_settings, Settings};
use brewflow_llm::{LlmConfig, OllamaBackend};
use brewflow_rag::{
    load_corpus, HttpEmbedder, HttpEmbedderConfig, KnowledgeRetriever, RetrieverConfig,
    VectorIndex,
};
use brewflow_server::{create_router, AppState, DashSessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.toml > config/default.toml > defaults
    let env = std::env::var("BREWFLOW_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Warning: failed to load config: {}. Using defaults.", e);
            Settings::default()
        },
    };

    init_tracing(&settings);
    tracing::info!("Starting brewflow server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?settings.environment,
        config = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let llm = Arc::new(OllamaBackend::new(LlmConfig {
        model: settings.llm.model.clone(),
        endpoint: settings.llm.endpoint.clone(),
        temperature: settings.llm.temperature,
        max_tokens: settings.llm.max_tokens,
        timeout_secs: settings.llm.timeout_secs,
        max_retries: settings.llm.max_retries,
    })?);

    let retriever = if settings.rag.enabled {
        match init_retriever(&settings).await {
            Ok(retriever) => {
                tracing::info!(
                    corpus = %settings.rag.corpus_path,
                    "knowledge retriever ready"
                );
                Some(Arc::new(retriever))
            },
            Err(e) => {
                tracing::warn!(error = %e, "retriever init failed, answering ungrounded");
                None
            },
        }
    } else {
        tracing::info!("knowledge retrieval disabled");
        None
    };

    let extractor = Arc::new(LlmFieldExtractor::new(llm.clone()));
    let flow = FlowController::new(llm, extractor, retriever, settings.qualification.clone());

    let sessions = Arc::new(DashSessionStore::new());
    let lead_sink = Arc::new(MemoryLeadSink::new());
    let agent = Arc::new(Agent::new(flow, sessions.clone(), lead_sink));

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    let app = create_router(AppState::new(agent, sessions, settings));

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Index the corpus and wire the retriever
async fn init_retriever(settings: &Settings) -> anyhow::Result<KnowledgeRetriever> {
    let embedder = Arc::new(HttpEmbedder::new(HttpEmbedderConfig {
        endpoint: settings.rag.embed_endpoint.clone(),
        model: settings.rag.embed_model.clone(),
        embedding_dim: settings.rag.embedding_dim,
        timeout_secs: 10,
    })?);

    let documents = load_corpus(&settings.rag.corpus_path)?;
    let mut index = VectorIndex::new();
    index.index_documents(embedder.as_ref(), documents).await?;
    tracing::info!(chunks = index.len(), "knowledge corpus indexed");

    Ok(
        KnowledgeRetriever::new(embedder, Arc::new(index)).with_config(RetrieverConfig {
            top_k: settings.rag.top_k,
            min_score: settings.rag.min_score,
        }),
    )
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("brewflow={},tower_http=info", settings.observability.log_level).into()
    });

    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
