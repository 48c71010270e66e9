use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use orientation::config::Config;
use orientation::exploration::prompts::PromptTemplates;
use orientation::llm_client::{LlmClient, ProviderGateway, ProviderKind};
use orientation::routes::build_router;
use orientation::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Orientation API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(config.credentials.clone(), config.provider_timeout)?;
    for kind in ProviderKind::ALL {
        if llm.is_available(kind) {
            info!("{} available (model: {})", kind, kind.model());
        } else {
            warn!("{} not configured", kind);
        }
    }

    let prompts = match &config.prompts_dir {
        Some(dir) => {
            info!("Loading prompt overrides from {}", dir.display());
            PromptTemplates::with_overrides(dir)?
        }
        None => PromptTemplates::builtin(),
    };

    let state = AppState {
        llm: Arc::new(llm),
        prompts: Arc::new(prompts),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Serving {} on {addr}", config.public_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
