//! PromptQuest API Gateway
//!
//! Serves the progress, analytics, worlds, playground and gamification
//! endpoints plus the `/ws` event feed.

use promptquest_api_gateway::{config::GatewayConfig, open_store, router, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_gateway=info".parse()?)
                .add_directive("promptquest_api_gateway=info".parse()?)
                .add_directive("promptquest_progress=info".parse()?),
        )
        .json()
        .init();

    let config = GatewayConfig::load()?;
    info!("Configuration loaded: {:?}", config);

    let store = open_store(&config.progress)?;
    let state = AppState::new(store, config.event_buffer);

    let app = router(state);

    let addr = config.bind_addr();
    info!("PromptQuest API Gateway starting on {}", addr);
    info!("Endpoints: /health, /api/progress, /api/analytics, /api/worlds, /api/playground, /api/gamification, /ws");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("PromptQuest API Gateway stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
