mod api;
mod middleware;

use std::sync::Arc;

use partscout_scraper::{
    Renderer, SearchOrchestrator, SearchSettings, WebDriverRenderer, WebDriverSettings,
};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = partscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let registry = Arc::new(partscout_core::load_sources(config.sources_path.as_deref())?);
    tracing::info!(
        env = %config.env,
        sources = registry.len(),
        webdriver = %config.webdriver_url,
        "configuration loaded"
    );

    let renderer: Arc<dyn Renderer> = Arc::new(WebDriverRenderer::new(
        WebDriverSettings::from_config(&config),
    ));
    let orchestrator =
        SearchOrchestrator::new(renderer, registry, SearchSettings::from_config(&config));
    let app = build_app(AppState::new(config.service_name.as_str(), orchestrator));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
