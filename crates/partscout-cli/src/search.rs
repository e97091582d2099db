use std::sync::Arc;

use partscout_core::{AppConfig, Category, SearchQuery};
use partscout_scraper::{
    Renderer, SearchOrchestrator, SearchSettings, WebDriverRenderer, WebDriverSettings,
};

/// Runs one search against the configured WebDriver and prints
/// `{"results": [...]}` to stdout.
///
/// # Errors
///
/// Returns an error if the sources file is invalid, the query is empty, or
/// no renderer session can be acquired.
pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    categories: Option<Vec<Category>>,
) -> anyhow::Result<()> {
    let registry = Arc::new(partscout_core::load_sources(config.sources_path.as_deref())?);
    let query = SearchQuery::new(query, categories)?;

    let renderer: Arc<dyn Renderer> = Arc::new(WebDriverRenderer::new(
        WebDriverSettings::from_config(config),
    ));
    let orchestrator =
        SearchOrchestrator::new(renderer, registry, SearchSettings::from_config(config));

    let results = orchestrator.search(&query).await?;
    tracing::info!(count = results.len(), "search finished");

    let output = serde_json::json!({ "results": results });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
