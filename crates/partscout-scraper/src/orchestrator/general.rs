use std::time::Duration;

use partscout_core::{render_query_url, Category, ExtractedRecord, SearchResult};
use partscout_extract::extract_document;

use super::{Progress, SearchPhase, SearchSettings};
use crate::error::RenderError;
use crate::listing::{self, GENERAL_ITEM_LOCATOR};
use crate::renderer::SessionGuard;

/// Loads `url`, lets it settle, and runs the document extractor over it.
pub(super) async fn visit(
    session: &mut SessionGuard,
    url: &str,
    settle_delay: Duration,
) -> Result<ExtractedRecord, RenderError> {
    session.navigate(url).await?;
    if !settle_delay.is_zero() {
        tokio::time::sleep(settle_delay).await;
    }
    let html = session.document().await?;
    Ok(extract_document(&html))
}

async fn result_page(
    session: &mut SessionGuard,
    settings: &SearchSettings,
    search_url: &str,
) -> Result<Option<String>, RenderError> {
    session.navigate(search_url).await?;
    if !session
        .wait_for(GENERAL_ITEM_LOCATOR, settings.general_wait)
        .await?
    {
        return Ok(None);
    }
    session.document().await.map(Some)
}

pub(super) async fn search(
    session: &mut SessionGuard,
    settings: &SearchSettings,
    query: &str,
    progress: &mut Progress,
) -> Vec<SearchResult> {
    progress.advance(SearchPhase::SourceIterate);
    let search_url = render_query_url(&settings.general_search_url, query);

    let html = match result_page(session, settings, &search_url).await {
        Ok(Some(html)) => html,
        Ok(None) => {
            tracing::warn!(
                url = %search_url,
                timeout_secs = settings.general_wait.as_secs(),
                "timed out waiting for web search results"
            );
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(url = %search_url, error = %e, "web search failed");
            return Vec::new();
        }
    };

    let entries = match listing::general_entries(&html, settings.general_result_limit) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(error = %e, "failed to parse web search results");
            return Vec::new();
        }
    };

    progress.advance(SearchPhase::ItemIterate);
    let mut results = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(link) = entry.link else {
            tracing::debug!(title = %entry.title, "search entry has no followable link");
            continue;
        };

        match visit(session, &link, settings.settle_delay).await {
            Ok(data) => results.push(SearchResult {
                category: Category::General,
                source_url: link,
                title: Some(entry.title),
                description: Some(entry.snippet),
                data,
            }),
            Err(e) => {
                tracing::warn!(url = %link, error = %e, "skipping web search result");
            }
        }
    }
    results
}
