use partscout_core::{Category, SearchResult, SourceDefinition, SourceLayout, SourceRegistry};

use super::general::visit;
use super::{Progress, SearchPhase, SearchSettings};
use crate::error::RenderError;
use crate::listing::{self, NO_TITLE};
use crate::renderer::SessionGuard;

fn provenance(source: &SourceDefinition) -> String {
    format!("Part from {}", source.name)
}

async fn detail_results(
    session: &mut SessionGuard,
    source: &SourceDefinition,
    settings: &SearchSettings,
    html: &str,
    page_url: &str,
) -> Result<Vec<SearchResult>, RenderError> {
    let links = listing::detail_links(html, page_url, source, settings.specialized_result_limit)?;

    let mut results = Vec::with_capacity(links.len());
    for link in links {
        let Some(url) = link.url else {
            tracing::debug!(source = %source.name, "listing item has no followable link");
            continue;
        };

        match visit(session, &url, settings.settle_delay).await {
            Ok(mut data) => {
                data.source_name = Some(source.name.clone());
                results.push(SearchResult {
                    category: Category::Specialized,
                    source_url: url,
                    title: Some(link.title.unwrap_or_else(|| NO_TITLE.to_string())),
                    description: Some(provenance(source)),
                    data,
                });
            }
            Err(e) => {
                tracing::warn!(source = %source.name, url = %url, error = %e, "skipping item");
            }
        }
    }
    Ok(results)
}

async fn search_source(
    session: &mut SessionGuard,
    source: &SourceDefinition,
    settings: &SearchSettings,
    query: &str,
    progress: &mut Progress,
) -> Result<Vec<SearchResult>, RenderError> {
    let page_url = source.query_url(query);
    session.navigate(&page_url).await?;

    if !session
        .wait_for(&source.item_locator, settings.specialized_wait)
        .await?
    {
        tracing::warn!(
            source = %source.name,
            timeout_secs = settings.specialized_wait.as_secs(),
            "timed out waiting for results"
        );
        return Ok(Vec::new());
    }

    let html = session.document().await?;
    progress.advance(SearchPhase::ItemIterate);

    match &source.layout {
        SourceLayout::Listing { .. } => {
            let items =
                listing::listing_items(&html, source, settings.specialized_result_limit)?;
            Ok(items
                .into_iter()
                .map(|item| SearchResult {
                    category: Category::Specialized,
                    source_url: page_url.clone(),
                    title: Some(item.title),
                    description: Some(provenance(source)),
                    data: item.record,
                })
                .collect())
        }
        SourceLayout::DetailPage { .. } => {
            detail_results(session, source, settings, &html, &page_url).await
        }
    }
}

pub(super) async fn search(
    session: &mut SessionGuard,
    registry: &SourceRegistry,
    settings: &SearchSettings,
    query: &str,
    progress: &mut Progress,
) -> Vec<SearchResult> {
    let mut results = Vec::new();
    for source in registry {
        progress.advance(SearchPhase::SourceIterate);
        match search_source(session, source, settings, query, progress).await {
            Ok(found) => {
                tracing::debug!(source = %source.name, count = found.len(), "source searched");
                results.extend(found);
            }
            Err(e) => {
                tracing::warn!(source = %source.name, error = %e, "skipping source");
            }
        }
    }
    results
}
