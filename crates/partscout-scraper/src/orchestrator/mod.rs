//! Per-request search orchestration.
//!
//! One renderer session is acquired per search, shared by every requested
//! category in order, and released on every exit path. Failures below the
//! session level (a timed-out source, an unreachable result link) are
//! logged and contained to that unit.

mod aggregate;
mod general;
mod specialized;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use partscout_core::{AppConfig, Category, SearchQuery, SearchResult, SourceRegistry};

pub use aggregate::aggregate;

use crate::error::SearchError;
use crate::renderer::{Renderer, SessionGuard};

/// Lifecycle of one search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    SessionAcquired,
    SourceIterate,
    ItemIterate,
    Aggregated,
    SessionReleased,
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchPhase::Idle => "idle",
            SearchPhase::SessionAcquired => "session_acquired",
            SearchPhase::SourceIterate => "source_iterate",
            SearchPhase::ItemIterate => "item_iterate",
            SearchPhase::Aggregated => "aggregated",
            SearchPhase::SessionReleased => "session_released",
        };
        f.write_str(name)
    }
}

/// Tracks and logs phase transitions for one request.
#[derive(Debug)]
pub(crate) struct Progress {
    phase: SearchPhase,
}

impl Progress {
    fn new() -> Self {
        Self {
            phase: SearchPhase::Idle,
        }
    }

    pub(crate) fn advance(&mut self, next: SearchPhase) {
        if self.phase != next {
            tracing::debug!(from = %self.phase, to = %next, "search phase");
            self.phase = next;
        }
    }

    pub(crate) fn phase(&self) -> SearchPhase {
        self.phase
    }
}

/// Tunables for a search run.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Web-search URL with a `{query}` placeholder.
    pub general_search_url: String,
    pub general_result_limit: usize,
    pub specialized_result_limit: usize,
    pub general_wait: Duration,
    pub specialized_wait: Duration,
    /// Pause after loading a result link before reading its DOM.
    pub settle_delay: Duration,
}

impl SearchSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            general_search_url: config.general_search_url.clone(),
            general_result_limit: config.general_result_limit,
            specialized_result_limit: config.specialized_result_limit,
            general_wait: config.general_wait(),
            specialized_wait: config.specialized_wait(),
            settle_delay: config.settle_delay(),
        }
    }
}

/// Runs searches against a renderer and the specialized source registry.
#[derive(Clone)]
pub struct SearchOrchestrator {
    renderer: Arc<dyn Renderer>,
    registry: Arc<SourceRegistry>,
    settings: SearchSettings,
}

impl SearchOrchestrator {
    #[must_use]
    pub fn new(
        renderer: Arc<dyn Renderer>,
        registry: Arc<SourceRegistry>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            renderer,
            registry,
            settings,
        }
    }

    /// Runs every requested category in order and concatenates the results.
    ///
    /// A query with no categories returns no results without opening a
    /// session.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ResourceInit`] when no renderer session can be
    /// acquired. Every later failure is contained and logged.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        let mut progress = Progress::new();

        if query.categories().is_empty() {
            tracing::debug!("no categories requested; skipping session");
            return Ok(Vec::new());
        }

        let session = self.renderer.open().await.map_err(|e| {
            tracing::error!(error = %e, "failed to acquire renderer session");
            SearchError::ResourceInit(e)
        })?;
        let mut guard = SessionGuard::new(session);
        progress.advance(SearchPhase::SessionAcquired);

        let mut per_category = Vec::with_capacity(query.categories().len());
        for &category in query.categories() {
            let found = match category {
                Category::General => {
                    general::search(&mut guard, &self.settings, query.text(), &mut progress).await
                }
                Category::Specialized => {
                    specialized::search(
                        &mut guard,
                        &self.registry,
                        &self.settings,
                        query.text(),
                        &mut progress,
                    )
                    .await
                }
            };
            tracing::info!(category = %category, count = found.len(), "category complete");
            per_category.push(found);
        }

        let results = aggregate(per_category);
        progress.advance(SearchPhase::Aggregated);

        guard.release().await;
        progress.advance(SearchPhase::SessionReleased);

        tracing::info!(
            query = %query.text(),
            results = results.len(),
            phase = %progress.phase(),
            "search complete"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_starts_idle_and_advances() {
        let mut progress = Progress::new();
        assert_eq!(progress.phase(), SearchPhase::Idle);
        progress.advance(SearchPhase::SessionAcquired);
        progress.advance(SearchPhase::SourceIterate);
        assert_eq!(progress.phase(), SearchPhase::SourceIterate);
    }

    #[test]
    fn phase_display_is_snake_case() {
        assert_eq!(SearchPhase::SessionReleased.to_string(), "session_released");
        assert_eq!(SearchPhase::ItemIterate.to_string(), "item_iterate");
    }
}
