//! Deterministic in-memory renderer.
//!
//! Serves canned HTML per URL, fails navigation for scripted URLs and
//! counts opens and closes. Unknown URLs render as an empty page, so any
//! `wait_for` on them times out immediately.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::error::RenderError;
use crate::renderer::{Renderer, RendererSession};

const EMPTY_PAGE: &str = "<html><head></head><body></body></html>";

/// Counters shared between a [`FakeRenderer`] and every session it opened.
#[derive(Debug, Default)]
pub struct FakeStats {
    opens: AtomicUsize,
    closes: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

impl FakeStats {
    #[must_use]
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of `close()` calls, including repeated ones.
    #[must_use]
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// URLs passed to `navigate`, in call order.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.navigations
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct FakeRenderer {
    pages: Arc<HashMap<String, String>>,
    failing: Arc<HashSet<String>>,
    panicking: Arc<HashSet<String>>,
    fail_open: bool,
    stats: Arc<FakeStats>,
}

impl FakeRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` for `url`.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.into(), html.into());
        self
    }

    /// Makes navigation to `url` fail.
    #[must_use]
    pub fn with_failing_page(mut self, url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.failing).insert(url.into());
        self
    }

    /// Makes navigation to `url` panic, standing in for a bug in the caller's
    /// pipeline.
    #[must_use]
    pub fn with_panicking_page(mut self, url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.panicking).insert(url.into());
        self
    }

    /// Makes every `open()` fail.
    #[must_use]
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    #[must_use]
    pub fn stats(&self) -> Arc<FakeStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn open(&self) -> Result<Box<dyn RendererSession>, RenderError> {
        if self.fail_open {
            return Err(RenderError::Acquire {
                primary: Box::new(RenderError::Connect {
                    url: "fake://primary".to_string(),
                    reason: "scripted failure".to_string(),
                }),
                fallback: Box::new(RenderError::Connect {
                    url: "fake://fallback".to_string(),
                    reason: "scripted failure".to_string(),
                }),
            });
        }

        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            renderer: self.clone(),
            current: None,
            closed: false,
        }))
    }
}

struct FakeSession {
    renderer: FakeRenderer,
    current: Option<String>,
    closed: bool,
}

fn has_match(html: &str, locator: &str) -> Result<bool, RenderError> {
    let selector = Selector::parse(locator).map_err(|_| RenderError::InvalidLocator {
        locator: locator.to_string(),
    })?;
    Ok(Html::parse_document(html).select(&selector).next().is_some())
}

#[async_trait]
impl RendererSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<String, RenderError> {
        if self.closed {
            return Err(RenderError::SessionClosed);
        }
        if let Ok(mut urls) = self.renderer.stats.navigations.lock() {
            urls.push(url.to_string());
        }

        assert!(
            !self.renderer.panicking.contains(url),
            "scripted panic while loading {url}"
        );
        if self.renderer.failing.contains(url) {
            self.current = None;
            return Err(RenderError::Navigation {
                url: url.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        let html = self
            .renderer
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| EMPTY_PAGE.to_string());
        self.current = Some(html.clone());
        Ok(html)
    }

    async fn wait_for(&mut self, locator: &str, _timeout: Duration) -> Result<bool, RenderError> {
        match &self.current {
            Some(html) => has_match(html, locator),
            None => Ok(false),
        }
    }

    async fn document(&mut self) -> Result<String, RenderError> {
        self.current
            .clone()
            .ok_or_else(|| RenderError::Command("no page loaded".to_string()))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.renderer.stats.closes.fetch_add(1, Ordering::SeqCst);
        self.closed = true;
        Ok(())
    }
}
