//! Headless page rendering.
//!
//! A [`Renderer`] hands out sessions; a [`RendererSession`] loads pages and
//! exposes the rendered DOM as HTML. Callers hold sessions through a
//! [`SessionGuard`], which guarantees `close()` runs once per `open()`.

pub mod fake;
pub mod webdriver;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::RenderError;

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Acquires a fresh session.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when no browser can be reached or started.
    async fn open(&self) -> Result<Box<dyn RendererSession>, RenderError>;
}

#[async_trait]
pub trait RendererSession: Send {
    /// Loads `url` and returns the document as rendered on load.
    async fn navigate(&mut self, url: &str) -> Result<String, RenderError>;

    /// Waits up to `timeout` for an element matching the CSS `locator`.
    ///
    /// A timeout is `Ok(false)`, not an error.
    async fn wait_for(&mut self, locator: &str, timeout: Duration) -> Result<bool, RenderError>;

    /// Current DOM snapshot of the loaded page.
    async fn document(&mut self) -> Result<String, RenderError>;

    /// Ends the session. Calling it again is a no-op.
    async fn close(&mut self) -> Result<(), RenderError>;
}

/// Owns an open session and closes it exactly once.
///
/// Normal paths call [`SessionGuard::release`]. If the guard is dropped
/// instead (cancelled request, panic), the close is spawned on the current
/// tokio runtime.
pub struct SessionGuard {
    session: Option<Box<dyn RendererSession>>,
}

impl SessionGuard {
    #[must_use]
    pub fn new(session: Box<dyn RendererSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn active(&mut self) -> Result<&mut Box<dyn RendererSession>, RenderError> {
        self.session.as_mut().ok_or(RenderError::SessionClosed)
    }

    /// # Errors
    ///
    /// Propagates the session's navigation error.
    pub async fn navigate(&mut self, url: &str) -> Result<String, RenderError> {
        self.active()?.navigate(url).await
    }

    /// # Errors
    ///
    /// Propagates browser command failures; a timeout is `Ok(false)`.
    pub async fn wait_for(
        &mut self,
        locator: &str,
        timeout: Duration,
    ) -> Result<bool, RenderError> {
        self.active()?.wait_for(locator, timeout).await
    }

    /// # Errors
    ///
    /// Propagates browser command failures.
    pub async fn document(&mut self) -> Result<String, RenderError> {
        self.active()?.document().await
    }

    /// Closes the session now. Close failures are logged, not returned.
    pub async fn release(mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close().await {
                tracing::warn!(error = %e, "failed to close renderer session");
            }
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("renderer session dropped without release; closing in background");
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        tracing::warn!(error = %e, "failed to close dropped renderer session");
                    }
                });
            }
            Err(_) => {
                tracing::error!("renderer session dropped outside a runtime; it was not closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeRenderer;
    use super::*;

    #[tokio::test]
    async fn release_closes_once() {
        let renderer = FakeRenderer::new();
        let stats = renderer.stats();
        let guard = SessionGuard::new(renderer.open().await.expect("open"));
        guard.release().await;
        assert_eq!(stats.closes(), 1);
    }

    #[tokio::test]
    async fn drop_closes_in_background() {
        let renderer = FakeRenderer::new();
        let stats = renderer.stats();
        {
            let _guard = SessionGuard::new(renderer.open().await.expect("open"));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(stats.closes(), 1);
    }
}
