use partscout_core::InvalidQuery;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to connect to WebDriver at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("failed to spawn WebDriver binary {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("WebDriver at {url} not ready after {timeout_secs}s")]
    NotReady { url: String, timeout_secs: u64 },

    #[error("no renderer session could be acquired (primary: {primary}; fallback: {fallback})")]
    Acquire {
        primary: Box<RenderError>,
        fallback: Box<RenderError>,
    },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("invalid locator \"{locator}\"")]
    InvalidLocator { locator: String },

    #[error("browser command failed: {0}")]
    Command(String),

    #[error("renderer session already closed")]
    SessionClosed,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    InvalidQuery(#[from] InvalidQuery),

    #[error("renderer initialization failed: {0}")]
    ResourceInit(#[source] RenderError),
}
