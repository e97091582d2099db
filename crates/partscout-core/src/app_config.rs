use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Name reported by the health endpoint.
    pub service_name: String,
    /// Optional YAML override for the built-in specialized source registry.
    pub sources_path: Option<PathBuf>,
    /// WebDriver endpoint tried first when opening a renderer session.
    pub webdriver_url: String,
    /// WebDriver binary spawned when the primary endpoint is unreachable.
    pub webdriver_binary: PathBuf,
    pub webdriver_fallback_port: u16,
    pub webdriver_startup_timeout_secs: u64,
    pub headless: bool,
    pub user_agent: String,
    /// Search URL template for the general category; must contain `{query}`.
    pub general_search_url: String,
    pub general_result_limit: usize,
    pub specialized_result_limit: usize,
    pub general_wait_secs: u64,
    pub specialized_wait_secs: u64,
    pub settle_delay_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn general_wait(&self) -> Duration {
        Duration::from_secs(self.general_wait_secs)
    }

    #[must_use]
    pub fn specialized_wait(&self) -> Duration {
        Duration::from_secs(self.specialized_wait_secs)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
