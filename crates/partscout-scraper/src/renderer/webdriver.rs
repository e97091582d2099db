//! WebDriver-backed renderer driving headless Chrome through `fantoccini`.
//!
//! Acquisition tries the configured WebDriver endpoint first. If that
//! fails, the WebDriver binary is spawned on the fallback port, polled for
//! readiness, and connected to. There is no further retry.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use partscout_core::AppConfig;
use serde_json::{json, Map, Value};
use tokio::process::{Child, Command};

use crate::error::RenderError;
use crate::renderer::{Renderer, RendererSession};

const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Connection and browser settings for [`WebDriverRenderer`].
#[derive(Debug, Clone)]
pub struct WebDriverSettings {
    pub url: String,
    pub binary: PathBuf,
    pub fallback_port: u16,
    pub startup_timeout: Duration,
    pub headless: bool,
    pub user_agent: String,
}

impl WebDriverSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            url: config.webdriver_url.clone(),
            binary: config.webdriver_binary.clone(),
            fallback_port: config.webdriver_fallback_port,
            startup_timeout: Duration::from_secs(config.webdriver_startup_timeout_secs),
            headless: config.headless,
            user_agent: config.user_agent.clone(),
        }
    }

    fn fallback_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.fallback_port)
    }
}

/// Chrome launch arguments for a scraping session.
#[must_use]
pub fn chrome_arguments(headless: bool, user_agent: &str) -> Vec<String> {
    let mut args = Vec::with_capacity(10);
    if headless {
        args.push("--headless".to_string());
    }
    args.extend(
        [
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--window-size=1920,1080",
            "--disable-extensions",
            "--disable-infobars",
            "--disable-notifications",
            "--disable-popup-blocking",
        ]
        .map(String::from),
    );
    args.push(format!("--user-agent={user_agent}"));
    args
}

fn capabilities(settings: &WebDriverSettings) -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": chrome_arguments(settings.headless, &settings.user_agent) }),
    );
    caps
}

/// Polls `{base_url}/status` until the driver reports ready or `timeout`
/// elapses.
///
/// # Errors
///
/// Returns [`RenderError::NotReady`] on timeout.
pub async fn wait_until_ready(
    http: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> Result<(), RenderError> {
    let status_url = format!("{}/status", base_url.trim_end_matches('/'));
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        match http.get(&status_url).send().await {
            Ok(response) if response.status().is_success() => {
                let ready = response
                    .json::<Value>()
                    .await
                    .ok()
                    .and_then(|body| body.pointer("/value/ready").and_then(Value::as_bool))
                    .unwrap_or(true);
                if ready {
                    return Ok(());
                }
            }
            Ok(response) => {
                tracing::debug!(
                    status = %response.status(),
                    url = %status_url,
                    "WebDriver not ready"
                );
            }
            Err(e) => {
                tracing::debug!(error = %e, url = %status_url, "WebDriver status probe failed");
            }
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(RenderError::NotReady {
                url: base_url.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
        tokio::time::sleep(READINESS_POLL_INTERVAL).await;
    }
}

pub struct WebDriverRenderer {
    settings: WebDriverSettings,
    http: reqwest::Client,
}

impl WebDriverRenderer {
    #[must_use]
    pub fn new(settings: WebDriverSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    async fn connect(&self, url: &str) -> Result<Client, RenderError> {
        ClientBuilder::native()
            .capabilities(capabilities(&self.settings))
            .connect(url)
            .await
            .map_err(|e| RenderError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn spawn_fallback(&self) -> Result<(Client, Child), RenderError> {
        let binary = &self.settings.binary;
        let mut child = Command::new(binary)
            .arg(format!("--port={}", self.settings.fallback_port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RenderError::Spawn {
                binary: binary.display().to_string(),
                source: e,
            })?;

        let url = self.settings.fallback_url();
        let connected =
            match wait_until_ready(&self.http, &url, self.settings.startup_timeout).await {
                Ok(()) => self.connect(&url).await,
                Err(e) => Err(e),
            };

        match connected {
            Ok(client) => Ok((client, child)),
            Err(e) => {
                if let Err(kill_err) = child.kill().await {
                    tracing::warn!(error = %kill_err, "failed to kill fallback WebDriver process");
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    async fn open(&self) -> Result<Box<dyn RendererSession>, RenderError> {
        let primary = match self.connect(&self.settings.url).await {
            Ok(client) => {
                tracing::debug!(url = %self.settings.url, "connected to WebDriver");
                return Ok(Box::new(WebDriverSession::new(client, None)));
            }
            Err(e) => e,
        };

        tracing::warn!(
            error = %primary,
            binary = %self.settings.binary.display(),
            "primary WebDriver unavailable; starting fallback driver"
        );

        match self.spawn_fallback().await {
            Ok((client, child)) => Ok(Box::new(WebDriverSession::new(client, Some(child)))),
            Err(fallback) => Err(RenderError::Acquire {
                primary: Box::new(primary),
                fallback: Box::new(fallback),
            }),
        }
    }
}

struct WebDriverSession {
    client: Option<Client>,
    driver_process: Option<Child>,
}

impl WebDriverSession {
    fn new(client: Client, driver_process: Option<Child>) -> Self {
        Self {
            client: Some(client),
            driver_process,
        }
    }

    fn client(&self) -> Result<&Client, RenderError> {
        self.client.as_ref().ok_or(RenderError::SessionClosed)
    }
}

fn command_error(e: &CmdError) -> RenderError {
    RenderError::Command(e.to_string())
}

#[async_trait]
impl RendererSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<String, RenderError> {
        let client = self.client()?;
        client
            .goto(url)
            .await
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        client.source().await.map_err(|e| command_error(&e))
    }

    async fn wait_for(&mut self, locator: &str, timeout: Duration) -> Result<bool, RenderError> {
        let result = self
            .client()?
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(locator))
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(CmdError::WaitTimeout) => Ok(false),
            Err(e) => Err(command_error(&e)),
        }
    }

    async fn document(&mut self) -> Result<String, RenderError> {
        self.client()?
            .source()
            .await
            .map_err(|e| command_error(&e))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        let closed = match self.client.take() {
            Some(client) => client.close().await.map_err(|e| command_error(&e)),
            None => Ok(()),
        };

        if let Some(mut child) = self.driver_process.take() {
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "failed to stop fallback WebDriver process");
            }
        }

        closed
    }
}

#[cfg(test)]
#[path = "webdriver_test.rs"]
mod tests;
