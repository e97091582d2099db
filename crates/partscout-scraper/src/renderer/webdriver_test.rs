use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn unreachable_settings() -> WebDriverSettings {
    WebDriverSettings {
        url: "http://127.0.0.1:1".to_string(),
        binary: PathBuf::from("/nonexistent/partscout/chromedriver"),
        fallback_port: 1,
        startup_timeout: Duration::from_millis(200),
        headless: true,
        user_agent: "partscout-test/0.1".to_string(),
    }
}

#[test]
fn chrome_arguments_headless() {
    let args = chrome_arguments(true, "UA/1.0");
    assert_eq!(args.first().map(String::as_str), Some("--headless"));
    assert!(args.contains(&"--no-sandbox".to_string()));
    assert!(args.contains(&"--window-size=1920,1080".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("--user-agent=UA/1.0"));
}

#[test]
fn chrome_arguments_headed_omits_headless_flag() {
    let args = chrome_arguments(false, "UA/1.0");
    assert!(!args.iter().any(|a| a == "--headless"));
}

#[test]
fn capabilities_carry_chrome_options() {
    let caps = capabilities(&unreachable_settings());
    let args = caps
        .get("goog:chromeOptions")
        .and_then(|opts| opts.get("args"))
        .and_then(Value::as_array)
        .expect("chrome args present");
    assert!(args.contains(&json!("--disable-dev-shm-usage")));
}

#[tokio::test]
async fn ready_when_status_reports_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"value": {"ready": true}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    wait_until_ready(&reqwest::Client::new(), &server.uri(), Duration::from_secs(2))
        .await
        .expect("driver ready");
}

#[tokio::test]
async fn not_ready_after_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"value": {"ready": false}})),
        )
        .mount(&server)
        .await;

    let err = wait_until_ready(
        &reqwest::Client::new(),
        &server.uri(),
        Duration::from_millis(250),
    )
    .await
    .expect_err("never ready");
    assert!(
        matches!(err, RenderError::NotReady { .. }),
        "expected NotReady, got: {err:?}"
    );
}

#[tokio::test]
async fn server_errors_keep_polling_until_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = wait_until_ready(
        &reqwest::Client::new(),
        &server.uri(),
        Duration::from_millis(250),
    )
    .await;
    assert!(result.is_err());
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.len() > 1, "expected repeated polling");
}

#[tokio::test]
async fn open_fails_when_primary_and_fallback_fail() {
    let renderer = WebDriverRenderer::new(unreachable_settings());
    let err = match renderer.open().await {
        Ok(_) => panic!("no driver should be reachable"),
        Err(e) => e,
    };

    match err {
        RenderError::Acquire { primary, fallback } => {
            assert!(matches!(*primary, RenderError::Connect { .. }));
            assert!(matches!(*fallback, RenderError::Spawn { .. }));
        }
        other => panic!("expected Acquire, got: {other:?}"),
    }
}
