use super::*;

use std::collections::HashMap;

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;

async fn spawn_probe_target(status: StatusCode) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route("/", get(move || async move { status }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

#[test]
fn file_overrides_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
server_url = "https://admin.example.com"
fallback_url = "http://localhost:5000"
request_timeout_seconds = 30
"#,
    );
    assert_eq!(settings.server_url, "https://admin.example.com");
    assert_eq!(settings.fallback_url.as_deref(), Some("http://localhost:5000"));
    assert_eq!(settings.request_timeout_seconds, 30);
    assert_eq!(settings.probe_timeout_seconds, 3);
}

#[test]
fn unparsable_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "server_url = [unterminated");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_short_names() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("ADMIN_SERVER_URL", "http://short.example.com"),
        ("APP__SERVER_URL", "http://app.example.com"),
        ("ADMIN_FALLBACK_URL", "http://fallback.example.com"),
        ("APP__REQUEST_TIMEOUT_SECONDS", "not-a-number"),
        ("APP__PROBE_TIMEOUT_SECONDS", "1"),
    ]);
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.server_url, "http://app.example.com");
    assert_eq!(
        settings.fallback_url.as_deref(),
        Some("http://fallback.example.com")
    );
    assert_eq!(settings.request_timeout_seconds, 15);
    assert_eq!(settings.probe_timeout_seconds, 1);
}

#[test]
fn empty_fallback_env_clears_fallback() {
    let mut settings = Settings {
        fallback_url: Some("http://fallback.example.com".into()),
        ..Settings::default()
    };
    apply_env_overrides(&mut settings, |key| {
        (key == "APP__FALLBACK_URL").then(|| "  ".to_string())
    });
    assert_eq!(settings.fallback_url, None);
}

#[test]
fn base_url_gets_default_scheme() {
    assert_eq!(
        parse_base_url("localhost:5000").expect("url").as_str(),
        "http://localhost:5000/"
    );
    assert_eq!(
        parse_base_url(" https://shop.example.com/api ")
            .expect("url")
            .as_str(),
        "https://shop.example.com/api"
    );
    assert!(parse_base_url("").is_err());
    assert!(parse_base_url("http://").is_err());
}

#[tokio::test]
async fn without_fallback_primary_is_used_unprobed() {
    let settings = Settings {
        server_url: closed_port_url().await,
        ..Settings::default()
    };
    let config = resolve_api_config(&settings).await.expect("resolve");
    assert_eq!(config.base_url, parse_base_url(&settings.server_url).expect("url"));
    assert_eq!(config.request_timeout, Duration::from_secs(15));
}

#[tokio::test]
async fn reachable_primary_is_preferred() {
    let primary = spawn_probe_target(StatusCode::OK).await;
    let settings = Settings {
        server_url: primary.clone(),
        fallback_url: Some("http://fallback.invalid".into()),
        ..Settings::default()
    };
    let config = resolve_api_config(&settings).await.expect("resolve");
    assert_eq!(config.base_url, parse_base_url(&primary).expect("url"));
}

#[tokio::test]
async fn unreachable_or_failing_primary_falls_back() {
    let fallback = "http://fallback.example.com";

    let settings = Settings {
        server_url: closed_port_url().await,
        fallback_url: Some(fallback.into()),
        probe_timeout_seconds: 1,
        ..Settings::default()
    };
    let config = resolve_api_config(&settings).await.expect("resolve");
    assert_eq!(config.base_url, parse_base_url(fallback).expect("url"));

    let settings = Settings {
        server_url: spawn_probe_target(StatusCode::SERVICE_UNAVAILABLE).await,
        fallback_url: Some(fallback.into()),
        ..Settings::default()
    };
    let config = resolve_api_config(&settings).await.expect("resolve");
    assert_eq!(config.base_url, parse_base_url(fallback).expect("url"));
}
