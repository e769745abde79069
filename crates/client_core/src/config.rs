use std::{collections::HashMap, fs, time::Duration};

use anyhow::{bail, Context};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

pub const SETTINGS_FILE: &str = "admin.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub fallback_url: Option<String>,
    pub request_timeout_seconds: u64,
    pub probe_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".into(),
            fallback_url: None,
            request_timeout_seconds: 15,
            probe_timeout_seconds: 3,
        }
    }
}

/// Resolved endpoint configuration handed to the transport at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

pub fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        warn!(file = SETTINGS_FILE, "ignoring unparsable settings file");
        return;
    };

    if let Some(v) = file_cfg.get("server_url").and_then(toml::Value::as_str) {
        settings.server_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("fallback_url").and_then(toml::Value::as_str) {
        settings.fallback_url = Some(v.to_string());
    }
    if let Some(v) = file_cfg
        .get("request_timeout_seconds")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.request_timeout_seconds = v;
    }
    if let Some(v) = file_cfg
        .get("probe_timeout_seconds")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.probe_timeout_seconds = v;
    }
}

/// Later keys win, so `APP__*` overrides the short names.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["ADMIN_SERVER_URL", "APP__SERVER_URL"] {
        if let Some(v) = lookup(key) {
            settings.server_url = v;
        }
    }
    for key in ["ADMIN_FALLBACK_URL", "APP__FALLBACK_URL"] {
        if let Some(v) = lookup(key) {
            settings.fallback_url = Some(v).filter(|v| !v.trim().is_empty());
        }
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_seconds = parsed;
        }
    }
    if let Some(v) = lookup("APP__PROBE_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.probe_timeout_seconds = parsed;
        }
    }
}

pub fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("server url is empty");
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    let url = Url::parse(&with_scheme).with_context(|| format!("invalid server url '{raw}'"))?;
    if url.cannot_be_a_base() {
        bail!("server url '{raw}' cannot be used as a base");
    }
    Ok(url)
}

/// Picks the primary server if it answers a probe with 2xx, otherwise the
/// fallback. Without a fallback the primary is used unprobed.
pub async fn resolve_api_config(settings: &Settings) -> anyhow::Result<ApiConfig> {
    let primary = parse_base_url(&settings.server_url)?;
    let fallback = settings
        .fallback_url
        .as_deref()
        .map(parse_base_url)
        .transpose()?;
    let request_timeout = Duration::from_secs(settings.request_timeout_seconds);

    let Some(fallback) = fallback else {
        info!(base_url = %primary, "using configured server");
        return Ok(ApiConfig {
            base_url: primary,
            request_timeout,
        });
    };

    let probe = Client::builder()
        .timeout(Duration::from_secs(settings.probe_timeout_seconds))
        .build()
        .context("failed to build probe client")?;

    let base_url = match probe.get(primary.clone()).send().await {
        Ok(res) if res.status().is_success() => {
            info!(base_url = %primary, "primary server reachable");
            primary
        }
        Ok(res) => {
            warn!(primary = %primary, status = %res.status(), fallback = %fallback, "primary server rejected probe; using fallback");
            fallback
        }
        Err(error) => {
            warn!(primary = %primary, %error, fallback = %fallback, "primary server unreachable; using fallback");
            fallback
        }
    };

    Ok(ApiConfig {
        base_url,
        request_timeout,
    })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
