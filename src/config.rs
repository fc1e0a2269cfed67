use crate::transport::{HeaderProfile, StreamDetector, TransportMode, DEFAULT_STREAM_ROUTE};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default model (optional)
    pub model: Option<String>,

    /// API base, e.g. "https://api-v2.aifiesta.ai/api"
    pub base_url: Option<String>,

    /// Title used when creating chats
    pub chat_title: Option<String>,

    pub model_count: Option<u32>,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub headers: HeadersConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransportConfig {
    /// "direct", "relay" or "direct-then-relay"
    pub mode: Option<TransportMode>,

    /// Relay endpoint, e.g. "http://127.0.0.1:3000/api/proxy"
    pub relay_url: Option<String>,

    /// Path segments whose responses are read as event streams.
    pub stream_routes: Option<Vec<String>>,

    pub timeout_secs: Option<u64>,
}

impl TransportConfig {
    /// Explicit mode wins; otherwise use the relay as fallback when one is configured.
    pub fn resolved_mode(&self, relay_url: Option<&str>) -> TransportMode {
        match (self.mode, relay_url) {
            (Some(m), _) => m,
            (None, Some(_)) => TransportMode::DirectThenRelay,
            (None, None) => TransportMode::Direct,
        }
    }

    pub fn detector(&self) -> StreamDetector {
        StreamDetector::new(
            self.stream_routes
                .clone()
                .unwrap_or_else(|| vec![DEFAULT_STREAM_ROUTE.to_string()]),
        )
    }
}

/// `[headers]` table: entries override the browser profile; an empty value removes one.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HeadersConfig {
    /// Start from the built-in browser profile (default true).
    pub default_headers: Option<bool>,

    #[serde(flatten)]
    pub overrides: BTreeMap<String, String>,
}

impl HeadersConfig {
    pub fn profile(&self) -> HeaderProfile {
        let mut p = if self.default_headers.unwrap_or(true) {
            HeaderProfile::browser()
        } else {
            HeaderProfile::empty()
        };
        p.merge(&self.overrides);
        p
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServeConfig {
    pub bind: Option<String>,
}

impl Config {
    /// Load config if the file exists, otherwise return Ok(None).
    pub fn load_optional(path: impl AsRef<Path>) -> anyhow::Result<Option<Self>> {
        let path = path.as_ref();
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e))
                    .with_context(|| format!("failed to read config: {}", path.display()))
            }
        };

        let s = String::from_utf8(bytes).context("config is not valid UTF-8")?;
        let cfg: Config = toml::from_str(&s)
            .with_context(|| format!("failed to parse TOML: {}", path.display()))?;
        Ok(Some(cfg))
    }
}
