use crate::error::TransportError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;

/// Browser-identifying headers sent with every upstream request.
///
/// Kept as plain name/value pairs so the set can be changed from config
/// without touching the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderProfile {
    entries: BTreeMap<String, String>,
}

const BROWSER_DEFAULTS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("content-type", "application/json"),
    ("origin", "https://chat.aifiesta.ai"),
    ("priority", "u=1, i"),
    ("referer", "https://chat.aifiesta.ai/"),
    ("sec-ch-ua", "\"Not;A=Brand\";v=\"99\", \"Brave\";v=\"139\", \"Chromium\";v=\"139\""),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
    ("sec-gpc", "1"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36",
    ),
];

impl Default for HeaderProfile {
    fn default() -> Self {
        Self::browser()
    }
}

impl HeaderProfile {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn browser() -> Self {
        let mut p = Self::empty();
        for (k, v) in BROWSER_DEFAULTS {
            p.set(k, v);
        }
        p
    }

    /// Insert or replace a header. Names are case-insensitive.
    pub fn set(&mut self, name: &str, value: &str) {
        self.entries.insert(name.to_ascii_lowercase(), value.to_string());
    }

    /// Overlay `overrides`; an empty value removes the header.
    pub fn merge(&mut self, overrides: &BTreeMap<String, String>) {
        for (k, v) in overrides {
            if v.is_empty() {
                self.entries.remove(&k.to_ascii_lowercase());
            } else {
                self.set(k, v);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_header_map(&self) -> Result<HeaderMap, TransportError> {
        let mut h = HeaderMap::new();
        for (k, v) in self.iter() {
            let name = HeaderName::from_bytes(k.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("header name {k:?}: {e}")))?;
            let value = HeaderValue::from_str(v)
                .map_err(|e| TransportError::InvalidRequest(format!("header {k}: {e}")))?;
            h.insert(name, value);
        }
        Ok(h)
    }
}
