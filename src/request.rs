use reqwest::{Method, Url};
use serde_json::Value;
use std::fmt;

const BEARER_PREFIX: &str = "Bearer ";

/// Authorization credential, always held in `Bearer <token>` form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Normalize a raw or already-prefixed token. Returns `None` for blank input.
    pub fn new(token: &str) -> Option<Self> {
        normalize_bearer(token).map(Self)
    }

    pub fn as_header_value(&self) -> &str {
        &self.0
    }
}

// Never print the token itself.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(Bearer ***)")
    }
}

/// Prefix `token` with `Bearer ` unless it already carries it.
pub fn normalize_bearer(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if token.starts_with(BEARER_PREFIX) {
        Some(token.to_string())
    } else {
        Some(format!("{BEARER_PREFIX}{token}"))
    }
}

/// One logical upstream call.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub url: Url,
    pub method: Method,
    pub payload: Value,
    pub credential: Option<Credential>,
}

impl RequestSpec {
    pub fn post(url: Url, payload: Value, credential: Option<Credential>) -> Self {
        Self {
            url,
            method: Method::POST,
            payload,
            credential,
        }
    }
}
