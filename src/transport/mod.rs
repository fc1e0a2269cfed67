pub mod direct;
pub mod fallback;
pub mod headers;
pub mod relay;

pub use direct::DirectTransport;
pub use fallback::FallbackTransport;
pub use headers::HeaderProfile;
pub use relay::RelayTransport;

use crate::error::TransportResult;
use crate::request::RequestSpec;
use crate::stream::StreamResult;
use futures_core::future::BoxFuture;
use reqwest::Url;
use serde::{Deserialize, Serialize};

pub const EVENT_STREAM_MIME: &str = "text/event-stream";
pub const DEFAULT_STREAM_ROUTE: &str = "/chat/completions";

/// Successful result of one transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Stream(StreamResult),
    Json(serde_json::Value),
    /// Body that was not JSON.
    Text(String),
}

/// Executes a `RequestSpec` against some endpoint.
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute<'a>(&'a self, spec: &'a RequestSpec) -> BoxFuture<'a, TransportResult<Outcome>>;
}

/// Which transports to use and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    #[default]
    Direct,
    Relay,
    DirectThenRelay,
}

/// Decides whether a response body is an event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDetector {
    routes: Vec<String>,
}

impl Default for StreamDetector {
    fn default() -> Self {
        Self::new(vec![DEFAULT_STREAM_ROUTE.to_string()])
    }
}

impl StreamDetector {
    pub fn new(routes: Vec<String>) -> Self {
        Self { routes }
    }

    /// Path heuristic, usable before the request is sent.
    pub fn is_stream_route(&self, url: &Url) -> bool {
        let path = url.path();
        self.routes.iter().any(|r| !r.is_empty() && path.contains(r.as_str()))
    }

    pub fn is_streaming(&self, url: &Url, content_type: Option<&str>) -> bool {
        self.is_stream_route(url) || content_type.is_some_and(is_event_stream)
    }
}

fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|m| m.trim().eq_ignore_ascii_case(EVENT_STREAM_MIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn completion_route_streams() {
        let d = StreamDetector::default();
        assert!(d.is_streaming(&url("https://api.example/api/chat/completions"), None));
        assert!(!d.is_streaming(&url("https://api.example/api/chat"), Some("application/json")));
    }

    #[test]
    fn event_stream_content_type_streams() {
        let d = StreamDetector::new(Vec::new());
        assert!(d.is_streaming(
            &url("https://api.example/anything"),
            Some("Text/Event-Stream; charset=utf-8")
        ));
        assert!(!d.is_streaming(&url("https://api.example/anything"), Some("text/plain")));
    }

    #[test]
    fn empty_route_never_matches() {
        let d = StreamDetector::new(vec![String::new()]);
        assert!(!d.is_stream_route(&url("https://api.example/api/chat")));
    }
}
