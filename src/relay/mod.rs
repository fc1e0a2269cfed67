//! The relay endpoint and its JSON wire format.
//!
//! Clients that cannot reach upstream directly post a [`ProxyRequest`] to
//! the relay, which forwards it with the configured header profile and
//! answers with one of these bodies:
//!
//! - buffered JSON: the upstream body as-is
//! - buffered text: `{"data": "<raw text>"}`
//! - stream: `{"data": [frames], "streamText": "...", "totalEvents": n}`
//! - interrupted stream: `{"data": [frames], "error": "Stream interrupted", "partialText": "..."}`
//! - failure: `{"message": "..."}` with a non-success status

pub mod server;

use crate::stream::{EventFrame, StreamResult, StreamStatus};
use crate::transport::Outcome;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const INTERRUPTED_MARKER: &str = "Stream interrupted";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub auth_token: String,
}

fn default_method() -> String {
    "POST".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

pub fn encode_outcome(outcome: &Outcome) -> Value {
    match outcome {
        Outcome::Json(v) => v.clone(),
        Outcome::Text(t) => json!({ "data": t }),
        Outcome::Stream(r) => encode_stream(r),
    }
}

fn encode_stream(r: &StreamResult) -> Value {
    let frames: Vec<Value> = r.frames.iter().map(|f| f.payload.clone()).collect();
    match &r.status {
        StreamStatus::Complete => json!({
            "data": frames,
            "streamText": r.raw_text,
            "totalEvents": r.frames.len(),
        }),
        StreamStatus::Interrupted { .. } => json!({
            "data": frames,
            "error": INTERRUPTED_MARKER,
            "partialText": r.raw_text,
        }),
        StreamStatus::Error { message } => json!({
            "data": frames,
            "error": message,
            "partialText": r.raw_text,
        }),
    }
}

/// Turn a successful relay body back into an [`Outcome`].
///
/// `stream_route` says whether the forwarded URL was a streaming route; only
/// then is a `{data: [...]}` body read as an event stream.
pub fn decode_body(body: Value, stream_route: bool) -> Outcome {
    let Value::Object(map) = body else {
        return Outcome::Json(body);
    };

    if stream_route {
        if let Some(r) = decode_stream(&map) {
            return Outcome::Stream(r);
        }
    }

    if map.len() == 1 {
        if let Some(Value::String(t)) = map.get("data") {
            return Outcome::Text(t.clone());
        }
    }
    Outcome::Json(Value::Object(map))
}

fn decode_stream(map: &Map<String, Value>) -> Option<StreamResult> {
    let Value::Array(items) = map.get("data")? else {
        return None;
    };

    let text_key = if map.contains_key("streamText") {
        "streamText"
    } else if map.contains_key("partialText") {
        "partialText"
    } else {
        return None;
    };
    let raw_text = map
        .get(text_key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let status = match map.get("error").and_then(Value::as_str) {
        None => StreamStatus::Complete,
        Some(INTERRUPTED_MARKER) => StreamStatus::Interrupted {
            reason: INTERRUPTED_MARKER.to_string(),
        },
        Some(other) => StreamStatus::Error {
            message: other.to_string(),
        },
    };

    let frames = items
        .iter()
        .map(|v| EventFrame::from_value(v.clone(), v.to_string()))
        .collect();

    Some(StreamResult {
        frames,
        raw_text,
        status,
        skipped: 0,
    })
}
