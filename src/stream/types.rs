use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminant of an event frame, taken from the payload's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Start,
    Content,
    Done,
    Unknown,
}

impl FrameKind {
    pub fn from_type(ty: Option<&str>) -> Self {
        match ty {
            Some("start") => Self::Start,
            Some("content") => Self::Content,
            Some("done") => Self::Done,
            _ => Self::Unknown,
        }
    }
}

/// One parsed `data: <json>` unit.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFrame {
    pub kind: FrameKind,
    /// Present on `start` frames.
    pub model: Option<String>,
    /// Present on `content` frames.
    pub content: Option<String>,
    pub payload: Value,
    /// The JSON text as received (trimmed).
    pub raw: String,
}

impl EventFrame {
    pub fn from_value(payload: Value, raw: String) -> Self {
        let kind = FrameKind::from_type(payload.get("type").and_then(Value::as_str));
        let model = match kind {
            FrameKind::Start => string_field(&payload, "model"),
            _ => None,
        };
        let content = match kind {
            FrameKind::Content => string_field(&payload, "content"),
            _ => None,
        };
        Self {
            kind,
            model,
            content,
            payload,
            raw,
        }
    }
}

fn string_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    Complete,
    /// The byte source failed mid-stream; frames so far are still usable.
    Interrupted { reason: String },
    /// A stream-level error reported by the other side (e.g. a relay).
    Error { message: String },
}

/// Reduced output of one streamed response.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamResult {
    pub frames: Vec<EventFrame>,
    pub raw_text: String,
    pub status: StreamStatus,
    /// `data:` lines dropped because their payload was not JSON.
    pub skipped: usize,
}

impl StreamResult {
    pub fn is_complete(&self) -> bool {
        self.status == StreamStatus::Complete
    }

    pub fn started_model(&self) -> Option<&str> {
        self.frames
            .iter()
            .find(|f| f.kind == FrameKind::Start)
            .map(|f| f.model.as_deref().unwrap_or(""))
    }

    /// Concatenated content of all `content` frames, in order.
    pub fn content(&self) -> String {
        self.frames
            .iter()
            .filter(|f| f.kind == FrameKind::Content)
            .filter_map(|f| f.content.as_deref())
            .collect()
    }

    pub fn has_recognized_frames(&self) -> bool {
        self.frames
            .iter()
            .any(|f| matches!(f.kind, FrameKind::Start | FrameKind::Content))
    }
}
