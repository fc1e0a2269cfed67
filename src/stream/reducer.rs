use super::types::{EventFrame, StreamResult, StreamStatus};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Folds decoded lines into event frames.
#[derive(Debug, Default)]
pub struct EventReducer {
    frames: Vec<EventFrame>,
    raw_text: String,
    skipped: usize,
}

impl EventReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record decoded text for the raw-text diagnostic field.
    pub fn push_text(&mut self, text: &str) {
        self.raw_text.push_str(text);
    }

    pub fn push_line(&mut self, line: &str) {
        let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
            return;
        };
        let data = rest.trim();
        if data.is_empty() || data == DONE_SENTINEL {
            return;
        }

        match serde_json::from_str(data) {
            Ok(value) => {
                let frame = EventFrame::from_value(value, data.to_string());
                tracing::trace!(kind = ?frame.kind, "parsed event frame");
                self.frames.push(frame);
            }
            Err(e) => {
                self.skipped += 1;
                tracing::debug!(error = %e, data, "skipping malformed data line");
            }
        }
    }

    pub fn frames(&self) -> &[EventFrame] {
        &self.frames
    }

    pub fn finish(self, status: StreamStatus) -> StreamResult {
        StreamResult {
            frames: self.frames,
            raw_text: self.raw_text,
            status,
            skipped: self.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::FrameKind;

    fn reduce(lines: &[&str]) -> StreamResult {
        let mut r = EventReducer::new();
        for l in lines {
            r.push_text(l);
            r.push_text("\n");
            r.push_line(l);
        }
        r.finish(StreamStatus::Complete)
    }

    #[test]
    fn start_and_content_frames_in_order() {
        let out = reduce(&[
            r#"data: {"type":"start","model":"gpt-4"}"#,
            r#"data: {"type":"content","content":"Hello"}"#,
            r#"data: {"type":"content","content":" world"}"#,
            "data: [DONE]",
        ]);
        let kinds: Vec<_> = out.frames.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FrameKind::Start, FrameKind::Content, FrameKind::Content]);
        assert_eq!(out.frames[0].model.as_deref(), Some("gpt-4"));
        assert_eq!(out.content(), "Hello world");
    }

    #[test]
    fn done_sentinel_is_never_a_frame() {
        let out = reduce(&["data: [DONE]", "data:   [DONE]  "]);
        assert!(out.frames.is_empty());
        assert_eq!(out.skipped, 0);
    }

    #[test]
    fn malformed_json_is_skipped_but_kept_in_raw_text() {
        let out = reduce(&[
            "data: {not json",
            r#"data: {"type":"content","content":"ok"}"#,
        ]);
        assert_eq!(out.frames.len(), 1);
        assert_eq!(out.frames[0].content.as_deref(), Some("ok"));
        assert_eq!(out.skipped, 1);
        assert!(out.raw_text.contains("{not json"));
    }

    #[test]
    fn non_data_and_empty_lines_are_ignored() {
        let out = reduce(&[
            "event: message",
            ": keep-alive",
            "",
            "data: ",
            r#"data:{"type":"content","content":"no space"}"#,
            r#"DATA: {"type":"content","content":"upper"}"#,
        ]);
        assert!(out.frames.is_empty());
        assert_eq!(out.skipped, 0);
    }

    #[test]
    fn unknown_types_are_passed_through() {
        let out = reduce(&[r#"data: {"type":"usage","tokens":12}"#]);
        assert_eq!(out.frames.len(), 1);
        assert_eq!(out.frames[0].kind, FrameKind::Unknown);
        assert_eq!(out.frames[0].raw, r#"{"type":"usage","tokens":12}"#);
    }
}
