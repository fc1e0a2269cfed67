//! Terminal rendering of results.

use crate::stream::{EventFrame, StreamResult, StreamStatus};
use crate::transport::Outcome;
use serde_json::Value;
use std::io::{self, Write};

/// What to show for a successful outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Structured {
        /// Set when a `start` frame was seen.
        started: Option<String>,
        content: String,
        note: Option<String>,
    },
    /// Nothing recognizable; show the body verbatim.
    Raw { text: String, note: Option<String> },
}

#[derive(Debug, Clone, Copy)]
pub enum ViewState<'a> {
    Loading,
    Failed(&'a str),
    Done(&'a Outcome),
}

pub fn present(outcome: &Outcome) -> Presentation {
    match outcome {
        Outcome::Stream(r) => present_stream(r),
        Outcome::Json(v) => present_json(v),
        Outcome::Text(t) => Presentation::Raw {
            text: t.clone(),
            note: None,
        },
    }
}

fn present_stream(r: &StreamResult) -> Presentation {
    let note = match &r.status {
        StreamStatus::Complete => None,
        StreamStatus::Interrupted { reason } => Some(format!("stream interrupted: {reason}")),
        StreamStatus::Error { message } => Some(format!("stream error: {message}")),
    };

    if r.has_recognized_frames() {
        return Presentation::Structured {
            started: r.started_model().map(str::to_string),
            content: r.content(),
            note,
        };
    }

    let text = if r.frames.is_empty() {
        r.raw_text.clone()
    } else {
        let payloads: Vec<&Value> = r.frames.iter().map(|f| &f.payload).collect();
        pretty(&payloads)
    };
    Presentation::Raw { text, note }
}

fn present_json(v: &Value) -> Presentation {
    // Bodies shaped like `{data: [frames...]}` get the same treatment as a stream.
    if let Some(items) = v.get("data").and_then(Value::as_array) {
        let r = StreamResult {
            frames: items
                .iter()
                .map(|i| EventFrame::from_value(i.clone(), i.to_string()))
                .collect(),
            raw_text: String::new(),
            status: StreamStatus::Complete,
            skipped: 0,
        };
        if r.has_recognized_frames() {
            return present_stream(&r);
        }
    }
    Presentation::Raw {
        text: pretty(v),
        note: None,
    }
}

fn pretty<T: serde::Serialize + ?Sized>(v: &T) -> String {
    serde_json::to_string_pretty(v).unwrap_or_default()
}

pub fn render(out: &mut dyn Write, model_label: &str, state: ViewState<'_>) -> io::Result<()> {
    match state {
        ViewState::Loading => writeln!(out, "⏳ Generating with {model_label}..."),
        ViewState::Failed(msg) => {
            writeln!(out, "❌ Error")?;
            writeln!(out, "{msg}")
        }
        ViewState::Done(outcome) => {
            writeln!(out, "🤖 {}", model_label.to_uppercase())?;
            match present(outcome) {
                Presentation::Structured {
                    started,
                    content,
                    note,
                } => {
                    if let Some(model) = started {
                        writeln!(out, "▶ model started: {model}")?;
                    }
                    writeln!(out, "{content}")?;
                    write_note(out, note.as_deref())
                }
                Presentation::Raw { text, note } => {
                    writeln!(out, "{text}")?;
                    write_note(out, note.as_deref())
                }
            }
        }
    }
}

fn write_note(out: &mut dyn Write, note: Option<&str>) -> io::Result<()> {
    match note {
        Some(n) => writeln!(out, "[{n}]"),
        None => Ok(()),
    }
}
