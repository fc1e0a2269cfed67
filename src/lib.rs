//! Client and relay for the AI Fiesta multi-model chat API.
//!
//! The interesting part is [`stream`]: it turns a `data: <json>` byte stream
//! into a [`stream::StreamResult`] no matter how the bytes were chunked.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod paths;
pub mod present;
pub mod relay;
pub mod request;
pub mod store;
pub mod stream;
pub mod transport;

pub use error::{TransportError, TransportResult};
pub use request::{Credential, RequestSpec};
pub use stream::{EventFrame, FrameKind, StreamResult, StreamStatus};
pub use transport::{Outcome, Transport};
