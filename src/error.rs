use thiserror::Error;

/// Failure of one transport attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the response never arrived.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The other side answered with a non-success status.
    #[error("Request failed: {status} - {body}")]
    Status { status: u16, body: String },

    /// The relay answered with a non-success status and its own message.
    #[error("{message}")]
    Relay { status: u16, message: String },

    /// The request could not be built (bad header value, URL, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A success response whose body could not be read or understood.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Relay { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
