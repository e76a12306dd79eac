use reqwest::StatusCode;

/// Failure talking to a Trakt endpoint.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The endpoint answered with a non-2xx status.
    #[error("{status} - {body}")]
    Status { status: StatusCode, body: String },

    /// Connection, TLS or timeout failure before a status was received.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered 2xx with a body we could not use.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
