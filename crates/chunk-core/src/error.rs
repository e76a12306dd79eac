use crate::window::WindowError;
use chunk_config::StoreError;
use chunk_sources::SourceError;

/// No usable bearer token could be produced.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No valid access or refresh token available. Please update config with refresh_token.")]
    MissingRefreshToken,

    #[error("Token refresh rejected: {status} - {message}")]
    RefreshRejected { status: u16, message: String },

    #[error("Token endpoint unreachable: {0}")]
    RefreshUnreachable(String),

    #[error("Token endpoint returned an unusable response: {0}")]
    InvalidTokenResponse(String),

    #[error("Credential store error: {0}")]
    Storage(#[from] StoreError),
}

impl From<SourceError> for AuthError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Status { status, body } => AuthError::RefreshRejected {
                status: status.as_u16(),
                message: body,
            },
            SourceError::Transport(e) => AuthError::RefreshUnreachable(e.to_string()),
            SourceError::Decode(message) => AuthError::InvalidTokenResponse(message),
        }
    }
}

/// Everything a list request can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("{0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Trakt API error: {message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("Failed to fetch list items: {0}")]
    Transport(String),
}

impl ChunkError {
    /// HTTP status the error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            ChunkError::InvalidParameter(_) => 400,
            ChunkError::Auth(_) => 500,
            ChunkError::Upstream { .. } => 502,
            ChunkError::Transport(_) => 500,
        }
    }
}

impl From<WindowError> for ChunkError {
    fn from(e: WindowError) -> Self {
        ChunkError::InvalidParameter(e.to_string())
    }
}

impl From<SourceError> for ChunkError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Status { status, .. } => ChunkError::Upstream {
                status: Some(status.as_u16()),
                message: e.to_string(),
            },
            SourceError::Decode(_) => ChunkError::Upstream {
                status: None,
                message: e.to_string(),
            },
            SourceError::Transport(e) => ChunkError::Transport(e.to_string()),
        }
    }
}
