use serde::Serialize;
use thiserror::Error;

/// Failure of a channel operation.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("not found: {0}")]
    NotFound(String),

    /// A path or id that lies outside the channel's root.
    #[error("not contained in channel root: {0}")]
    NotContained(String),

    #[error("invalid item id: {0}")]
    InvalidId(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote api error: {0}")]
    Remote(String),

    #[error("media probe failed: {0}")]
    Probe(String),

    #[error("unknown transcode profile: {0}")]
    UnknownProfile(String),

    #[error("play state store error: {0}")]
    Store(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl ChannelError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::NotContained(_) => "not_contained",
            Self::InvalidId(_) => "invalid_id",
            Self::Io(_) => "io_error",
            Self::Remote(_) => "remote_error",
            Self::Probe(_) => "probe_failed",
            Self::UnknownProfile(_) => "unknown_profile",
            Self::Store(_) => "store_error",
            Self::Unsupported(_) => "unsupported",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidId(_) | Self::UnknownProfile(_) => 400,
            Self::NotContained(_) => 403,
            Self::NotFound(_) => 404,
            Self::Unsupported(_) => 501,
            Self::Remote(_) => 502,
            Self::Io(_) | Self::Probe(_) | Self::Store(_) => 500,
        }
    }
}

/// JSON error envelope: `{ "error": { "code": "…", "message": "…", "details": {} } }`
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl From<&ChannelError> for ErrorEnvelope {
    fn from(e: &ChannelError) -> Self {
        Self {
            error: ErrorBody {
                code: e.code().to_string(),
                message: e.to_string(),
                details: serde_json::Value::Object(serde_json::Map::new()),
            },
        }
    }
}
