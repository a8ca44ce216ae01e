use reqwest::StatusCode;
use thiserror::Error;

/// Rejections raised while constructing a [`super::SupabaseClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("supabase url is required")]
    MissingUrl,
    #[error("supabase key is required")]
    MissingKey,
    #[error("invalid supabase url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported supabase url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures reported by (or while talking to) the identity backend.
///
/// `Display` is the bare message so callers can forward it unchanged.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// HTTP status returned by the backend, if it answered at all.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Decode(_) | Self::Url(_) => None,
        }
    }
}
