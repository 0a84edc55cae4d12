use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApolloError>;

#[derive(Debug, Error)]
pub enum ApolloError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Coarse classification of a failed call, used by callers to decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    RateLimited,
    InvalidInput,
    Timeout,
    Other,
}

impl ApolloError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApolloError::Api { status, .. } => match status {
                401 | 403 => ErrorKind::Unauthorized,
                429 => ErrorKind::RateLimited,
                400 | 422 => ErrorKind::InvalidInput,
                _ => ErrorKind::Other,
            },
            ApolloError::Network(msg) if msg.contains("timed out") => ErrorKind::Timeout,
            ApolloError::Network(_) | ApolloError::Parse(_) => ErrorKind::Other,
        }
    }
}

impl From<reqwest::Error> for ApolloError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ApolloError::Parse(err.to_string());
        }
        if err.is_timeout() {
            return ApolloError::Network(format!("request timed out: {err}"));
        }
        ApolloError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApolloError {
    fn from(err: serde_json::Error) -> Self {
        ApolloError::Parse(err.to_string())
    }
}
