use thiserror::Error;

pub type Result<T> = std::result::Result<T, GbifError>;

#[derive(Debug, Error)]
pub enum GbifError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GbifError {
    fn from(err: reqwest::Error) -> Self {
        GbifError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GbifError {
    fn from(err: serde_json::Error) -> Self {
        GbifError::Parse(err.to_string())
    }
}
