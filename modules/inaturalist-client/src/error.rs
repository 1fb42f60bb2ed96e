use thiserror::Error;

pub type Result<T> = std::result::Result<T, INatError>;

#[derive(Debug, Error)]
pub enum INatError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for INatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            INatError::Parse(err.to_string())
        } else {
            INatError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for INatError {
    fn from(err: serde_json::Error) -> Self {
        INatError::Parse(err.to_string())
    }
}
