use thiserror::Error;

pub type Result<T> = std::result::Result<T, CardError>;

#[derive(Debug, Error)]
pub enum CardError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No content generated")]
    EmptyResponse,

    #[error("Invalid response format: {0}")]
    Format(String),
}

impl From<reqwest::Error> for CardError {
    fn from(err: reqwest::Error) -> Self {
        CardError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CardError {
    fn from(err: serde_json::Error) -> Self {
        CardError::Format(err.to_string())
    }
}

impl From<CardError> for naturecard_common::NatureCardError {
    fn from(err: CardError) -> Self {
        naturecard_common::NatureCardError::Generation(err.to_string())
    }
}
