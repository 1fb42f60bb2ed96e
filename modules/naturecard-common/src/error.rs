use thiserror::Error;

#[derive(Error, Debug)]
pub enum NatureCardError {
    #[error("No species provider could be reached")]
    ProvidersUnavailable,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Card generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
