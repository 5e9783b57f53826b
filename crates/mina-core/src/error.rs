use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required credential: {0}")]
    MissingCredential(&'static str),
}

pub type Result<T> = std::result::Result<T, MinaError>;
