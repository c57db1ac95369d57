use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnrichError>;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Article store error: {0}")]
    Store(String),
}

impl From<reqwest::Error> for EnrichError {
    fn from(err: reqwest::Error) -> Self {
        EnrichError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for EnrichError {
    fn from(err: serde_json::Error) -> Self {
        EnrichError::Parse(err.to_string())
    }
}

impl From<duckdb::Error> for EnrichError {
    fn from(err: duckdb::Error) -> Self {
        EnrichError::Store(err.to_string())
    }
}
