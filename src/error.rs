use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),
    #[error("Invalid date '{value}' for {key}, expected MM/DD/YYYY")]
    InvalidDate { key: &'static str, value: String },
    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },
    #[error("Invalid batch size '{0}', expected a positive integer")]
    InvalidBatchSize(String),
    #[error("Unknown query mode '{0}', expected 'split' or 'combined'")]
    InvalidQueryMode(String),
    #[error("Invalid boolean '{value}' for {key}")]
    InvalidFlag { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{endpoint} request returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
}
