use thiserror::Error;

#[derive(Error, Debug)]
pub enum FloodFlyError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid Configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Run Failed: {0}")]
    Run(String),
}

impl FloodFlyError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        FloodFlyError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type FfResult<T> = Result<T, FloodFlyError>;
