use thiserror::Error;

pub type Result<T> = std::result::Result<T, LeadflowError>;

#[derive(Error, Debug)]
pub enum LeadflowError {
    #[error("Upload error: {0}")]
    Upload(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
