use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write PDF report: {0}")]
    Pdf(String),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
