use agenda_core::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfSourceError {
    #[error("Failed to load PDF {id}: {message}")]
    Load { id: String, message: String },

    #[error("PDF {0} is encrypted")]
    Encrypted(String),

    #[error("PDF {0} has no pages")]
    NoPages(String),
}

impl From<PdfSourceError> for SourceError {
    fn from(err: PdfSourceError) -> Self {
        match err {
            PdfSourceError::NoPages(_) => SourceError::NoPages,
            other => SourceError::Unreadable(other.to_string()),
        }
    }
}
