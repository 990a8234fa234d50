use crate::compare::DocumentRole;
use thiserror::Error;

/// Failures reported by a [`DocumentSource`](crate::DocumentSource)
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Document has no pages")]
    NoPages,

    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("Failed to read page {page}: {message}")]
    PageUnreadable { page: usize, message: String },

    #[error("Document unreadable: {0}")]
    Unreadable(String),
}

/// Fatal comparison failures. Only an unreadable input document ends a run.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("{name} document ({role}): {operation} failed: {source}")]
    Source {
        role: DocumentRole,
        name: String,
        operation: &'static str,
        #[source]
        source: SourceError,
    },
}
