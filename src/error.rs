//! Error types for the content pipeline and contact submissions

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading posts from a [`PostSource`](crate::content::PostSource)
#[derive(Debug, Error)]
pub enum ContentError {
    /// The posts location (or a post file) could not be read
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No post matches the identifier
    #[error("post not found: {0}")]
    NotFound(String),

    /// The front-matter block of a post is malformed
    #[error("invalid front-matter in {slug}: {reason}")]
    Parse { slug: String, reason: String },
}

impl ContentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound(_))
    }
}

/// A contact form field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidField {
    Email,
    Name,
    Message,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InvalidField::Email => "email",
            InvalidField::Name => "name",
            InvalidField::Message => "message",
        };
        f.write_str(name)
    }
}

/// Submission rejected before reaching the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid inputs: {}", join_fields(.fields))]
pub struct ValidationError {
    pub fields: Vec<InvalidField>,
}

fn join_fields(fields: &[InvalidField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Backend-level failures reported by a document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unreachable: {0}")]
    Unreachable(String),

    #[error("document write failed: {0}")]
    Write(String),

    /// A query failed or a stored document could not be decoded
    #[error("document read failed: {0}")]
    Read(String),
}

/// Failure of a whole contact submission request
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store could not be reached; no connection was acquired
    #[error("could not connect to database: {0}")]
    Connection(String),

    /// The insert failed after connecting; the connection was released
    #[error("storing message failed: {0}")]
    Write(String),
}

impl From<StoreError> for SubmissionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unreachable(reason) => SubmissionError::Connection(reason),
            StoreError::Write(reason) | StoreError::Read(reason) => SubmissionError::Write(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_fields() {
        let err = ValidationError {
            fields: vec![InvalidField::Email, InvalidField::Message],
        };
        assert_eq!(err.to_string(), "invalid inputs: email, message");
    }

    #[test]
    fn test_store_error_maps_to_submission_error() {
        let err: SubmissionError = StoreError::Unreachable("refused".into()).into();
        assert!(matches!(err, SubmissionError::Connection(_)));

        let err: SubmissionError = StoreError::Write("disk full".into()).into();
        assert!(matches!(err, SubmissionError::Write(_)));

        let err = StoreError::Read("corrupt document x".into());
        assert_eq!(err.to_string(), "document read failed: corrupt document x");
    }
}
