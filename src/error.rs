use crate::process::validate::ValidationResult;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Structural CSV problems reported while reading. Carries every description
/// collected before giving up; no rows are returned alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed CSV: {}", .errors.join("; "))]
pub struct ParseError {
    pub errors: Vec<String>,
}

/// Terminal failures of one upload attempt.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{name} is {size} bytes, limit is {limit}")]
    TooLarge { name: String, size: u64, limit: u64 },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{}", .0.errors.join(", "))]
    Validation(ValidationResult),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sample profile `{0}` (expected retail, ecommerce, marketing or sales)")]
pub struct ProfileError(pub String);
