//! Error taxonomy for the data core.
//!
//! Failures are request-scoped, never fatal to the process. Categories:
//!
//! - [`CoreError::Parse`]: malformed or undecodable file. Rejected at upload
//!   time; skipped (with a log entry) during multi-file ingestion.
//! - [`CoreError::Validation`]: bad file type/size or a malformed query
//!   specification, reported before any state mutation.
//! - [`CoreError::ExternalFetch`]: an outbound reference-data dependency was
//!   unreachable. Propagates to the one call that needed it and never
//!   corrupts an existing cache.
//!
//! Schema drift is informational (a diff payload), not an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cannot parse '{source_name}': {reason}")]
    Parse { source_name: String, reason: String },

    #[error("{0}")]
    Validation(String),

    #[error("external fetch failed: {0}")]
    ExternalFetch(String),
}

impl CoreError {
    pub fn parse(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::Parse {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }
}
