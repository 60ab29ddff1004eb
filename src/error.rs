//! Crate-wide error type.
//!
//! One variant per error kind named in the repository protocol design: a
//! resolver call either succeeds with a result or fails with exactly one of
//! these, with no partial results surviving the failure.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid version '{value}': {reason}")]
    BadVersion { value: String, reason: String },

    #[error("invalid version range '{value}': {reason}")]
    BadRange { value: String, reason: String },

    #[error("transport error fetching {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("malformed repository document at {url}: {reason}")]
    BadDocument { url: String, reason: String },

    #[error("resolution cancelled")]
    Cancelled,

    #[error("{package} ({source_url}): {reason}")]
    Protocol {
        package: String,
        source_url: String,
        reason: String,
    },
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn bad_version(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::BadVersion {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn bad_range(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::BadRange {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn transport(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Transport {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn bad_document(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::BadDocument {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn protocol(
        package: impl Into<String>,
        source_url: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Protocol {
            package: package.into(),
            source_url: source_url.into(),
            reason: reason.into(),
        }
    }
}
