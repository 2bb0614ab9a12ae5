//! Error types for the mirror pipeline.
//!
//! Fatal categories ([`MirrorError`]) abort the whole batch. [`CloneError`] is
//! recoverable: it is stored in the per-repository result and never raised.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigurationError;

/// Errors that can occur while listing repositories from the forge.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The forge answered with a non-success status.
    #[error("forge returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// DNS, TCP, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not a JSON array of repositories.
    #[error("could not decode repository list: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ListingError {
    /// HTTP status code, when the forge answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ListingError::Status { status, .. } => Some(*status),
            ListingError::Transport(e) => e.status().map(|s| s.as_u16()),
            ListingError::Decode(_) => None,
        }
    }
}

/// Per-repository failure. Captured in the batch summary, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloneError {
    /// The version-control tool exited with a non-zero status.
    #[error("git exited with {}: {stderr}", exit_label(.code))]
    Exit { code: Option<i32>, stderr: String },

    /// The per-clone timeout elapsed and the child was killed.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The batch deadline passed before this repository was attempted.
    #[error("batch deadline exceeded")]
    DeadlineExceeded,

    /// Destination already exists and the policy is `fail`.
    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// The repository name cannot be used as a directory name.
    #[error("invalid repository directory name: {0:?}")]
    InvalidName(String),

    /// Spawn failure, I/O error, or anything else unexpected.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "signal".to_string(),
    }
}

/// Fatal errors that abort the batch before or instead of cloning.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The target directory could not be created.
    #[error("failed to create directory '{}': {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The repository list could not be retrieved.
    #[error("failed to fetch repositories: {0}")]
    Listing(#[from] ListingError),
}
