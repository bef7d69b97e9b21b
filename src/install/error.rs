//! Error types for the artifact installer

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Fatal (and one advisory) failures of an install run
///
/// Every variant except `VersionProbeFailed` aborts the run and maps to a
/// non-zero exit status.
#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("Unsupported platform '{0}'. Migraine CLI only supports macOS (darwin) and Linux.")]
    UnsupportedPlatform(String),

    #[error("Unsupported architecture '{0}'. Migraine CLI only supports x64 (amd64) and arm64.")]
    UnsupportedArchitecture(String),

    #[error("Failed to create binary directory {}", path.display())]
    DirectoryCreateFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to download {url}")]
    DownloadFailed { url: String, source: FetchError },

    #[error("Failed to make {} executable", path.display())]
    PermissionSetFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to link alias {} -> {}", link.display(), target.display())]
    AliasReplaceFailed {
        link: PathBuf,
        target: PathBuf,
        source: std::io::Error,
    },

    /// Advisory only: the binary is installed but did not answer the version query
    #[error("Version check of {} failed: {reason}", path.display())]
    VersionProbeFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InstallerError {
    /// Whether the error ends the run with a non-zero exit status
    pub fn is_fatal(&self) -> bool {
        !matches!(self, InstallerError::VersionProbeFailed { .. })
    }
}

/// Transport-level causes of a failed download
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("redirect (HTTP {0}) carried no usable Location header")]
    MissingLocation(u16),

    #[error("release host redirected more than once (second hop to {0})")]
    TooManyRedirects(String),

    #[error("no data received for {0:?}")]
    Inactivity(Duration),

    #[error("failed writing download to disk")]
    Io(#[from] std::io::Error),
}
