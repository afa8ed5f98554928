//! List-load error taxonomy.

use serde::{Deserialize, Serialize};
use shopsync_transfer::transfer::TransferError;
use std::fmt;

/// Categorised list-load error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListLoadError {
    pub kind: ListLoadErrorKind,
    pub message: String,
    /// File the failure relates to, if any.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ListLoadErrorKind {
    /// Configuration rejected before any work started.
    InvalidConfig,
    /// The transport reported a failure mid-cycle.
    DownloadFailed,
    /// The manager's own download ceiling expired.
    DownloadTimeout,
    /// An expected list file is absent at parse time.
    FileMissing,
    /// A list file decoded fine but a record did not parse.
    MalformedRecord,
}

pub type ListResult<T> = Result<T, ListLoadError>;

// ── Construction helpers ─────────────────────────────────────────────

impl ListLoadError {
    pub fn new(kind: ListLoadErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    // ── Convenience constructors ─────────────────────────────────

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ListLoadErrorKind::InvalidConfig, msg)
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::new(ListLoadErrorKind::DownloadFailed, msg)
    }

    pub fn download_timeout(msg: impl Into<String>) -> Self {
        Self::new(ListLoadErrorKind::DownloadTimeout, msg)
    }

    pub fn file_missing(msg: impl Into<String>) -> Self {
        Self::new(ListLoadErrorKind::FileMissing, msg)
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::new(ListLoadErrorKind::MalformedRecord, msg)
    }

    /// Whether the caller's retry policy should consider another attempt.
    /// Config and content errors stay broken until somebody fixes them.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ListLoadErrorKind::DownloadFailed
                | ListLoadErrorKind::DownloadTimeout
                | ListLoadErrorKind::FileMissing
        )
    }
}

impl fmt::Display for ListLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[list {:?}] {} ({})", self.kind, self.message, path)
        } else {
            write!(f, "[list {:?}] {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ListLoadError {}

impl From<TransferError> for ListLoadError {
    fn from(e: TransferError) -> Self {
        Self {
            kind: ListLoadErrorKind::DownloadFailed,
            message: format!("[transfer {:?}] {}", e.kind, e.message),
            path: e.path,
        }
    }
}

impl From<std::io::Error> for ListLoadError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::file_missing(e.to_string())
        } else {
            Self::download_failed(format!("local I/O error: {}", e))
        }
    }
}

impl From<ListLoadError> for String {
    fn from(e: ListLoadError) -> String {
        e.message
    }
}
