//! Transfer-specific error type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorised transfer error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferError {
    pub kind: TransferErrorKind,
    pub message: String,
    /// Remote or local path the failure relates to, if any.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TransferErrorKind {
    /// TCP / DNS resolution failure.
    ConnectionFailed,
    /// Wrong username/password.
    AuthFailed,
    /// File or directory not found at the source.
    NotFound,
    /// Source refused access.
    PermissionDenied,
    /// Transfer aborted or incomplete.
    TransferFailed,
    /// An I/O error on the local side (file read/write).
    IoError,
    /// A single transport operation timed out.
    Timeout,
    /// Target / parameter validation error.
    InvalidTarget,
    /// The requested backend is not built into this crate.
    Unsupported,
}

pub type TransferResult<T> = Result<T, TransferError>;

// ── Construction helpers ─────────────────────────────────────────────

impl TransferError {
    pub fn new(kind: TransferErrorKind, msg: impl Into<String>) -> Self {
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

    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::ConnectionFailed, msg)
    }

    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::AuthFailed, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::NotFound, msg)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::PermissionDenied, msg)
    }

    pub fn transfer_failed(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::TransferFailed, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::IoError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::Timeout, msg)
    }

    pub fn invalid_target(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::InvalidTarget, msg)
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::Unsupported, msg)
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[transfer {:?}] {} ({})", self.kind, self.message, path)
        } else {
            write!(f, "[transfer {:?}] {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for TransferError {}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(e.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(e.to_string()),
            std::io::ErrorKind::TimedOut => Self::timeout(format!("I/O timeout: {}", e)),
            _ => Self::io_error(e.to_string()),
        }
    }
}

impl From<TransferError> for String {
    fn from(e: TransferError) -> String {
        e.message
    }
}
