//! Shared types for the transfer crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default FTP control port used when a target leaves the port unset.
pub const DEFAULT_FTP_PORT: u16 = 21;

// ─── Transport selection ─────────────────────────────────────────────

/// How list files reach the local machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum TransportMode {
    /// Plain directory copy from a mounted or LAN-visible source tree.
    Generic,
    /// FTP download from a list server.
    Ftp,
}

impl Default for TransportMode {
    fn default() -> Self {
        Self::Ftp
    }
}

/// FTP data-connection mode requested for a download.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum FtpServiceMode {
    Passive,
    Active,
}

impl Default for FtpServiceMode {
    fn default() -> Self {
        Self::Passive
    }
}

// ─── Target ──────────────────────────────────────────────────────────

/// Login credentials for a transfer target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "anonymous".into(),
            password: "anonymous@".into(),
        }
    }
}

/// Where a download comes from — passed per call so one backend instance
/// can serve any number of list managers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransferTarget {
    /// Server address for network transports; unused by the directory
    /// backend, which resolves sources from the remote path alone.
    pub address: String,
    /// Control port; `None` falls back to [`DEFAULT_FTP_PORT`].
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub service_mode: FtpServiceMode,
}

impl TransferTarget {
    /// Port to dial, with the FTP default applied.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_FTP_PORT)
    }
}

// ─── Listing ─────────────────────────────────────────────────────────

/// Type of a remote filesystem entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum RemoteEntryKind {
    File,
    Directory,
    Unknown,
}

/// One entry from a remote directory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEntry {
    pub name: String,
    pub kind: RemoteEntryKind,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}
