//! List manager configuration.

use crate::list::error::{ListLoadError, ListResult};
use crate::list::version::VersionInfo;
use serde::{Deserialize, Serialize};
use shopsync_transfer::transfer::{Credentials, FtpServiceMode, TransferTarget, TransportMode};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one list manager.
///
/// One shape covers both transports: FTP targets fill in the server
/// fields, the directory transport reads sources straight from
/// `remote_path`. Port and service mode are optional with FTP defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListManagerConfig {
    #[serde(default)]
    pub transport_mode: TransportMode,
    /// List server address; required for FTP, ignored by the directory
    /// transport.
    #[serde(default)]
    pub server_address: String,
    /// Control port; `None` falls back to the FTP default.
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub credentials: Credentials,
    /// Remote directory the list files live in.
    pub remote_path: String,
    /// Local directory the list files are downloaded to.
    pub local_path: String,
    /// The caller's persisted local version marker.
    #[serde(default)]
    pub version: VersionInfo,
    /// Ceiling for one download phase in seconds (0 = unbounded).
    #[serde(default = "default_max_download_secs")]
    pub max_download_secs: u64,
    #[serde(default)]
    pub ftp_service_mode: FtpServiceMode,
}

fn default_max_download_secs() -> u64 {
    60
}

impl Default for ListManagerConfig {
    fn default() -> Self {
        Self {
            transport_mode: TransportMode::Ftp,
            server_address: String::new(),
            port: None,
            credentials: Credentials::default(),
            remote_path: String::new(),
            local_path: String::new(),
            version: VersionInfo::default(),
            max_download_secs: default_max_download_secs(),
            ftp_service_mode: FtpServiceMode::Passive,
        }
    }
}

impl ListManagerConfig {
    /// Validate before any work starts.
    pub fn validate(&self) -> ListResult<()> {
        if self.remote_path.trim().is_empty() {
            return Err(ListLoadError::invalid_config("remote path is empty"));
        }
        if self.local_path.trim().is_empty() {
            return Err(ListLoadError::invalid_config("local path is empty"));
        }
        if self.transport_mode == TransportMode::Ftp && self.server_address.trim().is_empty() {
            return Err(ListLoadError::invalid_config(
                "server address is required for the ftp transport",
            ));
        }
        Ok(())
    }

    /// Transfer target handed to the transport on every call.
    pub fn target(&self) -> TransferTarget {
        TransferTarget {
            address: self.server_address.clone(),
            port: self.port,
            credentials: self.credentials.clone(),
            service_mode: self.ftp_service_mode,
        }
    }

    /// Remote path of one list file (naming convention: fixed file names
    /// under `remote_path`).
    pub fn remote_file(&self, name: &str) -> String {
        format!("{}/{}", self.remote_path.trim_end_matches('/'), name)
    }

    /// Local path of one list file.
    pub fn local_file(&self, name: &str) -> PathBuf {
        Path::new(&self.local_path).join(name)
    }

    /// Download ceiling, `None` when unbounded.
    pub fn max_download_duration(&self) -> Option<Duration> {
        if self.max_download_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.max_download_secs))
        }
    }
}
