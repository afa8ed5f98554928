//! The `FileTransferClient` trait and backend factory.
//!
//! List managers drive downloads exclusively through this trait. The crate
//! ships two backends (directory copy and in-memory simulation); the FTP
//! engine lives in the embedding client and is injected by the caller.

use crate::transfer::dir_client::DirTransferClient;
use crate::transfer::error::{TransferError, TransferResult};
use crate::transfer::types::{RemoteEntry, TransferTarget, TransportMode};
use async_trait::async_trait;
use std::sync::Arc;

// ── Transfer trait ───────────────────────────────────────────────────

/// Transport-agnostic file retrieval.
///
/// Implementations must be `Send + Sync` so they can be held behind an
/// `Arc` and used from spawned download workers.
#[async_trait]
pub trait FileTransferClient: Send + Sync + std::fmt::Debug {
    /// Backend identifier.
    fn mode(&self) -> TransportMode;

    /// Fetch one remote file to a local path, creating parent directories
    /// as needed. Returns the number of bytes written.
    async fn download(
        &self,
        target: &TransferTarget,
        remote_path: &str,
        local_path: &str,
    ) -> TransferResult<u64>;

    /// List the entries of a remote directory.
    async fn list_remote(
        &self,
        target: &TransferTarget,
        remote_dir: &str,
    ) -> TransferResult<Vec<RemoteEntry>>;
}

/// Create a backend instance for the given transport mode.
///
/// Only the directory backend is built in; FTP targets require the
/// embedding client to inject its own `FileTransferClient`.
pub fn create_transfer_client(mode: TransportMode) -> TransferResult<Arc<dyn FileTransferClient>> {
    match mode {
        TransportMode::Generic => Ok(Arc::new(DirTransferClient::new())),
        TransportMode::Ftp => Err(TransferError::unsupported(
            "FTP transport is supplied by the embedding client",
        )),
    }
}
