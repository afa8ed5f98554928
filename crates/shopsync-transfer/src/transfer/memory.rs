//! In-memory simulated backend (for testing & offline use).
//!
//! Holds a remote tree as a path → bytes map and serves downloads by
//! writing those bytes to the requested local path. Knobs allow failure
//! injection and a stalled mode whose operations never complete, which is
//! how deadline handling is exercised without a real slow server.

use crate::transfer::client::FileTransferClient;
use crate::transfer::error::{TransferError, TransferResult};
use crate::transfer::types::{RemoteEntry, RemoteEntryKind, TransferTarget, TransportMode};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::fs;

/// A fully in-memory transfer backend useful for unit tests and demos.
#[derive(Debug)]
pub struct InMemoryTransferClient {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    download_log: Mutex<Vec<String>>,
    failure: Mutex<Option<TransferError>>,
    stalled: AtomicBool,
}

impl InMemoryTransferClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            files: Mutex::new(BTreeMap::new()),
            download_log: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            stalled: AtomicBool::new(false),
        })
    }

    /// Seed (or replace) one remote file.
    pub fn seed_file(&self, remote_path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let mut files = self.files.lock().unwrap();
        files.insert(remote_path.into(), bytes.into());
    }

    /// Remove a seeded remote file.
    pub fn remove_file(&self, remote_path: &str) {
        let mut files = self.files.lock().unwrap();
        files.remove(remote_path);
    }

    /// Fail every subsequent operation with the given error.
    pub fn set_failure(&self, err: TransferError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    /// Clear an injected failure.
    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// When stalled, downloads and listings block forever.
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    /// Remote paths requested so far, in call order (for test assertions).
    pub fn downloads(&self) -> Vec<String> {
        self.download_log.lock().unwrap().clone()
    }

    pub fn download_count(&self) -> usize {
        self.download_log.lock().unwrap().len()
    }

    fn injected_failure(&self) -> Option<TransferError> {
        self.failure.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileTransferClient for InMemoryTransferClient {
    fn mode(&self) -> TransportMode {
        TransportMode::Generic
    }

    async fn download(
        &self,
        _target: &TransferTarget,
        remote_path: &str,
        local_path: &str,
    ) -> TransferResult<u64> {
        self.download_log.lock().unwrap().push(remote_path.to_string());

        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.injected_failure() {
            return Err(err);
        }

        let bytes = {
            let files = self.files.lock().unwrap();
            files.get(remote_path).cloned()
        };
        let bytes = bytes.ok_or_else(|| {
            TransferError::not_found("no such remote file").with_path(remote_path)
        })?;

        if let Some(parent) = Path::new(local_path).parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(local_path, &bytes).await?;
        Ok(bytes.len() as u64)
    }

    async fn list_remote(
        &self,
        _target: &TransferTarget,
        remote_dir: &str,
    ) -> TransferResult<Vec<RemoteEntry>> {
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.injected_failure() {
            return Err(err);
        }

        let prefix = format!("{}/", remote_dir.trim_end_matches('/'));
        let files = self.files.lock().unwrap();
        let entries = files
            .iter()
            .filter_map(|(path, bytes)| {
                let rest = path.strip_prefix(&prefix)?;
                // Direct children only
                if rest.is_empty() || rest.contains('/') {
                    return None;
                }
                Some(RemoteEntry {
                    name: rest.to_string(),
                    kind: RemoteEntryKind::File,
                    size: bytes.len() as u64,
                    modified: None,
                })
            })
            .collect();
        Ok(entries)
    }
}
