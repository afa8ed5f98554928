//! Directory-copy backend — the `generic` transport mode.
//!
//! Serves list downloads from a source tree the OS can already see (a
//! mounted share, a LAN path, a local staging directory). `remote_path`
//! values are plain filesystem paths; the transfer target is ignored.

use crate::transfer::client::FileTransferClient;
use crate::transfer::error::TransferResult;
use crate::transfer::types::{RemoteEntry, RemoteEntryKind, TransferTarget, TransportMode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Chunk size for streaming copies (64 KiB).
const DEFAULT_CHUNK: usize = 65_536;

/// Backend that copies files out of a locally visible directory tree.
#[derive(Debug, Default)]
pub struct DirTransferClient;

impl DirTransferClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileTransferClient for DirTransferClient {
    fn mode(&self) -> TransportMode {
        TransportMode::Generic
    }

    async fn download(
        &self,
        _target: &TransferTarget,
        remote_path: &str,
        local_path: &str,
    ) -> TransferResult<u64> {
        let mut src = fs::File::open(remote_path).await?;

        // Ensure parent directories exist
        if let Some(parent) = Path::new(local_path).parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut dst = fs::File::create(local_path).await?;

        let mut buf = vec![0u8; DEFAULT_CHUNK];
        let mut copied: u64 = 0;
        loop {
            let n = src.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            dst.write_all(&buf[..n]).await?;
            copied += n as u64;
        }
        dst.flush().await?;

        log::debug!("dir copy {} -> {} ({} bytes)", remote_path, local_path, copied);
        Ok(copied)
    }

    async fn list_remote(
        &self,
        _target: &TransferTarget,
        remote_dir: &str,
    ) -> TransferResult<Vec<RemoteEntry>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(remote_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            let kind = if meta.is_dir() {
                RemoteEntryKind::Directory
            } else if meta.is_file() {
                RemoteEntryKind::File
            } else {
                RemoteEntryKind::Unknown
            };
            entries.push(RemoteEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
                size: meta.len(),
                modified: meta.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        // Stable order regardless of readdir order
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
