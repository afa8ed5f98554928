//! The download coordinator.
//!
//! One manager owns one configuration, one transfer backend, and one
//! content loader, and runs the refresh cycle on demand: compare the
//! local version marker against the remote manifest, replace stale
//! local files within the download ceiling, and hand the result to the
//! loader for parsing. Every attempt leaves a [`LoadOutcome`] behind,
//! whether it skipped, completed, failed, or timed out.

use crate::list::config::ListManagerConfig;
use crate::list::encoding::{decode_list_text, default_legacy_encoding};
use crate::list::error::{ListLoadError, ListLoadErrorKind, ListResult};
use crate::list::loader::ListContentLoader;
use crate::list::version::{parse_version_manifest, VersionInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopsync_transfer::transfer::{FileTransferClient, TransferError};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use uuid::Uuid;

/// How one load attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    /// Local files were current; nothing was downloaded.
    Skipped,
    /// Fresh files were downloaded and parsed.
    Completed,
    /// The attempt failed before the content was replaced.
    Failed,
    /// The download ceiling expired and the worker was abandoned.
    TimedOut,
}

/// Outcome of one bounded download batch.
#[derive(Debug, Clone)]
pub enum DownloadResult {
    Success { files: usize, bytes: u64 },
    Failure(TransferError),
    TimedOut,
}

/// Record of one load attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutcome {
    pub attempt_id: String,
    pub state: LoadState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files_fetched: usize,
    pub bytes_fetched: u64,
    /// Remote version observed during the attempt, if it got that far.
    pub remote_version: Option<VersionInfo>,
    pub error: Option<String>,
}

/// Coordinates the list refresh cycle.
pub struct ListManager {
    config: ListManagerConfig,
    transfer: Arc<dyn FileTransferClient>,
    loader: ListContentLoader,
    remote_version: Option<VersionInfo>,
    last_outcome: Option<LoadOutcome>,
}

impl std::fmt::Debug for ListManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListManager")
            .field("config", &self.config)
            .field("remote_version", &self.remote_version)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

impl ListManager {
    pub fn new(
        config: ListManagerConfig,
        transfer: Arc<dyn FileTransferClient>,
        loader: ListContentLoader,
    ) -> ListResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transfer,
            loader,
            remote_version: None,
            last_outcome: None,
        })
    }

    /// Replace the configuration; cached version state and any pending
    /// cycle state are dropped.
    pub fn configure(&mut self, config: ListManagerConfig) -> ListResult<()> {
        config.validate()?;
        self.config = config;
        self.remote_version = None;
        self.last_outcome = None;
        self.loader.reset_cycle();
        Ok(())
    }

    pub fn config(&self) -> &ListManagerConfig {
        &self.config
    }

    /// Loaded content, queried through the loader's accessors.
    pub fn loader(&self) -> &ListContentLoader {
        &self.loader
    }

    /// Remote version seen on the most recent attempt that reached the
    /// manifest. Callers persist this as their new local marker after a
    /// completed load.
    pub fn remote_version(&self) -> Option<&VersionInfo> {
        self.remote_version.as_ref()
    }

    pub fn last_outcome(&self) -> Option<&LoadOutcome> {
        self.last_outcome.as_ref()
    }

    // ─── The refresh cycle ───────────────────────────────────────

    /// Run one refresh cycle.
    ///
    /// With `force_download` unset, a version probe decides whether the
    /// local files are current; a current set is parsed in place without
    /// downloading. Forcing skips the probe and always replaces the
    /// local files.
    pub async fn load_list(&mut self, force_download: bool) -> ListResult<LoadOutcome> {
        let attempt_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        log::info!(
            "list load {} started (force_download: {})",
            attempt_id,
            force_download
        );

        let (state, files, bytes, error) = match self.run_cycle(force_download).await {
            Ok((state, files, bytes)) => (state, files, bytes, None),
            Err(e) => {
                let state = if e.kind == ListLoadErrorKind::DownloadTimeout {
                    LoadState::TimedOut
                } else {
                    LoadState::Failed
                };
                (state, 0, 0, Some(e))
            }
        };

        let outcome = LoadOutcome {
            attempt_id,
            state,
            started_at,
            finished_at: Utc::now(),
            files_fetched: files,
            bytes_fetched: bytes,
            remote_version: self.remote_version.clone(),
            error: error.as_ref().map(|e| e.to_string()),
        };
        self.last_outcome = Some(outcome.clone());

        match error {
            Some(e) => {
                log::warn!("list load {} {:?}: {}", outcome.attempt_id, state, e);
                Err(e)
            }
            None => {
                log::info!(
                    "list load {} {:?} ({} file(s), {} byte(s))",
                    outcome.attempt_id,
                    state,
                    files,
                    bytes
                );
                Ok(outcome)
            }
        }
    }

    async fn run_cycle(&mut self, force_download: bool) -> ListResult<(LoadState, usize, u64)> {
        self.config.validate()?;

        if !force_download && self.local_files_present().await {
            // Probe failures are terminal: without the manifest there is
            // no way to tell whether the local files are trustworthy.
            let remote = self.fetch_remote_version().await?;
            let current = self.config.version >= remote;
            log::info!(
                "version probe: local {}, remote {} ({})",
                self.config.version,
                remote,
                if current { "current" } else { "stale" }
            );
            self.remote_version = Some(remote);
            if current {
                self.loader
                    .load_parsed_content(&self.config, &self.transfer, false)
                    .await?;
                return Ok((LoadState::Skipped, 0, 0));
            }
        }

        self.loader.reset_cycle();
        self.delete_local_files().await;

        let pairs: Vec<(String, String)> = self
            .loader
            .file_names()
            .iter()
            .map(|name| {
                (
                    self.config.remote_file(name),
                    self.config.local_file(name).display().to_string(),
                )
            })
            .collect();

        let (files, bytes) = match self.run_bounded_downloads(pairs).await {
            DownloadResult::Success { files, bytes } => (files, bytes),
            DownloadResult::Failure(e) => return Err(ListLoadError::from(e)),
            DownloadResult::TimedOut => {
                return Err(ListLoadError::download_timeout(format!(
                    "download batch exceeded {}s",
                    self.config.max_download_secs
                )))
            }
        };

        // The batch ends with the version manifest; read it back so the
        // caller can persist the new marker.
        let version_path = self.config.local_file(self.loader.version_file());
        let version = self.read_version_file(&version_path).await?;
        self.remote_version = Some(version);

        self.loader
            .load_parsed_content(&self.config, &self.transfer, true)
            .await?;
        Ok((LoadState::Completed, files, bytes))
    }

    // ─── Cycle steps ─────────────────────────────────────────────

    /// All files of the loader's set exist locally.
    async fn local_files_present(&self) -> bool {
        for name in self.loader.file_names() {
            if fs::metadata(self.config.local_file(name)).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Download the remote version manifest to a scratch name and parse
    /// it, leaving the local manifest untouched.
    async fn fetch_remote_version(&self) -> ListResult<VersionInfo> {
        let version_file = self.loader.version_file();
        let temp_path = self.config.local_file(&format!("{}.remote", version_file));
        let pair = vec![(
            self.config.remote_file(version_file),
            temp_path.display().to_string(),
        )];

        match self.run_bounded_downloads(pair).await {
            DownloadResult::Success { .. } => {}
            DownloadResult::Failure(e) => return Err(ListLoadError::from(e)),
            DownloadResult::TimedOut => {
                return Err(ListLoadError::download_timeout(
                    "version probe exceeded the download ceiling",
                ))
            }
        }

        let version = self.read_version_file(&temp_path).await;
        if let Err(e) = fs::remove_file(&temp_path).await {
            log::warn!("could not remove {}: {}", temp_path.display(), e);
        }
        version
    }

    async fn read_version_file(&self, path: &Path) -> ListResult<VersionInfo> {
        let display = path.display().to_string();
        let bytes = fs::read(path)
            .await
            .map_err(|e| ListLoadError::from(e).with_path(display.clone()))?;
        let (text, _) = decode_list_text(&bytes, default_legacy_encoding());
        parse_version_manifest(&text).map_err(|e| e.with_path(display))
    }

    /// Remove the local file set ahead of a download batch. Best-effort:
    /// a file that cannot be removed is logged and overwritten by the
    /// download instead.
    async fn delete_local_files(&self) {
        for name in self.loader.file_names() {
            let path = self.config.local_file(name);
            match fs::remove_file(&path).await {
                Ok(()) => log::debug!("removed stale {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("could not remove stale {}: {}", path.display(), e),
            }
        }
    }

    /// Run one download batch on a worker task, bounded by the
    /// configured ceiling. On expiry the worker is aborted mid-transfer
    /// and the partial files are left for the next cycle to clear.
    async fn run_bounded_downloads(&self, files: Vec<(String, String)>) -> DownloadResult {
        let transfer = Arc::clone(&self.transfer);
        let target = self.config.target();
        let mut handle = tokio::spawn(async move {
            let mut fetched = 0usize;
            let mut bytes = 0u64;
            for (remote, local) in files {
                match transfer.download(&target, &remote, &local).await {
                    Ok(n) => {
                        fetched += 1;
                        bytes += n;
                    }
                    Err(e) => return DownloadResult::Failure(e),
                }
            }
            DownloadResult::Success {
                files: fetched,
                bytes,
            }
        });

        match self.config.max_download_duration() {
            Some(ceiling) => match tokio::time::timeout(ceiling, &mut handle).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => DownloadResult::Failure(TransferError::transfer_failed(format!(
                    "download worker failed: {}",
                    e
                ))),
                Err(_) => {
                    handle.abort();
                    DownloadResult::TimedOut
                }
            },
            None => match handle.await {
                Ok(result) => result,
                Err(e) => DownloadResult::Failure(TransferError::transfer_failed(format!(
                    "download worker failed: {}",
                    e
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::catalog::{SHOP_CATEGORY_FILE, SHOP_PACKAGE_FILE};
    use crate::list::script::{SCRIPT_LIST_FILE, SCRIPT_VERSION_FILE};
    use shopsync_transfer::transfer::{InMemoryTransferClient, TransportMode};

    fn test_config(dir: &Path) -> ListManagerConfig {
        ListManagerConfig {
            transport_mode: TransportMode::Generic,
            remote_path: "srv/lists".into(),
            local_path: dir.to_str().unwrap().to_string(),
            max_download_secs: 5,
            ..ListManagerConfig::default()
        }
    }

    fn seed_shop_remote(client: &InMemoryTransferClient, sequence: u64) {
        client.seed_file(
            "srv/lists/shopcategory.txt",
            "0 \"Costumes\" 1\n1 \"Pets\" 2\nend\n",
        );
        client.seed_file("srv/lists/shoppackage.txt", "10 0 \"Starter Pack\" 900 0\nend\n");
        client.seed_file("srv/lists/shopproduct.txt", "100 10 \"Red Cape\" 3 7 1\nend\n");
        client.seed_file(
            "srv/lists/shopversion.txt",
            format!("{} \"2026-08-01 12:00:00\"\nend\n", sequence),
        );
    }

    fn shop_manager(
        dir: &Path,
        client: &Arc<InMemoryTransferClient>,
        local_sequence: u64,
    ) -> ListManager {
        let mut config = test_config(dir);
        config.version = VersionInfo::new(local_sequence);
        ListManager::new(
            config,
            client.clone() as Arc<dyn FileTransferClient>,
            ListContentLoader::shop_list(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let client = InMemoryTransferClient::new();
        let err = ListManager::new(
            ListManagerConfig::default(),
            client as Arc<dyn FileTransferClient>,
            ListContentLoader::shop_list(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ListLoadErrorKind::InvalidConfig);
    }

    #[tokio::test]
    async fn test_first_load_downloads_and_parses() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);

        let mut manager = shop_manager(dir.path(), &client, 0);
        let outcome = manager.load_list(false).await.unwrap();

        assert_eq!(outcome.state, LoadState::Completed);
        assert_eq!(outcome.files_fetched, 4);
        assert!(outcome.bytes_fetched > 0);
        assert_eq!(outcome.remote_version.unwrap().sequence, 3);
        assert_eq!(manager.remote_version().unwrap().sequence, 3);

        // No probe on an empty local set, and the version marker last.
        let downloads = client.downloads();
        assert_eq!(downloads.len(), 4);
        assert_eq!(downloads.last().unwrap(), "srv/lists/shopversion.txt");

        let shop = manager.loader().shop().unwrap();
        assert_eq!(shop.categories().len(), 2);
        assert_eq!(shop.packages().len(), 1);
        assert_eq!(shop.products().len(), 1);
        assert!(dir.path().join(SHOP_CATEGORY_FILE).exists());
    }

    #[tokio::test]
    async fn test_current_version_skips_download_but_parses() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);

        // First manager fills the local directory.
        let mut first = shop_manager(dir.path(), &client, 0);
        first.load_list(false).await.unwrap();
        assert_eq!(client.download_count(), 4);

        // Second manager holds the current marker: one probe, no batch.
        let mut second = shop_manager(dir.path(), &client, 3);
        let outcome = second.load_list(false).await.unwrap();
        assert_eq!(outcome.state, LoadState::Skipped);
        assert_eq!(outcome.files_fetched, 0);
        assert_eq!(client.download_count(), 5);

        // Parsed from the files already on disk.
        assert_eq!(second.loader().shop().unwrap().categories().len(), 2);
        assert!(!dir.path().join("shopversion.txt.remote").exists());
    }

    #[tokio::test]
    async fn test_stale_version_redownloads() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);

        let mut first = shop_manager(dir.path(), &client, 0);
        first.load_list(false).await.unwrap();

        seed_shop_remote(&client, 4);
        let mut second = shop_manager(dir.path(), &client, 3);
        let outcome = second.load_list(false).await.unwrap();

        // Probe plus the full batch.
        assert_eq!(outcome.state, LoadState::Completed);
        assert_eq!(client.download_count(), 4 + 1 + 4);
        assert_eq!(second.remote_version().unwrap().sequence, 4);
    }

    #[tokio::test]
    async fn test_newer_local_marker_still_skips() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);

        let mut first = shop_manager(dir.path(), &client, 0);
        first.load_list(false).await.unwrap();

        // Ahead of the server (rollback on the remote side): not stale.
        let mut second = shop_manager(dir.path(), &client, 9);
        let outcome = second.load_list(false).await.unwrap();
        assert_eq!(outcome.state, LoadState::Skipped);
        assert_eq!(client.download_count(), 5);
    }

    #[tokio::test]
    async fn test_missing_local_file_downloads_despite_current_marker() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);

        let mut first = shop_manager(dir.path(), &client, 0);
        first.load_list(false).await.unwrap();

        tokio::fs::remove_file(dir.path().join(SHOP_PACKAGE_FILE))
            .await
            .unwrap();

        // Incomplete local set: no probe, straight to the batch.
        let mut second = shop_manager(dir.path(), &client, 3);
        let outcome = second.load_list(false).await.unwrap();
        assert_eq!(outcome.state, LoadState::Completed);
        assert_eq!(client.download_count(), 8);
        assert!(dir.path().join(SHOP_PACKAGE_FILE).exists());
    }

    #[tokio::test]
    async fn test_force_download_bypasses_probe() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);

        let mut first = shop_manager(dir.path(), &client, 0);
        first.load_list(false).await.unwrap();

        // Marker is current, yet force replaces everything without a probe.
        let mut second = shop_manager(dir.path(), &client, 3);
        let outcome = second.load_list(true).await.unwrap();
        assert_eq!(outcome.state, LoadState::Completed);
        assert_eq!(outcome.files_fetched, 4);
        assert_eq!(client.download_count(), 8);
    }

    #[tokio::test]
    async fn test_probe_failure_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);

        let mut first = shop_manager(dir.path(), &client, 0);
        first.load_list(false).await.unwrap();

        client.remove_file("srv/lists/shopversion.txt");
        let mut second = shop_manager(dir.path(), &client, 0);
        let err = second.load_list(false).await.unwrap_err();
        assert_eq!(err.kind, ListLoadErrorKind::DownloadFailed);

        // Only the failed probe hit the wire; local files survived.
        assert_eq!(client.download_count(), 5);
        assert!(dir.path().join(SHOP_CATEGORY_FILE).exists());
        assert_eq!(second.last_outcome().unwrap().state, LoadState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_transport_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);
        client.set_stalled(true);

        let mut manager = shop_manager(dir.path(), &client, 0);
        let err = manager.load_list(false).await.unwrap_err();

        assert_eq!(err.kind, ListLoadErrorKind::DownloadTimeout);
        assert!(err.is_retryable());
        let outcome = manager.last_outcome().unwrap();
        assert_eq!(outcome.state, LoadState::TimedOut);
        assert_eq!(outcome.files_fetched, 0);
    }

    #[tokio::test]
    async fn test_transport_failure_recorded_in_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        client.set_failure(TransferError::connection_failed("host unreachable"));

        let mut manager = shop_manager(dir.path(), &client, 0);
        let err = manager.load_list(false).await.unwrap_err();
        assert_eq!(err.kind, ListLoadErrorKind::DownloadFailed);
        assert!(err.is_retryable());

        let outcome = manager.last_outcome().unwrap();
        assert_eq!(outcome.state, LoadState::Failed);
        assert!(outcome.error.as_deref().unwrap().contains("host unreachable"));
    }

    #[tokio::test]
    async fn test_delete_local_files_keeps_going_past_undeletable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on a file name defeats remove_file.
        tokio::fs::create_dir(dir.path().join(SHOP_CATEGORY_FILE))
            .await
            .unwrap();
        tokio::fs::write(dir.path().join(SHOP_PACKAGE_FILE), b"stale")
            .await
            .unwrap();

        let client = InMemoryTransferClient::new();
        let manager = shop_manager(dir.path(), &client, 0);
        manager.delete_local_files().await;

        assert!(dir.path().join(SHOP_CATEGORY_FILE).is_dir());
        assert!(!dir.path().join(SHOP_PACKAGE_FILE).exists());
    }

    #[tokio::test]
    async fn test_undeletable_file_does_not_abort_cycle() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join(SHOP_CATEGORY_FILE))
            .await
            .unwrap();

        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);

        // The squatting directory also defeats the download itself, but
        // the cycle must reach the transport instead of aborting on the
        // failed cleanup.
        let mut manager = shop_manager(dir.path(), &client, 0);
        let _ = manager.load_list(false).await;
        assert!(client.download_count() >= 1);
    }

    #[tokio::test]
    async fn test_script_cycle_resolves_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        client.seed_file("srv/lists/scriptlist.txt", "intro.txt\nquest_*.txt\nend\n");
        client.seed_file("srv/lists/scriptversion.txt", "7\nend\n");
        client.seed_file("srv/lists/quest_01.txt", b"q1".to_vec());
        client.seed_file("srv/lists/quest_02.txt", b"q2".to_vec());

        let mut manager = ListManager::new(
            test_config(dir.path()),
            client.clone() as Arc<dyn FileTransferClient>,
            ListContentLoader::script_list(),
        )
        .unwrap();

        let outcome = manager.load_list(false).await.unwrap();
        assert_eq!(outcome.state, LoadState::Completed);
        assert_eq!(outcome.files_fetched, 2);
        assert_eq!(outcome.remote_version.unwrap().sequence, 7);
        assert_eq!(
            manager.loader().script_files().unwrap(),
            &["intro.txt", "quest_01.txt", "quest_02.txt"]
        );
        assert!(dir.path().join(SCRIPT_LIST_FILE).exists());
        assert!(dir.path().join(SCRIPT_VERSION_FILE).exists());
    }

    #[tokio::test]
    async fn test_configure_clears_cached_state() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);

        let mut manager = shop_manager(dir.path(), &client, 0);
        manager.load_list(false).await.unwrap();
        assert!(manager.remote_version().is_some());

        manager.configure(test_config(dir.path())).unwrap();
        assert!(manager.remote_version().is_none());
        assert!(manager.last_outcome().is_none());

        let err = manager.configure(ListManagerConfig::default()).unwrap_err();
        assert_eq!(err.kind, ListLoadErrorKind::InvalidConfig);
    }

    #[tokio::test]
    async fn test_outcome_serializes_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let client = InMemoryTransferClient::new();
        seed_shop_remote(&client, 3);

        let mut manager = shop_manager(dir.path(), &client, 0);
        let outcome = manager.load_list(false).await.unwrap();

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["state"], "completed");
        assert_eq!(value["filesFetched"], 4);
        assert!(value["attemptId"].is_string());
        assert!(value["remoteVersion"]["sequence"].is_number());
        assert!(value["error"].is_null());
    }
}
