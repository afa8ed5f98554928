//! Content-loader variants.
//!
//! A list manager coordinates one download cycle; the loader decides
//! what the cycle is about. Two shapes exist: a script manifest that
//! resolves to a set of data files, and the shop catalog parsed into
//! typed lists. Variant dispatch keeps the cycle logic in one place.

use crate::list::catalog::{
    ShopListParser, SHOP_CATEGORY_FILE, SHOP_PACKAGE_FILE, SHOP_PRODUCT_FILE, SHOP_VERSION_FILE,
};
use crate::list::config::ListManagerConfig;
use crate::list::encoding::{decode_list_text, default_legacy_encoding};
use crate::list::error::{ListLoadError, ListResult};
use crate::list::script::{
    expand_manifest, parse_script_manifest, ScriptManifestEntry, SCRIPT_LIST_FILE,
    SCRIPT_VERSION_FILE,
};
use encoding_rs::Encoding;
use shopsync_transfer::transfer::FileTransferClient;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

// Version marker last: an interrupted batch must never leave a fresh
// version file over stale data files.
const SHOP_FILES: &[&str] = &[
    SHOP_CATEGORY_FILE,
    SHOP_PACKAGE_FILE,
    SHOP_PRODUCT_FILE,
    SHOP_VERSION_FILE,
];
const SCRIPT_FILES: &[&str] = &[SCRIPT_LIST_FILE, SCRIPT_VERSION_FILE];

// ─── Script list ─────────────────────────────────────────────────

/// Resolves a downloaded script manifest into a concrete file set.
pub struct ScriptListLoader {
    legacy: &'static Encoding,
    files: Vec<String>,
}

impl Default for ScriptListLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptListLoader {
    pub fn new() -> Self {
        Self {
            legacy: default_legacy_encoding(),
            files: Vec::new(),
        }
    }

    /// Override the code page assumed for BOM-less manifests.
    pub fn with_legacy_encoding(mut self, legacy: &'static Encoding) -> Self {
        self.legacy = legacy;
        self
    }

    /// Resolved file set, empty until the first load.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    fn clear(&mut self) {
        self.files.clear();
    }

    async fn load(
        &mut self,
        config: &ListManagerConfig,
        transfer: &Arc<dyn FileTransferClient>,
        refresh: bool,
    ) -> ListResult<()> {
        if !refresh && !self.files.is_empty() {
            return Ok(());
        }

        let path = config.local_file(SCRIPT_LIST_FILE);
        let display = path.display().to_string();
        let bytes = fs::read(&path)
            .await
            .map_err(|e| ListLoadError::from(e).with_path(display.clone()))?;
        let (text, _) = decode_list_text(&bytes, self.legacy);
        let entries = parse_script_manifest(&text).map_err(|e| e.with_path(display))?;

        // Patterns need the remote listing; literal-only manifests don't.
        let has_patterns = entries
            .iter()
            .any(|e| matches!(e, ScriptManifestEntry::Pattern(_)));
        let listing = if has_patterns {
            transfer
                .list_remote(&config.target(), &config.remote_path)
                .await?
        } else {
            Vec::new()
        };

        self.files = expand_manifest(&entries, &listing)?;
        log::info!("script manifest resolved to {} file(s)", self.files.len());
        Ok(())
    }
}

// ─── Shop list ───────────────────────────────────────────────────

/// Parses the shop catalog files into typed lists.
pub struct ShopListLoader {
    parser: ShopListParser,
    loaded: bool,
}

impl Default for ShopListLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ShopListLoader {
    pub fn new() -> Self {
        Self {
            parser: ShopListParser::new(),
            loaded: false,
        }
    }

    pub fn with_legacy_encoding(mut self, legacy: &'static Encoding) -> Self {
        self.parser = ShopListParser::new().with_legacy_encoding(legacy);
        self
    }

    pub fn parser(&self) -> &ShopListParser {
        &self.parser
    }

    async fn load(&mut self, config: &ListManagerConfig, refresh: bool) -> ListResult<()> {
        if self.loaded && !refresh {
            return Ok(());
        }
        self.parser.load_all(Path::new(&config.local_path)).await?;
        self.loaded = true;
        Ok(())
    }
}

// ─── Variant dispatch ────────────────────────────────────────────

/// The content shapes a list manager can coordinate.
pub enum ListContentLoader {
    ScriptList(ScriptListLoader),
    ShopList(ShopListLoader),
}

impl ListContentLoader {
    pub fn script_list() -> Self {
        Self::ScriptList(ScriptListLoader::new())
    }

    pub fn shop_list() -> Self {
        Self::ShopList(ShopListLoader::new())
    }

    /// Files one download batch fetches, in download order.
    pub fn file_names(&self) -> &'static [&'static str] {
        match self {
            Self::ScriptList(_) => SCRIPT_FILES,
            Self::ShopList(_) => SHOP_FILES,
        }
    }

    /// The version manifest for this content shape.
    pub fn version_file(&self) -> &'static str {
        match self {
            Self::ScriptList(_) => SCRIPT_VERSION_FILE,
            Self::ShopList(_) => SHOP_VERSION_FILE,
        }
    }

    /// Drop per-cycle state ahead of a fresh download batch. Parsed shop
    /// lists stay visible until the re-parse replaces them.
    pub fn reset_cycle(&mut self) {
        match self {
            Self::ScriptList(loader) => loader.clear(),
            Self::ShopList(loader) => loader.loaded = false,
        }
    }

    /// Parse the local files into this loader's content.
    ///
    /// With `refresh` unset, a loader that already holds content returns
    /// without touching the filesystem.
    pub async fn load_parsed_content(
        &mut self,
        config: &ListManagerConfig,
        transfer: &Arc<dyn FileTransferClient>,
        refresh: bool,
    ) -> ListResult<()> {
        match self {
            Self::ScriptList(loader) => loader.load(config, transfer, refresh).await,
            Self::ShopList(loader) => loader.load(config, refresh).await,
        }
    }

    /// Resolved script file set, `None` for the shop variant.
    pub fn script_files(&self) -> Option<&[String]> {
        match self {
            Self::ScriptList(loader) => Some(loader.files()),
            Self::ShopList(_) => None,
        }
    }

    /// Parsed shop catalog, `None` for the script variant.
    pub fn shop(&self) -> Option<&ShopListParser> {
        match self {
            Self::ShopList(loader) => Some(loader.parser()),
            Self::ScriptList(_) => None,
        }
    }
}
