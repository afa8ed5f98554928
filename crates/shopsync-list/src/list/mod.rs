//! # shopsync-list — Shop-List Download & Parse
//!
//! The cycle a game client runs to refresh its in-game shop: check the
//! remote version manifest, replace stale local list files within a
//! download deadline, and parse the result into typed lists.
//!
//! Architecture:
//! - `error` — list-load error taxonomy
//! - `version` — comparable version markers + manifest parsing
//! - `config` — list manager configuration
//! - `encoding` — UTF-8 / legacy ANSI probe and decode
//! - `records` — record tokenizer + shop record types
//! - `catalog` — the shop-list parser (categories, packages, products)
//! - `script` — script-manifest parsing and glob expansion
//! - `loader` — content-loader variants (script list vs shop list)
//! - `manager` — the download coordinator

pub mod error;
pub mod version;
pub mod config;
pub mod encoding;
pub mod records;
pub mod catalog;
pub mod script;
pub mod loader;
pub mod manager;

// Re-exports for lib.rs consumers
pub use error::{ListLoadError, ListLoadErrorKind, ListResult};
pub use version::VersionInfo;
pub use config::ListManagerConfig;
pub use encoding::FileEncoding;
pub use records::{CurrencyKind, ShopCategory, ShopPackage, ShopProduct};
pub use catalog::ShopListParser;
pub use loader::{ListContentLoader, ScriptListLoader, ShopListLoader};
pub use manager::{DownloadResult, ListManager, LoadOutcome, LoadState};
