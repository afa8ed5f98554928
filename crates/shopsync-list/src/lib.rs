//! # ShopSync – List
//!
//! Shop-list download & parse pipeline providing:
//!   • Version-manifest freshness checks with sequence-ordered markers
//!   • Deadline-bounded download cycles with abandoned-worker timeout
//!   • Best-effort cleanup of stale local list files
//!   • Script-manifest expansion into an ordered script file set
//!   • Category / package / product parsing with atomic list replacement
//!   • Encoding detection (UTF-8 BOM vs legacy ANSI) with EUC-KR fallback

pub mod list;
