//! # ShopSync – Transfer
//!
//! Transport seam for the shop-list download pipeline providing:
//!   • A transport-agnostic `FileTransferClient` trait (download + listing)
//!   • Per-call transfer targets with credentials and FTP service mode
//!   • A directory-copy backend for mounted / LAN sources (generic mode)
//!   • An in-memory simulated backend for unit tests and offline demos
//!   • Categorised, serialisable transfer errors

pub mod transfer;
