//! # shopsync-transfer — File Transfer Seam
//!
//! The shop-list pipeline never speaks a wire protocol itself; it drives a
//! `FileTransferClient` and lets the backend decide how bytes move.
//!
//! Architecture:
//! - `types` — transport modes, targets, credentials, listing entries
//! - `error` — categorised transfer error type
//! - `client` — the `FileTransferClient` trait + backend factory
//! - `dir_client` — directory-copy backend (generic mode)
//! - `memory` — in-memory simulated backend (tests & offline demos)

pub mod types;
pub mod error;
pub mod client;
pub mod dir_client;
pub mod memory;

// Re-exports for lib.rs consumers
pub use types::*;
pub use error::{TransferError, TransferErrorKind, TransferResult};
pub use client::{create_transfer_client, FileTransferClient};
pub use dir_client::DirTransferClient;
pub use memory::InMemoryTransferClient;
