//! # ticklist store
//!
//! SQLite-backed local persistence for ticklist.
//!
//! This crate provides:
//! - The [`DataStore`] trait every storage variant implements
//! - [`LocalStore`], the plain single-connection SQLite implementation
//! - Schema creation and in-place column migration for pre-sync databases
//! - The append-only change log and single-row-per-key sync metadata
//! - Startup integrity repair for orphaned tasks
//!
//! The store is network-unaware. The sync layer in `ticklist_sync` wraps a
//! [`LocalStore`] and uses [`DataStore::log_change`] plus the metadata
//! operations to discover what changed since the last sync.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod local;
mod schema;
mod store;

pub use error::{StoreError, StoreResult};
pub use local::LocalStore;
pub use store::DataStore;

/// Metadata key holding the unix timestamp of the last successful sync.
pub const META_LAST_SYNC_TIME: &str = "last_sync_time";

/// Metadata key holding the persisted device identifier.
pub const META_DEVICE_ID: &str = "device_id";
