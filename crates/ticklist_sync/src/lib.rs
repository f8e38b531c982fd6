//! # ticklist sync
//!
//! Best-effort synchronization of a local ticklist store against a remote
//! server.
//!
//! This crate provides:
//! - JSON wire payloads for the pull/push protocol
//! - An HTTP transport abstraction with a production `ureq` implementation
//!   and a settable mock for tests
//! - [`SyncClient`]: connectivity probing with a short-TTL cache, plus the
//!   pull and push calls
//! - [`SyncStore`]: a decorator over the local store that appends
//!   change-log entries on every mutation, reconciles remote changes with
//!   last-writer-wins, and runs full pull-then-push sync cycles on demand,
//!   on mutation, and on a background timer
//! - Environment-driven sync configuration
//!
//! ## Sync model
//!
//! A full sync is one **pull-then-push** cycle:
//! 1. Pull everything the server saw after the last successful sync
//! 2. Merge inbound tasks with last-writer-wins (local wins ties)
//! 3. Push the full visible local state in one request
//! 4. Persist the new last-sync timestamp
//!
//! A pull failure aborts the cycle before any push; a push failure leaves
//! change-log entries pending for the next cycle. Local edits never block
//! on sync health: sync dispatch is fire-and-forget and failures surface
//! only through [`SyncStore::sync_status`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod conflict;
mod error;
mod http;
mod payload;
mod store;

pub use client::{Connectivity, SyncClient, PROBE_CACHE_TTL};
pub use config::SyncSettings;
pub use conflict::{apply_remote_fields, remote_wins, task_from_payload};
pub use error::{SyncError, SyncResult};
pub use http::{Header, HttpClient, HttpResponse, MockHttp, UreqAgent};
pub use payload::{ListPayload, PullRequest, PullResponse, PushRequest, TaskPayload};
pub use store::{SyncStatus, SyncStore};
