//! Sync client: connectivity probing and the pull/push calls.

use crate::config::SyncSettings;
use crate::error::{SyncError, SyncResult};
use crate::http::{Header, HttpClient};
use crate::payload::{ListPayload, PullRequest, PullResponse, PushRequest, TaskPayload};
use parking_lot::RwLock;
use std::time::{Duration, Instant};
use ticklist_model::{Task, TodoList};
use tracing::debug;

/// How long a probe outcome stays cached before the next real request.
pub const PROBE_CACHE_TTL: Duration = Duration::from_secs(5);

/// Outcome of a connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// Server unreachable (transport error or timeout).
    Offline,
    /// Server reachable and healthy.
    Online,
    /// Server reachable but answering with a non-success status.
    Error,
}

#[derive(Debug)]
struct ProbeState {
    status: Connectivity,
    last_check: Option<Instant>,
    last_error: Option<String>,
}

/// Stateless-per-call HTTP client for the sync endpoints.
///
/// The only held state is the cached connectivity probe, guarded by a
/// read/write lock: status reads proceed concurrently, a probe result
/// takes the exclusive path.
pub struct SyncClient<C> {
    base_url: String,
    api_key: String,
    device_id: String,
    pub(crate) http: C,
    probe: RwLock<ProbeState>,
    probe_ttl: Duration,
}

impl<C: HttpClient> SyncClient<C> {
    /// Creates a client from settings and a transport.
    pub fn new(settings: &SyncSettings, http: C) -> Self {
        Self {
            base_url: settings.server_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            device_id: settings.device_id.clone(),
            http,
            probe: RwLock::new(ProbeState {
                status: Connectivity::Offline,
                last_check: None,
                last_error: None,
            }),
            probe_ttl: PROBE_CACHE_TTL,
        }
    }

    /// Overrides the probe cache TTL, mainly for tests.
    pub fn with_probe_ttl(mut self, ttl: Duration) -> Self {
        self.probe_ttl = ttl;
        self
    }

    fn auth_headers(&self) -> Vec<Header> {
        vec![
            ("Authorization".into(), format!("Bearer {}", self.api_key)),
            ("X-Device-ID".into(), self.device_id.clone()),
        ]
    }

    fn record_probe(&self, status: Connectivity, error: Option<String>) -> Connectivity {
        let mut probe = self.probe.write();
        probe.status = status;
        probe.last_error = error;
        probe.last_check = Some(Instant::now());
        status
    }

    /// Probes the health endpoint, reusing a cached outcome inside the TTL
    /// window so UI interactions do not hammer the network.
    pub fn check_connectivity(&self) -> Connectivity {
        {
            let probe = self.probe.read();
            if let Some(checked) = probe.last_check {
                if checked.elapsed() < self.probe_ttl {
                    return probe.status;
                }
            }
        }

        let url = format!("{}/health", self.base_url);
        match self.http.get(&url, &self.auth_headers()) {
            Ok(resp) if resp.is_success() => self.record_probe(Connectivity::Online, None),
            Ok(resp) => {
                debug!(status = resp.status, "health endpoint unhealthy");
                self.record_probe(
                    Connectivity::Error,
                    Some(format!("server returned status {}", resp.status)),
                )
            }
            Err(err) => {
                debug!(%err, "health endpoint unreachable");
                self.record_probe(Connectivity::Offline, Some(err))
            }
        }
    }

    /// Returns true when the last (possibly cached) probe saw a healthy
    /// server.
    pub fn is_online(&self) -> bool {
        self.check_connectivity() == Connectivity::Online
    }

    /// Returns the most recent probe error, if any.
    pub fn last_error(&self) -> Option<String> {
        self.probe.read().last_error.clone()
    }

    /// Pulls all remote changes after `since`.
    ///
    /// Fails fast with [`SyncError::NotConnected`] when the client is not
    /// currently online; there is no inline retry.
    pub fn pull(&self, since: i64) -> SyncResult<PullResponse> {
        if !self.is_online() {
            return Err(SyncError::NotConnected);
        }

        let body = serde_json::to_string(&PullRequest { since })?;
        let url = format!("{}/sync/pull", self.base_url);
        let resp = self
            .http
            .post_json(&url, &self.auth_headers(), &body)
            .map_err(SyncError::Transport)?;

        if !resp.is_success() {
            return Err(SyncError::Server {
                status: resp.status,
                body: resp.body,
            });
        }

        Ok(serde_json::from_str(&resp.body)?)
    }

    /// Pushes the full task and list collections in one request.
    pub fn push(&self, tasks: &[Task], lists: &[TodoList]) -> SyncResult<()> {
        if !self.is_online() {
            return Err(SyncError::NotConnected);
        }

        let request = PushRequest {
            tasks: tasks.iter().map(TaskPayload::from).collect(),
            lists: lists.iter().map(ListPayload::from).collect(),
        };
        let body = serde_json::to_string(&request)?;
        let url = format!("{}/sync/push", self.base_url);
        let resp = self
            .http
            .post_json(&url, &self.auth_headers(), &body)
            .map_err(SyncError::Transport)?;

        if !resp.is_success() {
            return Err(SyncError::Server {
                status: resp.status,
                body: resp.body,
            });
        }

        Ok(())
    }
}
