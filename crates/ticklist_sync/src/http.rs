//! HTTP client abstraction.
//!
//! The sync client talks to the network through the [`HttpClient`] trait so
//! transports can be swapped: [`UreqAgent`] in production, [`MockHttp`] in
//! tests. Transport failure (unreachable, timeout) is an `Err`; a reachable
//! server answering with any status is an `Ok` response carrying that
//! status.

use parking_lot::Mutex;
use std::time::Duration;

/// One request header as (name, value).
pub type Header = (String, String);

/// A minimal HTTP response: status code plus body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// Returns true for status 200, the only success the protocol knows.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Blocking HTTP client abstraction.
pub trait HttpClient: Send + Sync {
    /// Issues a GET request.
    fn get(&self, url: &str, headers: &[Header]) -> Result<HttpResponse, String>;

    /// Issues a POST request with a JSON body.
    fn post_json(&self, url: &str, headers: &[Header], body: &str)
        -> Result<HttpResponse, String>;
}

/// Production HTTP client backed by a `ureq` agent.
pub struct UreqAgent {
    agent: ureq::Agent,
}

impl UreqAgent {
    /// Creates an agent with the given per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    fn finish(result: Result<ureq::Response, ureq::Error>) -> Result<HttpResponse, String> {
        match result {
            Ok(response) => {
                let status = response.status();
                let body = response.into_string().map_err(|e| e.to_string())?;
                Ok(HttpResponse { status, body })
            }
            // Non-2xx statuses are responses, not transport failures.
            Err(ureq::Error::Status(status, response)) => Ok(HttpResponse {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(err) => Err(err.to_string()),
        }
    }
}

impl HttpClient for UreqAgent {
    fn get(&self, url: &str, headers: &[Header]) -> Result<HttpResponse, String> {
        let mut request = self.agent.get(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }
        Self::finish(request.call())
    }

    fn post_json(
        &self,
        url: &str,
        headers: &[Header],
        body: &str,
    ) -> Result<HttpResponse, String> {
        let mut request = self.agent.post(url).set("Content-Type", "application/json");
        for (name, value) in headers {
            request = request.set(name, value);
        }
        Self::finish(request.send_string(body))
    }
}

/// Behavior of one mocked endpoint: `Err` simulates a transport failure,
/// `Ok((status, body))` a server response.
type MockOutcome = Result<(u16, String), String>;

#[derive(Debug)]
struct MockState {
    health: MockOutcome,
    pull: MockOutcome,
    push: MockOutcome,
    health_calls: usize,
    pull_calls: usize,
    push_calls: usize,
    last_headers: Vec<Header>,
    last_pull_body: Option<String>,
    last_push_body: Option<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            health: Ok((200, String::new())),
            pull: Ok((200, r#"{"tasks":[],"lists":[]}"#.to_string())),
            push: Ok((200, String::new())),
            health_calls: 0,
            pull_calls: 0,
            push_calls: 0,
            last_headers: Vec::new(),
            last_pull_body: None,
            last_push_body: None,
        }
    }
}

/// A settable mock HTTP client for tests.
///
/// Routes by URL suffix: `/health`, `/sync/pull`, `/sync/push`. Defaults to
/// a healthy server with empty pull responses.
#[derive(Debug, Default)]
pub struct MockHttp {
    state: Mutex<MockState>,
}

impl MockHttp {
    /// Creates a mock answering 200 everywhere.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the health endpoint to answer with `status`.
    pub fn set_health_status(&self, status: u16) {
        self.state.lock().health = Ok((status, String::new()));
    }

    /// Makes the health endpoint unreachable.
    pub fn set_unreachable(&self) {
        let mut state = self.state.lock();
        state.health = Err("connection refused".into());
        state.pull = Err("connection refused".into());
        state.push = Err("connection refused".into());
    }

    /// Sets the pull endpoint response.
    pub fn set_pull_response(&self, status: u16, body: impl Into<String>) {
        self.state.lock().pull = Ok((status, body.into()));
    }

    /// Sets the push endpoint response.
    pub fn set_push_response(&self, status: u16, body: impl Into<String>) {
        self.state.lock().push = Ok((status, body.into()));
    }

    /// Number of health probes that reached the mock.
    pub fn health_calls(&self) -> usize {
        self.state.lock().health_calls
    }

    /// Number of pull requests that reached the mock.
    pub fn pull_calls(&self) -> usize {
        self.state.lock().pull_calls
    }

    /// Number of push requests that reached the mock.
    pub fn push_calls(&self) -> usize {
        self.state.lock().push_calls
    }

    /// Headers of the most recent request.
    pub fn last_headers(&self) -> Vec<Header> {
        self.state.lock().last_headers.clone()
    }

    /// Body of the most recent pull request.
    pub fn last_pull_body(&self) -> Option<String> {
        self.state.lock().last_pull_body.clone()
    }

    /// Body of the most recent push request.
    pub fn last_push_body(&self) -> Option<String> {
        self.state.lock().last_push_body.clone()
    }

    fn respond(outcome: &MockOutcome) -> Result<HttpResponse, String> {
        match outcome {
            Ok((status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            Err(err) => Err(err.clone()),
        }
    }
}

impl HttpClient for MockHttp {
    fn get(&self, url: &str, headers: &[Header]) -> Result<HttpResponse, String> {
        let mut state = self.state.lock();
        state.last_headers = headers.to_vec();
        if url.ends_with("/health") {
            state.health_calls += 1;
            Self::respond(&state.health)
        } else {
            Err(format!("unexpected GET {url}"))
        }
    }

    fn post_json(
        &self,
        url: &str,
        headers: &[Header],
        body: &str,
    ) -> Result<HttpResponse, String> {
        let mut state = self.state.lock();
        state.last_headers = headers.to_vec();
        if url.ends_with("/sync/pull") {
            state.pull_calls += 1;
            state.last_pull_body = Some(body.to_string());
            Self::respond(&state.pull)
        } else if url.ends_with("/sync/push") {
            state.push_calls += 1;
            state.last_push_body = Some(body.to_string());
            Self::respond(&state.push)
        } else {
            Err(format!("unexpected POST {url}"))
        }
    }
}
