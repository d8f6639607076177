//! Fetch service: open a byte stream for an HTTP(S) URI.
//!
//! [`HttpFetcher`] is the production implementation backed by a blocking
//! `ureq` agent. [`MockFetcher`] serves canned responses from memory and
//! records every request, for tests that must not touch the network.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default `User-Agent` header sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("tempfetch/", env!("CARGO_PKG_VERSION"));

/// A source of remote bytes.
pub trait Fetcher: Send + Sync {
    /// Open `uri` and return a reader over the response body.
    ///
    /// Blocks until the response headers arrive. The body is streamed as
    /// the reader is consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] for non-2xx answers, [`Error::Transport`]
    /// for connection or protocol failures and [`Error::InvalidSource`]
    /// when the URI is not http(s).
    fn open(&self, uri: &str) -> Result<Box<dyn Read>>;
}

/// Reject anything that is not an http:// or https:// URI.
///
/// The scheme is matched case-sensitively: `HTTPS://` is rejected.
pub fn check_http_uri(uri: &str) -> Result<()> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::InvalidSource(uri.to_string()))
    }
}

/// Blocking HTTP(S) fetcher.
///
/// No retries and no timeout are configured here; a failed request is
/// reported to the caller as-is.
pub struct HttpFetcher {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Value of the `User-Agent` header.
    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher with the default user agent.
    #[must_use]
    pub fn new() -> Self {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Create a fetcher sending a custom `User-Agent`.
    #[must_use]
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            user_agent: user_agent.into(),
        }
    }

    /// Get the configured user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn open(&self, uri: &str) -> Result<Box<dyn Read>> {
        check_http_uri(uri)?;
        log::debug!("GET {uri}");

        let response = self
            .agent
            .get(uri)
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|e| Error::from_ureq(uri, e))?;

        log::debug!("{uri} answered {}", response.status());
        Ok(Box::new(response.into_body().into_reader()))
    }
}

/// Canned answer served by [`MockFetcher`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with this body.
    Body(Vec<u8>),
    /// Non-success status.
    Status(u16),
    /// Connection-level failure with this message.
    Transport(String),
    /// 200, but the connection drops after these bytes.
    Truncated(Vec<u8>),
}

/// Body that yields its bytes and then fails like a reset connection.
struct TruncatedBody {
    head: Cursor<Vec<u8>>,
}

impl Read for TruncatedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.head.read(buf)? {
            0 => Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )),
            n => Ok(n),
        }
    }
}

/// In-memory fetcher for tests.
///
/// Clones share the same responses and request log, so a test can keep
/// one handle for assertions after moving another into the code under
/// test.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new mock with no responses configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `uri`.
    pub fn add_body(&self, uri: impl Into<String>, body: impl Into<Vec<u8>>) {
        lock(&self.responses).insert(uri.into(), MockResponse::Body(body.into()));
    }

    /// Answer `uri` with an HTTP status error.
    pub fn add_status(&self, uri: impl Into<String>, status: u16) {
        lock(&self.responses).insert(uri.into(), MockResponse::Status(status));
    }

    /// Fail `uri` with a transport error.
    pub fn add_transport_error(&self, uri: impl Into<String>, message: impl Into<String>) {
        lock(&self.responses).insert(uri.into(), MockResponse::Transport(message.into()));
    }

    /// Serve `head` for `uri`, then fail mid-body.
    pub fn add_truncated_body(&self, uri: impl Into<String>, head: impl Into<Vec<u8>>) {
        lock(&self.responses).insert(uri.into(), MockResponse::Truncated(head.into()));
    }

    /// URIs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }
}

impl Fetcher for MockFetcher {
    fn open(&self, uri: &str) -> Result<Box<dyn Read>> {
        check_http_uri(uri)?;
        lock(&self.requests).push(uri.to_string());

        match lock(&self.responses).get(uri).cloned() {
            Some(MockResponse::Body(body)) => Ok(Box::new(Cursor::new(body))),
            Some(MockResponse::Status(status)) => Err(Error::Status {
                uri: uri.to_string(),
                status,
            }),
            Some(MockResponse::Transport(message)) => Err(Error::Transport {
                uri: uri.to_string(),
                message,
            }),
            Some(MockResponse::Truncated(head)) => Ok(Box::new(TruncatedBody {
                head: Cursor::new(head),
            })),
            None => Err(Error::Transport {
                uri: uri.to_string(),
                message: "mock response not configured".to_string(),
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
