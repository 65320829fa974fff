//! Session handles and the high-level client
//!
//! A [`SessionHandle`] pins calls to one server-side session and owns
//! its lifecycle rules: expiry is terminal, close is idempotent, and
//! no retries happen under the hood.

use bytes::Bytes;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

use crate::client::artifacts::DebugSink;
use crate::client::transport::Transport;
use crate::config::ClientConfig;
use crate::protocol::{
    decode, Action, CaptureRequest, DataRequest, Envelope, ExtractRules, InteractRequest, Method,
    NavigateRequest, SessionRequest,
};
use crate::{Error, Result};

/// Options for opening a session
#[derive(Debug, Clone)]
pub struct OpenSessionOptions {
    /// Inactivity tolerance in seconds
    pub keep_alive: u64,

    /// Block heavy page resources (images, media)
    pub block_resources: Option<bool>,

    /// Geo tag for proxy selection
    pub proxy_country: Option<String>,
}

impl Default for OpenSessionOptions {
    fn default() -> Self {
        Self {
            keep_alive: 30,
            block_resources: None,
            proxy_country: None,
        }
    }
}

/// Options for a `navigate` call
#[derive(Debug, Clone, Default)]
pub struct NavigateOptions {
    /// URL to load before running actions
    pub url: Option<String>,

    /// Open the URL in a new tab
    pub new_tab: bool,

    /// Attach full page HTML to the result
    pub content: bool,

    /// Ordered action sequence to run after navigation
    pub actions: Vec<Action>,

    /// Extraction rules applied after the actions
    pub extract: Option<ExtractRules>,

    /// Request debug artifacts
    pub debug: bool,
}

impl NavigateOptions {
    /// Navigate to a URL with no actions or extraction
    pub fn to_url<S: Into<String>>(url: S) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }
}

/// Options for an `interact` call
#[derive(Debug, Clone, Default)]
pub struct InteractOptions {
    /// Ordered action sequence
    pub actions: Vec<Action>,

    /// Extraction rules applied after the actions
    pub extract: Option<ExtractRules>,

    /// Request debug artifacts
    pub debug: bool,
}

/// Options for a `data` call
#[derive(Debug, Clone, Default)]
pub struct DataOptions {
    /// Extraction rules evaluated against the current page
    pub extract: Option<ExtractRules>,

    /// Attach full page HTML to the result
    pub content: bool,

    /// Request debug artifacts
    pub debug: bool,
}

struct ClientInner {
    transport: Transport,
    sink: Option<Arc<dyn DebugSink>>,
}

/// High-level client for the service
#[derive(Clone)]
pub struct CourierClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for CourierClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourierClient")
            .field("api_url", &self.inner.transport.config().api_url)
            .field("sink_attached", &self.inner.sink.is_some())
            .finish()
    }
}

impl CourierClient {
    /// Create a client from configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport: Transport::new(config),
                sink: None,
            }),
        }
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    /// Attach a sink receiving decoded debug artifacts
    pub fn with_debug_sink(self, sink: Arc<dyn DebugSink>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport: self.inner.transport.clone(),
                sink: Some(sink),
            }),
        }
    }

    /// Transport in use
    pub fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    /// Open a session, occupying one worker slot.
    ///
    /// Fails with [`Error::ConcurrencyLimitExceeded`] when the pool has
    /// no free slot; back off before retrying, since the service never
    /// queues admissions.
    pub async fn open_session(&self, options: OpenSessionOptions) -> Result<SessionHandle> {
        let request = SessionRequest {
            keep_alive: Some(options.keep_alive),
            block_resources: options.block_resources,
            proxy_country: options.proxy_country,
            ..Default::default()
        };

        let raw = self
            .inner
            .transport
            .call(Method::Session, &request)
            .await?
            .into_json()?;
        let envelope = self.decode_envelope(None, raw)?;

        let id = envelope
            .session
            .ok_or_else(|| Error::internal("session call returned no session id"))?;

        Ok(SessionHandle {
            client: self.clone(),
            id,
            keep_alive: options.keep_alive,
            closed: AtomicBool::new(false),
        })
    }

    /// Session-less `navigate`: the service opens a session implicitly
    /// and the returned handle adopts it.
    pub async fn navigate(&self, options: NavigateOptions) -> Result<(SessionHandle, Envelope)> {
        let request = navigate_request(None, &options);
        let raw = self
            .inner
            .transport
            .call(Method::Navigate, &request)
            .await?
            .into_json()?;
        let envelope = self.decode_envelope(None, raw)?;

        let id = envelope
            .session
            .clone()
            .ok_or_else(|| Error::internal("navigate returned no session id"))?;

        let handle = SessionHandle {
            client: self.clone(),
            id,
            keep_alive: 0,
            closed: AtomicBool::new(false),
        };
        Ok((handle, envelope))
    }

    /// Decode a raw envelope and route its artifacts to the sink.
    ///
    /// Sink failures are logged, never propagated: losing a debug
    /// artifact must not fail the call that produced it.
    fn decode_envelope(&self, session_hint: Option<&str>, raw: Value) -> Result<Envelope> {
        let (envelope, artifacts) = decode(raw)?;

        if !artifacts.is_empty() {
            if let Some(sink) = &self.inner.sink {
                let session = envelope
                    .session
                    .as_deref()
                    .or(session_hint)
                    .unwrap_or("unknown-session");
                if let Err(e) = sink.store(session, &artifacts) {
                    warn!(session, "failed to store debug artifacts: {}", e);
                }
            }
        }

        Ok(envelope)
    }
}

fn navigate_request(session: Option<&str>, options: &NavigateOptions) -> NavigateRequest {
    NavigateRequest {
        session: session.map(String::from),
        url: options.url.clone(),
        new_tab: options.new_tab.then_some(true),
        content: options.content.then_some(true),
        actions: (!options.actions.is_empty()).then(|| options.actions.clone()),
        extract: options.extract.clone(),
        debug: options.debug.then_some(true),
        ..Default::default()
    }
}

/// Client-side representation of one server-side session.
///
/// Single-owner by contract: the handle serializes nothing, so
/// concurrent calls against the same id need caller-side coordination.
pub struct SessionHandle {
    client: CourierClient,
    id: String,
    keep_alive: u64,
    closed: AtomicBool,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("keep_alive", &self.keep_alive)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

impl SessionHandle {
    /// Server-assigned session id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Keep-alive budget declared at open, in seconds.
    ///
    /// Zero when the session was adopted from an implicit open and the
    /// budget is the server default.
    pub fn keep_alive(&self) -> u64 {
        self.keep_alive
    }

    /// Whether `close` completed on this handle
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::session_not_found(self.id.clone()));
        }
        Ok(())
    }

    /// Load a URL, then run actions and extraction
    pub async fn navigate(&self, options: NavigateOptions) -> Result<Envelope> {
        self.ensure_open()?;
        let request = navigate_request(Some(&self.id), &options);
        let raw = self
            .client
            .inner
            .transport
            .call(Method::Navigate, &request)
            .await?
            .into_json()?;
        self.client.decode_envelope(Some(&self.id), raw)
    }

    /// Run actions and extraction against the current page
    pub async fn interact(&self, options: InteractOptions) -> Result<Envelope> {
        self.ensure_open()?;
        let request = InteractRequest {
            session: self.id.clone(),
            actions: (!options.actions.is_empty()).then(|| options.actions.clone()),
            extract: options.extract.clone(),
            debug: options.debug.then_some(true),
            ..Default::default()
        };
        let raw = self
            .client
            .inner
            .transport
            .call(Method::Interact, &request)
            .await?
            .into_json()?;
        self.client.decode_envelope(Some(&self.id), raw)
    }

    /// Extraction and/or page content from the current page
    pub async fn data(&self, options: DataOptions) -> Result<Envelope> {
        self.ensure_open()?;
        let request = DataRequest {
            session: self.id.clone(),
            extract: options.extract.clone(),
            content: options.content.then_some(true),
            debug: options.debug.then_some(true),
            ..Default::default()
        };
        let raw = self
            .client
            .inner
            .transport
            .call(Method::Data, &request)
            .await?
            .into_json()?;
        self.client.decode_envelope(Some(&self.id), raw)
    }

    /// Capture a screenshot, optionally clipped to one element
    pub async fn screenshot(&self, element: Option<&str>) -> Result<Bytes> {
        self.ensure_open()?;
        let request = CaptureRequest {
            session: self.id.clone(),
            element: element.map(String::from),
            ..Default::default()
        };
        self.client
            .inner
            .transport
            .call(Method::Screenshot, &request)
            .await?
            .into_bytes()
    }

    /// Capture the current page as PDF
    pub async fn pdf(&self) -> Result<Bytes> {
        self.ensure_open()?;
        let request = CaptureRequest {
            session: self.id.clone(),
            element: None,
            ..Default::default()
        };
        self.client
            .inner
            .transport
            .call(Method::Pdf, &request)
            .await?
            .into_bytes()
    }

    /// Stop the session, releasing its worker slot.
    ///
    /// Idempotent: closing an already-closed or expired session is not
    /// an error.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let request = SessionRequest {
            session: Some(self.id.clone()),
            stop: Some(true),
            ..Default::default()
        };

        match self
            .client
            .inner
            .transport
            .call(Method::Session, &request)
            .await
        {
            Ok(_) => Ok(()),
            // An expired session is already gone; that is a clean close
            Err(Error::SessionNotFound(_)) => Ok(()),
            Err(e) => {
                // Transport-level failure: allow the caller to retry
                self.closed.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }
}
