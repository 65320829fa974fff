//! Session worker: one occupied slot pinning a page backend

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::backend::PageBackend;
use crate::Error;

/// Options requested by the caller at session creation
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Inactivity tolerance before the session is reclaimed
    pub keep_alive: Option<Duration>,

    /// Block heavy page resources (images, media)
    pub block_resources: Option<bool>,

    /// Geo tag for proxy selection
    pub proxy_country: Option<String>,
}

/// Lifecycle state of a worker slot.
///
/// A free slot is simply absent from the pool table; an entry is always
/// `Occupied` until it leaves the table as `Closed` or `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Slot holds an active session
    Occupied,
    /// Session was stopped explicitly
    Closed,
    /// Session was reclaimed after its keep-alive window elapsed
    Expired,
}

/// One worker slot occupied by a session.
///
/// Holds the session's backend and its keep-alive accounting. Calls
/// against one session are serialized through [`SessionWorker::gate`];
/// the pool itself never reorders them.
#[derive(Debug)]
pub struct SessionWorker {
    id: String,
    keep_alive: Duration,
    created_at: DateTime<Utc>,
    last_used: Mutex<Instant>,
    state: Mutex<WorkerState>,
    backend: Arc<dyn PageBackend>,
    gate: tokio::sync::Mutex<()>,
}

impl SessionWorker {
    /// Create a worker for a freshly opened session
    pub fn new(id: String, keep_alive: Duration, backend: Arc<dyn PageBackend>) -> Self {
        Self {
            id,
            keep_alive,
            created_at: Utc::now(),
            last_used: Mutex::new(Instant::now()),
            state: Mutex::new(WorkerState::Occupied),
            backend,
            gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Session id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared keep-alive window
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Server-side creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Backend driving this session's page
    pub fn backend(&self) -> Arc<dyn PageBackend> {
        self.backend.clone()
    }

    /// Serialize one call against this session.
    ///
    /// Held for the duration of a pipeline or capture so concurrent
    /// calls against the same session id execute one at a time.
    pub async fn lock_for_call(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    /// Record activity, restarting the keep-alive window
    pub fn touch(&self) -> Result<(), Error> {
        let mut last_used = self
            .last_used
            .lock()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        *last_used = Instant::now();
        Ok(())
    }

    /// Time since the last recorded activity
    pub fn idle_for(&self) -> Duration {
        self.last_used
            .lock()
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the keep-alive window has elapsed.
    ///
    /// Evaluated lazily against the last-use instant, so expiry holds
    /// even before the sweep task observes it, and never reverses.
    pub fn is_expired(&self) -> bool {
        self.state() == WorkerState::Occupied && self.idle_for() > self.keep_alive
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(WorkerState::Closed)
    }

    /// Transition out of the pool on explicit stop
    pub fn mark_closed(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = WorkerState::Closed;
        }
    }

    /// Transition out of the pool on keep-alive expiry
    pub fn mark_expired(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = WorkerState::Expired;
        }
    }
}
