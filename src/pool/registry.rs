//! Worker pool implementation
//!
//! A bounded set of worker slots, each holding at most one session.
//! All slot accounting runs under a single mutual-exclusion domain so
//! concurrent open/close/expire events cannot race.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::{BackendFactory, BackendOptions};
use crate::config::Config;
use crate::pool::worker::{SessionOptions, SessionWorker};
use crate::{Error, Result};

/// Bounded pool of session workers
pub struct WorkerPool {
    limit: usize,
    default_keep_alive: Duration,
    max_keep_alive: Duration,
    default_block_resources: bool,
    factory: BackendFactory,
    workers: Mutex<HashMap<String, Arc<SessionWorker>>>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("limit", &self.limit)
            .field("occupancy", &self.occupancy())
            .finish()
    }
}

impl WorkerPool {
    /// Create a new pool with the given slot limit
    pub fn new(
        limit: usize,
        default_keep_alive: Duration,
        max_keep_alive: Duration,
        default_block_resources: bool,
        factory: BackendFactory,
    ) -> Self {
        Self {
            limit,
            default_keep_alive,
            max_keep_alive,
            default_block_resources,
            factory,
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// Create a pool from server configuration
    pub fn from_config(config: &Config, factory: BackendFactory) -> Self {
        Self::new(
            config.max_workers,
            Duration::from_secs(config.default_keep_alive),
            Duration::from_secs(config.max_keep_alive),
            config.block_resources,
            factory,
        )
    }

    /// Create a pool backed by mock page backends, for testing
    pub fn mock(limit: usize) -> Self {
        Self::new(
            limit,
            Duration::from_secs(30),
            Duration::from_secs(300),
            true,
            Arc::new(|options: BackendOptions| {
                Ok(Arc::new(crate::backend::MockPageBackend::with_options(options))
                    as Arc<dyn crate::backend::PageBackend>)
            }),
        )
    }

    /// Open a session, occupying one worker slot.
    ///
    /// Expired slots are reclaimed first; if the pool is still
    /// saturated the call is rejected without queuing and without
    /// consuming a slot.
    pub fn open(&self, options: SessionOptions) -> Result<Arc<SessionWorker>> {
        let mut workers = self
            .workers
            .lock()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

        let reclaimed = Self::reap_locked(&mut workers);
        Self::release_backends(reclaimed);

        if workers.len() >= self.limit {
            return Err(Error::concurrency_limit(format!(
                "all {} worker slots are occupied",
                self.limit
            )));
        }

        let keep_alive = options
            .keep_alive
            .unwrap_or(self.default_keep_alive)
            .min(self.max_keep_alive);

        let backend_options = BackendOptions {
            block_resources: options
                .block_resources
                .unwrap_or(self.default_block_resources),
            proxy_country: options.proxy_country,
        };

        let backend = (self.factory)(backend_options)?;

        let id = uuid::Uuid::new_v4().to_string();
        let worker = Arc::new(SessionWorker::new(id.clone(), keep_alive, backend));
        workers.insert(id.clone(), worker.clone());

        debug!(
            session = %id,
            keep_alive_secs = keep_alive.as_secs_f64(),
            occupancy = workers.len(),
            "session opened"
        );

        Ok(worker)
    }

    /// Look up a session and restart its keep-alive window.
    ///
    /// A session past its keep-alive is reclaimed here and reported as
    /// not found; expiry is monotonic and indistinguishable from an
    /// explicit stop.
    pub fn acquire(&self, id: &str) -> Result<Arc<SessionWorker>> {
        let mut workers = self
            .workers
            .lock()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

        let worker = match workers.get(id) {
            None => return Err(Error::session_not_found(id)),
            Some(worker) => worker.clone(),
        };

        if worker.is_expired() {
            workers.remove(id);
            worker.mark_expired();
            debug!(session = %id, "session expired on access");
            Self::release_backends(vec![worker]);
            return Err(Error::session_not_found(id));
        }

        worker.touch()?;
        Ok(worker)
    }

    /// Release a session's slot.
    ///
    /// Idempotent: closing an unknown or already-closed session is not
    /// an error. Returns the removed worker so the caller can release
    /// its backend.
    pub fn close(&self, id: &str) -> Result<Option<Arc<SessionWorker>>> {
        let removed = self
            .workers
            .lock()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .remove(id);

        if let Some(worker) = &removed {
            worker.mark_closed();
            debug!(session = %id, "session closed");
        }

        Ok(removed)
    }

    /// Remove every session, returning them for backend cleanup.
    ///
    /// Used at server shutdown.
    pub fn drain(&self) -> Result<Vec<Arc<SessionWorker>>> {
        let mut workers = self
            .workers
            .lock()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

        let drained: Vec<Arc<SessionWorker>> = workers.drain().map(|(_, w)| w).collect();
        for worker in &drained {
            worker.mark_closed();
        }
        Ok(drained)
    }

    /// Reclaim all expired sessions, returning them for backend cleanup
    pub fn sweep(&self) -> Result<Vec<Arc<SessionWorker>>> {
        let mut workers = self
            .workers
            .lock()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

        Ok(Self::reap_locked(&mut workers))
    }

    /// Number of occupied slots
    pub fn occupancy(&self) -> usize {
        self.workers.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Configured slot limit
    pub fn limit(&self) -> usize {
        self.limit
    }

    fn reap_locked(workers: &mut HashMap<String, Arc<SessionWorker>>) -> Vec<Arc<SessionWorker>> {
        let expired: Vec<String> = workers
            .iter()
            .filter(|(_, worker)| worker.is_expired())
            .map(|(id, _)| id.clone())
            .collect();

        let mut reclaimed = Vec::new();
        for id in expired {
            if let Some(worker) = workers.remove(&id) {
                worker.mark_expired();
                debug!(session = %id, "session reclaimed by keep-alive expiry");
                reclaimed.push(worker);
            }
        }
        reclaimed
    }

    /// Close reclaimed backends off the lock path
    fn release_backends(workers: Vec<Arc<SessionWorker>>) {
        for worker in workers {
            let backend = worker.backend();
            let id = worker.id().to_string();
            tokio::spawn(async move {
                if let Err(e) = backend.close().await {
                    warn!(session = %id, "failed to release backend: {}", e);
                }
            });
        }
    }
}
