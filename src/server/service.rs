//! HTTP service implementation
//!
//! One POST route multiplexes every operation: the path selects the
//! method, the `key` query parameter authenticates, and the JSON body
//! carries the typed per-method options.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::pipeline::{self, PipelineCall, PipelineOutcome};
use crate::pool::{SessionOptions, SessionWorker, WorkerPool};
use crate::protocol::envelope::encode_artifact;
use crate::protocol::{
    CaptureRequest, DataRequest, Envelope, InteractRequest, Method, NavigateRequest,
    SessionRequest,
};
use crate::{Error, Result};

/// Shared service state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Worker pool backing all sessions
    pub pool: Arc<WorkerPool>,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create service state from a pool and configuration
    pub fn new(pool: Arc<WorkerPool>, config: Arc<Config>) -> Self {
        Self { pool, config }
    }
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{method}", post(dispatch))
        .with_state(state)
}

async fn dispatch(
    State(state): State<AppState>,
    Path(method): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let started = Instant::now();

    let result = handle(&state, &method, &query, &body).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(response) => {
            info!(method = %method, elapsed_ms, "request completed");
            response
        }
        Err(e) => {
            warn!(method = %method, elapsed_ms, status = %e.status_code(), "request failed: {}", e);
            e.into_response()
        }
    }
}

pub(crate) async fn handle(
    state: &AppState,
    method: &str,
    query: &HashMap<String, String>,
    body: &[u8],
) -> Result<Response> {
    authorize(&state.config, query)?;

    let method: Method = method.parse()?;

    match method {
        Method::Session => handle_session(state, parse_body(method, body)?).await,
        Method::Navigate => handle_navigate(state, parse_body(method, body)?).await,
        Method::Interact => handle_interact(state, parse_body(method, body)?).await,
        Method::Data => handle_data(state, parse_body(method, body)?).await,
        Method::Screenshot => handle_screenshot(state, parse_body(method, body)?).await,
        Method::Pdf => handle_pdf(state, parse_body(method, body)?).await,
    }
}

/// Check the API key attached as a query parameter
pub(crate) fn authorize(config: &Config, query: &HashMap<String, String>) -> Result<()> {
    match query.get("key") {
        Some(key) if *key == config.api_key => Ok(()),
        Some(_) => Err(Error::unauthorized("wrong API key")),
        None => Err(Error::unauthorized("missing API key")),
    }
}

/// Parse a request body into its typed per-method form.
///
/// An empty body is treated as an empty option mapping. Validation
/// errors (including string-encoded booleans) surface as 400s with the
/// offending method named.
pub(crate) fn parse_body<T: DeserializeOwned>(method: Method, body: &[u8]) -> Result<T> {
    let body = if body.is_empty() { b"{}" } else { body };

    serde_json::from_slice(body)
        .map_err(|e| Error::invalid_option(format!("{} request: {}", method, e)))
}

async fn handle_session(state: &AppState, request: SessionRequest) -> Result<Response> {
    if let Some(id) = request.session {
        if request.stop.unwrap_or(false) {
            if let Some(worker) = state.pool.close(&id)? {
                release_backend(&worker).await;
            }
            return Ok(envelope_json(Envelope {
                session: Some(id),
                ..Default::default()
            }));
        }

        // Bare session reference: keep-alive ping
        let worker = state.pool.acquire(&id)?;
        return Ok(envelope_json(Envelope {
            session: Some(worker.id().to_string()),
            ..Default::default()
        }));
    }

    let worker = state.pool.open(SessionOptions {
        keep_alive: request.keep_alive.map(Duration::from_secs),
        block_resources: request.block_resources,
        proxy_country: request.proxy_country,
    })?;

    Ok(envelope_json(Envelope {
        session: Some(worker.id().to_string()),
        ..Default::default()
    }))
}

async fn handle_navigate(state: &AppState, request: NavigateRequest) -> Result<Response> {
    let worker = match &request.session {
        Some(id) => state.pool.acquire(id)?,
        None => {
            // A session-less navigate opens a session implicitly,
            // subject to the same admission control
            let worker = state.pool.open(SessionOptions::default())?;
            debug!(session = %worker.id(), "session opened implicitly by navigate");
            worker
        }
    };

    let backend = worker.backend();
    let _guard = worker.lock_for_call().await;

    let actions = request.actions.as_deref().unwrap_or(&[]);
    let outcome = pipeline::run(
        backend.as_ref(),
        PipelineCall {
            url: request.url.as_deref(),
            new_tab: request.new_tab.unwrap_or(false),
            actions,
            extract: request.extract.as_ref(),
            want_content: request.content.unwrap_or(false),
            debug: request.debug.unwrap_or(false),
        },
    )
    .await?;

    Ok(envelope_json(outcome_envelope(&worker, outcome)))
}

async fn handle_interact(state: &AppState, request: InteractRequest) -> Result<Response> {
    let worker = state.pool.acquire(&request.session)?;

    let backend = worker.backend();
    let _guard = worker.lock_for_call().await;

    let actions = request.actions.as_deref().unwrap_or(&[]);
    let outcome = pipeline::run(
        backend.as_ref(),
        PipelineCall {
            url: None,
            new_tab: false,
            actions,
            extract: request.extract.as_ref(),
            want_content: false,
            debug: request.debug.unwrap_or(false),
        },
    )
    .await?;

    Ok(envelope_json(outcome_envelope(&worker, outcome)))
}

async fn handle_data(state: &AppState, request: DataRequest) -> Result<Response> {
    let worker = state.pool.acquire(&request.session)?;

    let backend = worker.backend();
    let _guard = worker.lock_for_call().await;

    let outcome = pipeline::run(
        backend.as_ref(),
        PipelineCall {
            url: None,
            new_tab: false,
            actions: &[],
            extract: request.extract.as_ref(),
            want_content: request.content.unwrap_or(false),
            debug: request.debug.unwrap_or(false),
        },
    )
    .await?;

    Ok(envelope_json(outcome_envelope(&worker, outcome)))
}

async fn handle_screenshot(state: &AppState, request: CaptureRequest) -> Result<Response> {
    let worker = state.pool.acquire(&request.session)?;

    let backend = worker.backend();
    let _guard = worker.lock_for_call().await;

    let bytes = backend.screenshot(request.element.as_deref()).await?;
    Ok(binary_response("image/png", bytes))
}

async fn handle_pdf(state: &AppState, request: CaptureRequest) -> Result<Response> {
    let worker = state.pool.acquire(&request.session)?;

    let backend = worker.backend();
    let _guard = worker.lock_for_call().await;

    let bytes = backend.pdf().await?;
    Ok(binary_response("application/pdf", bytes))
}

/// Assemble the response envelope for a pipeline outcome
fn outcome_envelope(worker: &Arc<SessionWorker>, outcome: PipelineOutcome) -> Envelope {
    let PipelineOutcome {
        actions,
        data,
        content,
        log,
        screenshot,
    } = outcome;

    Envelope {
        session: Some(worker.id().to_string()),
        data,
        content,
        actions: (!actions.is_empty()).then_some(actions),
        debug_log: (!log.is_empty()).then_some(log),
        debug_screenshot: screenshot.map(|bytes| encode_artifact(&bytes)),
    }
}

fn envelope_json(envelope: Envelope) -> Response {
    Json(envelope).into_response()
}

fn binary_response(content_type: &'static str, data: Vec<u8>) -> Response {
    (
        [(header::CONTENT_TYPE, content_type)],
        bytes::Bytes::from(data),
    )
        .into_response()
}

async fn release_backend(worker: &Arc<SessionWorker>) {
    if let Err(e) = worker.backend().close().await {
        warn!(session = %worker.id(), "failed to release backend: {}", e);
    }
}

/// Background task reclaiming expired sessions
pub async fn sweep_loop(pool: Arc<WorkerPool>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match pool.sweep() {
            Ok(reclaimed) => {
                if !reclaimed.is_empty() {
                    info!(
                        reclaimed = reclaimed.len(),
                        occupancy = pool.occupancy(),
                        "keep-alive sweep reclaimed sessions"
                    );
                }
                for worker in reclaimed {
                    release_backend(&worker).await;
                }
            }
            Err(e) => warn!("keep-alive sweep failed: {}", e),
        }
    }
}
