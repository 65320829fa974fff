//! Transport client
//!
//! Issues authenticated POSTs against the single-endpoint API and
//! decodes either a JSON envelope or raw bytes, depending on the
//! method. Non-2xx responses become typed transport errors classified
//! by status code.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::protocol::Method;
use crate::{Error, Result};

/// Undecoded response from one call
#[derive(Debug, Clone)]
pub enum RawResponse {
    /// JSON envelope (all non-binary methods)
    Json(Value),
    /// Raw bytes (`screenshot`, `pdf`)
    Binary(Bytes),
}

impl RawResponse {
    /// Unwrap the JSON form
    pub fn into_json(self) -> Result<Value> {
        match self {
            RawResponse::Json(value) => Ok(value),
            RawResponse::Binary(_) => Err(Error::internal(
                "expected a JSON envelope, got a binary response",
            )),
        }
    }

    /// Unwrap the binary form
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            RawResponse::Binary(bytes) => Ok(bytes),
            RawResponse::Json(_) => Err(Error::internal(
                "expected a binary response, got a JSON envelope",
            )),
        }
    }
}

/// HTTP transport for the service API
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Transport {
    /// Create a transport from client configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Client configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issue one call: `POST <base>/<method>?key=<api_key>`.
    ///
    /// The body is any serializable option mapping. Binary methods
    /// return the response bytes unparsed; everything else is parsed as
    /// JSON. A non-2xx status yields a typed error unless
    /// `raise_for_status` is off, in which case the error payload is
    /// handed back for inspection.
    pub async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        body: &B,
    ) -> Result<RawResponse> {
        let url = format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            method.path()
        );

        let started = Instant::now();
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| Error::http(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(
                method = %method,
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "API call failed"
            );

            let error = classify(status.as_u16(), text.clone());
            if self.config.raise_for_status {
                return Err(error);
            }

            warn!(method = %method, "transport error suppressed: {}", error);
            if method.is_binary() {
                return Ok(RawResponse::Binary(Bytes::from(text.into_bytes())));
            }
            let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Ok(RawResponse::Json(value));
        }

        if method.is_binary() {
            let bytes = response.bytes().await.map_err(|e| Error::http(e.to_string()))?;
            debug!(
                method = %method,
                elapsed_ms = started.elapsed().as_millis() as u64,
                bytes = bytes.len(),
                "API call completed"
            );
            return Ok(RawResponse::Binary(bytes));
        }

        let text = response.text().await.map_err(|e| Error::http(e.to_string()))?;
        debug!(
            method = %method,
            elapsed_ms = started.elapsed().as_millis() as u64,
            response = %truncate(&text, 256),
            "API call completed"
        );

        let value: Value = serde_json::from_str(&text)?;
        Ok(RawResponse::Json(value))
    }
}

/// Map a non-2xx status to its protocol error.
///
/// 404 and 429 are reserved by the service for missing sessions and
/// pool saturation respectively, so the status alone is enough.
pub(crate) fn classify(status: u16, body: String) -> Error {
    match status {
        401 => Error::Unauthorized(body),
        404 => Error::SessionNotFound(body),
        429 => Error::ConcurrencyLimitExceeded(body),
        _ => Error::Transport { status, body },
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
