//! Typed per-method request bodies
//!
//! The wire accepts an open-ended JSON mapping; this module pins each
//! method to an enumerated option set validated at the boundary.
//! Unrecognized top-level fields are collected for forward compatibility
//! and ignored, not rejected.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::protocol::action::Action;

/// Deserialize an optional boolean, rejecting string-encoded booleans.
///
/// `"true"`/`"false"` as JSON strings are a caller error: silent
/// coercion would mask a latent bug on the caller side.
pub(crate) fn strict_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::String(s) => Err(de::Error::custom(format!(
            "expected a JSON boolean, got string {:?} (string-encoded booleans are rejected)",
            s
        ))),
        other => Err(de::Error::custom(format!(
            "expected a JSON boolean, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extraction rules: caller-chosen result key to CSS selector
pub type ExtractRules = BTreeMap<String, String>;

/// Body of a `session` call.
///
/// No `session` field creates a session; `session` plus `stop=true`
/// closes one; `session` alone pings it (keep-alive touch).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Existing session id to stop or ping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,

    /// Stop the referenced session
    #[serde(
        default,
        deserialize_with = "strict_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop: Option<bool>,

    /// Inactivity tolerance in seconds before the session is reclaimed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<u64>,

    /// Block heavy page resources (images, media)
    #[serde(
        default,
        deserialize_with = "strict_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub block_resources: Option<bool>,

    /// Geo tag for proxy selection (e.g. "rs-fr")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_country: Option<String>,

    /// Unrecognized fields, kept for forward compatibility
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Body of a `navigate` call.
///
/// Loads `url` (if given), runs `actions` in order, applies `extract`,
/// then attaches page HTML when `content` is true. A missing `session`
/// implicitly opens one, subject to the same admission control.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigateRequest {
    /// Session to pin the call to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,

    /// URL to load before running actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Open the URL in a new tab
    #[serde(
        rename = "newTab",
        default,
        deserialize_with = "strict_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub new_tab: Option<bool>,

    /// Attach full page HTML to the response
    #[serde(
        default,
        deserialize_with = "strict_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<bool>,

    /// Ordered action sequence to run after navigation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,

    /// Extraction rules applied after the actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractRules>,

    /// Include debug artifacts (step log, screenshots) in the envelope
    #[serde(
        default,
        deserialize_with = "strict_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub debug: Option<bool>,

    /// Unrecognized fields, kept for forward compatibility
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Body of an `interact` call: actions and extraction without navigation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractRequest {
    /// Session to pin the call to (required)
    pub session: String,

    /// Ordered action sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,

    /// Extraction rules applied after the actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractRules>,

    /// Include debug artifacts in the envelope
    #[serde(
        default,
        deserialize_with = "strict_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub debug: Option<bool>,

    /// Unrecognized fields, kept for forward compatibility
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Body of a `data` call: extraction and/or content from the current page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataRequest {
    /// Session to pin the call to (required)
    pub session: String,

    /// Extraction rules evaluated against the current page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractRules>,

    /// Attach full page HTML to the response
    #[serde(
        default,
        deserialize_with = "strict_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<bool>,

    /// Include debug artifacts in the envelope
    #[serde(
        default,
        deserialize_with = "strict_opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub debug: Option<bool>,

    /// Unrecognized fields, kept for forward compatibility
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Body of a `screenshot` or `pdf` call (binary response)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureRequest {
    /// Session to pin the call to (required)
    pub session: String,

    /// Clip the capture to the first element matching this selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,

    /// Unrecognized fields, kept for forward compatibility
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}
