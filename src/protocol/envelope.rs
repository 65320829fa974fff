//! Response envelope and debug artifact decoding
//!
//! Every non-binary call returns a JSON envelope combining the logical
//! result with optional inline debug artifacts. `decode` splits the two:
//! application logic gets an envelope free of binary blobs, and the
//! artifacts travel through a side channel.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::protocol::action::ActionResult;
use crate::{Error, Result};

/// One element matched by an extraction rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedNode {
    /// Visible text content of the element
    pub text: String,

    /// Value attribute, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Extraction results: rule key to matched element records, in page order
pub type ExtractedData = BTreeMap<String, Vec<ExtractedNode>>;

/// JSON wrapper returned by every non-binary call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Session id, echoed or newly assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,

    /// Extraction results, present only if rules were supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractedData>,

    /// Full page HTML, present only if requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Per-action result records, mirroring submission order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionResult>>,

    /// Pipeline step log (debug mode)
    #[serde(rename = "debugLog", skip_serializing_if = "Option::is_none")]
    pub debug_log: Option<Vec<String>>,

    /// Base64 page screenshot (debug mode)
    #[serde(rename = "debugScreenshot", skip_serializing_if = "Option::is_none")]
    pub debug_screenshot: Option<String>,
}

/// Debug artifacts stripped out of an envelope
#[derive(Debug, Clone, Default)]
pub struct DebugArtifacts {
    /// Ordered step log lines
    pub log: Vec<String>,

    /// Decoded page screenshot bytes
    pub screenshot: Option<Vec<u8>>,

    /// Decoded per-action screenshots with their position in the
    /// submitted action sequence
    pub action_screenshots: Vec<(usize, Vec<u8>)>,
}

impl DebugArtifacts {
    /// Whether any artifact was present
    pub fn is_empty(&self) -> bool {
        self.log.is_empty() && self.screenshot.is_none() && self.action_screenshots.is_empty()
    }
}

/// Decode a base64 debug artifact into raw bytes
pub fn decode_artifact(b64: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(b64)
        .map_err(|e| Error::malformed_artifact(format!("invalid base64: {}", e)))
}

/// Encode raw bytes into a base64 debug artifact
pub fn encode_artifact(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Interpret a raw JSON response as an envelope and split out its
/// debug artifacts.
///
/// The returned envelope carries no inline blobs: `debugLog`,
/// `debugScreenshot` and per-action screenshots are moved into
/// [`DebugArtifacts`]. A malformed artifact is dropped with a warning;
/// it never fails the overall decode.
pub fn decode(raw: Value) -> Result<(Envelope, DebugArtifacts)> {
    let mut envelope: Envelope = serde_json::from_value(raw)?;
    let mut artifacts = DebugArtifacts::default();

    if let Some(log) = envelope.debug_log.take() {
        artifacts.log = log;
    }

    if let Some(b64) = envelope.debug_screenshot.take() {
        match decode_artifact(&b64) {
            Ok(bytes) => artifacts.screenshot = Some(bytes),
            Err(e) => warn!("dropping debug screenshot: {}", e),
        }
    }

    if let Some(actions) = envelope.actions.as_mut() {
        for (index, action) in actions.iter_mut().enumerate() {
            if let Some(b64) = action.debug_screenshot.take() {
                match decode_artifact(&b64) {
                    Ok(bytes) => artifacts.action_screenshots.push((index, bytes)),
                    Err(e) => warn!(index, "dropping action debug screenshot: {}", e),
                }
            }
        }
    }

    Ok((envelope, artifacts))
}
