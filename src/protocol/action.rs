//! Declarative browser actions and their per-action results

use serde::{Deserialize, Serialize};

/// One declarative browser interaction step.
///
/// An ordered sequence of actions is attached to a `navigate` or
/// `interact` call and executed against the session's current page in
/// list order. Discriminated on the wire by the `action` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    /// Click the first element matching the selector
    Click {
        /// CSS selector of the target element
        element: String,
    },

    /// Type text into the first element matching the selector
    Type {
        /// CSS selector of the target element
        element: String,
        /// Text to type
        text: String,
    },

    /// Pause the pipeline for a number of seconds
    Wait {
        /// Seconds to wait
        seconds: f64,
    },

    /// Solve the captcha present on the current page.
    ///
    /// Blocks until resolved or reports failure in the action result;
    /// the session keep-alive is the outer bound.
    SolveCaptcha {
        #[serde(rename = "captchaType", skip_serializing_if = "Option::is_none")]
        captcha_type: Option<CaptchaType>,
    },
}

impl Action {
    /// Wire name of the action kind (echoed in results)
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Click { .. } => "click",
            Action::Type { .. } => "type",
            Action::Wait { .. } => "wait",
            Action::SolveCaptcha { .. } => "solveCaptcha",
        }
    }
}

/// Captcha flavor hint for `solveCaptcha`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptchaType {
    Turnstile,
    Recaptcha,
    Hcaptcha,
}

impl CaptchaType {
    /// Wire name of the captcha type
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptchaType::Turnstile => "turnstile",
            CaptchaType::Recaptcha => "recaptcha",
            CaptchaType::Hcaptcha => "hcaptcha",
        }
    }
}

/// Result record for one executed action.
///
/// Entries mirror the submitted action order positionally. Failures are
/// reported inline here, never as transport-level errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResult {
    /// Action kind echoed from the request
    pub action: String,

    /// Whether the action succeeded
    pub ok: bool,

    /// Failure description when `ok` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Base64 screenshot taken at this step (debug mode, on failure)
    #[serde(rename = "debugScreenshot", skip_serializing_if = "Option::is_none")]
    pub debug_screenshot: Option<String>,
}

impl ActionResult {
    /// Successful result for an action kind
    pub fn ok(kind: &str) -> Self {
        Self {
            action: kind.to_string(),
            ok: true,
            error: None,
            debug_screenshot: None,
        }
    }

    /// Failed result for an action kind
    pub fn failed<S: Into<String>>(kind: &str, error: S) -> Self {
        Self {
            action: kind.to_string(),
            ok: false,
            error: Some(error.into()),
            debug_screenshot: None,
        }
    }
}
