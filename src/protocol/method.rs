//! Service method names and their wire properties

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Server operation selected by the request path.
///
/// Every call is `POST <base>/<method>?key=<api_key>` with a JSON body;
/// the method decides how the body is interpreted and whether the
/// response is a JSON envelope or raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Create, ping, or stop a session
    Session,
    /// Load a URL, then run actions and extraction
    Navigate,
    /// Run actions and extraction against the current page
    Interact,
    /// Extraction and page content only, no navigation or actions
    Data,
    /// Capture a screenshot (binary response)
    Screenshot,
    /// Capture a PDF (binary response)
    Pdf,
}

impl Method {
    /// Wire path segment for this method
    pub fn path(&self) -> &'static str {
        match self {
            Method::Session => "session",
            Method::Navigate => "navigate",
            Method::Interact => "interact",
            Method::Data => "data",
            Method::Screenshot => "screenshot",
            Method::Pdf => "pdf",
        }
    }

    /// Whether the response body is raw bytes instead of a JSON envelope
    pub fn is_binary(&self) -> bool {
        matches!(self, Method::Screenshot | Method::Pdf)
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session" | "configure" => Ok(Method::Session),
            "navigate" => Ok(Method::Navigate),
            "interact" => Ok(Method::Interact),
            "data" => Ok(Method::Data),
            "screenshot" => Ok(Method::Screenshot),
            "pdf" => Ok(Method::Pdf),
            other => Err(Error::unknown_method(other)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
