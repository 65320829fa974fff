//! Page backend traits
//!
//! This module defines the abstract interface to the browser engine.
//! The engine itself (rendering, selector evaluation, captcha solving,
//! proxy acquisition) is an external collaborator reached only through
//! this seam.

use async_trait::async_trait;
use std::sync::Arc;

/// Options carried to the engine when a session's backend is created
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// Block heavy page resources (images, media)
    pub block_resources: bool,

    /// Geo tag for proxy selection (e.g. "rs-fr")
    pub proxy_country: Option<String>,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            block_resources: true,
            proxy_country: None,
        }
    }
}

/// One element matched by a selector query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchedElement {
    /// Visible text content
    pub text: String,

    /// Value attribute, when present
    pub value: Option<String>,
}

/// Page backend trait
///
/// Represents one browser worker holding one page state. All calls for
/// a session are serialized by the caller; implementations do not need
/// internal ordering guarantees.
#[async_trait]
pub trait PageBackend: Send + Sync + std::fmt::Debug {
    /// Load a URL, optionally in a new tab
    async fn navigate(&self, url: &str, new_tab: bool) -> Result<(), crate::Error>;

    /// Click the first element matching the selector
    async fn click(&self, selector: &str) -> Result<(), crate::Error>;

    /// Type text into the first element matching the selector
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), crate::Error>;

    /// Pause for a number of seconds
    async fn wait(&self, seconds: f64) -> Result<(), crate::Error>;

    /// Solve the captcha on the current page, blocking until resolved
    async fn solve_captcha(&self, captcha_type: Option<&str>) -> Result<(), crate::Error>;

    /// Query all elements matching the selector, in page order.
    ///
    /// A selector matching nothing yields an empty list, not an error.
    async fn query(&self, selector: &str) -> Result<Vec<MatchedElement>, crate::Error>;

    /// Get full page HTML
    async fn content(&self) -> Result<String, crate::Error>;

    /// Capture a screenshot, optionally clipped to one element
    async fn screenshot(&self, element: Option<&str>) -> Result<Vec<u8>, crate::Error>;

    /// Capture the current page as PDF
    async fn pdf(&self) -> Result<Vec<u8>, crate::Error>;

    /// Release engine resources held by this worker
    async fn close(&self) -> Result<(), crate::Error>;

    /// URL of the currently loaded page, if any
    fn current_url(&self) -> Option<String>;
}

/// Factory producing one backend per session
pub type BackendFactory =
    Arc<dyn Fn(BackendOptions) -> Result<Arc<dyn PageBackend>, crate::Error> + Send + Sync>;
