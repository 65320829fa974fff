//! Mock page backend for testing
//!
//! This module provides a scriptable in-memory implementation of the
//! page backend traits for development and testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::backend::traits::{BackendOptions, MatchedElement, PageBackend};
use crate::Error;

// 1x1 transparent PNG
const DEFAULT_SCREENSHOT: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0x64,
    0xf8, 0xcf, 0x50, 0x0f, 0x00, 0x03, 0x86, 0x01, 0x80, 0x5a, 0x34, 0x7d, 0x6b, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

const DEFAULT_PDF: &[u8] = b"%PDF-1.4\n%mock courier-oxide capture\n%%EOF\n";

/// A scripted page the mock backend can serve
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    /// Page HTML returned by `content`
    pub html: String,
    /// Selector to matched elements
    pub selectors: HashMap<String, Vec<MatchedElement>>,
}

impl MockPage {
    /// Create a page with the given HTML
    pub fn new<S: Into<String>>(html: S) -> Self {
        Self {
            html: html.into(),
            selectors: HashMap::new(),
        }
    }

    /// Script a selector to match the given elements
    pub fn with_selector<S: Into<String>>(mut self, selector: S, nodes: Vec<MatchedElement>) -> Self {
        self.selectors.insert(selector.into(), nodes);
        self
    }

    /// Script a selector to match one text-only element
    pub fn with_text<S: Into<String>, T: Into<String>>(self, selector: S, text: T) -> Self {
        self.with_selector(
            selector,
            vec![MatchedElement {
                text: text.into(),
                value: None,
            }],
        )
    }
}

#[derive(Debug, Default)]
struct MockState {
    current_url: Option<String>,
    typed: Vec<(String, String)>,
    clicked: Vec<String>,
    waits: Vec<f64>,
    captchas_solved: Vec<Option<String>>,
}

/// Mock page backend
///
/// Permissive by default: navigating to an unscripted URL serves an
/// empty page. `strict` mode makes such navigations fail, which is how
/// tests exercise unreachable-URL behavior.
#[derive(Debug)]
pub struct MockPageBackend {
    options: BackendOptions,
    pages: Mutex<HashMap<String, MockPage>>,
    state: Mutex<MockState>,
    screenshot: Mutex<Vec<u8>>,
    pdf: Mutex<Vec<u8>>,
    strict: bool,
    fail_captcha: bool,
    closed: AtomicBool,
}

impl MockPageBackend {
    /// Create a new permissive mock backend
    pub fn new() -> Self {
        Self::with_options(BackendOptions::default())
    }

    /// Create a mock backend recording the given options
    pub fn with_options(options: BackendOptions) -> Self {
        Self {
            options,
            pages: Mutex::new(HashMap::new()),
            state: Mutex::new(MockState::default()),
            screenshot: Mutex::new(DEFAULT_SCREENSHOT.to_vec()),
            pdf: Mutex::new(DEFAULT_PDF.to_vec()),
            strict: false,
            fail_captcha: false,
            closed: AtomicBool::new(false),
        }
    }

    /// Fail navigation to URLs that were not scripted
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Make `solveCaptcha` report failure
    pub fn with_failing_captcha(mut self) -> Self {
        self.fail_captcha = true;
        self
    }

    /// Script a page for a URL
    pub fn with_page<S: Into<String>>(self, url: S, page: MockPage) -> Self {
        self.pages
            .lock()
            .expect("mock pages lock")
            .insert(url.into(), page);
        self
    }

    /// Set the bytes returned by `screenshot`
    pub fn with_screenshot(self, bytes: Vec<u8>) -> Self {
        *self.screenshot.lock().expect("mock screenshot lock") = bytes;
        self
    }

    /// Set the bytes returned by `pdf`
    pub fn with_pdf(self, bytes: Vec<u8>) -> Self {
        *self.pdf.lock().expect("mock pdf lock") = bytes;
        self
    }

    /// Options the backend was created with
    pub fn options(&self) -> &BackendOptions {
        &self.options
    }

    /// Selectors clicked so far, in order
    pub fn clicked(&self) -> Vec<String> {
        self.state.lock().expect("mock state lock").clicked.clone()
    }

    /// Text typed so far, as (selector, text) pairs in order
    pub fn typed(&self) -> Vec<(String, String)> {
        self.state.lock().expect("mock state lock").typed.clone()
    }

    /// Wait durations requested so far, in seconds
    pub fn waits(&self) -> Vec<f64> {
        self.state.lock().expect("mock state lock").waits.clone()
    }

    /// Captcha types solved so far, in order
    pub fn captchas_solved(&self) -> Vec<Option<String>> {
        self.state
            .lock()
            .expect("mock state lock")
            .captchas_solved
            .clone()
    }

    /// Whether `close` was called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(Error::backend("worker is closed"));
        }
        Ok(())
    }

    fn current_page(&self) -> Result<MockPage, Error> {
        let state = self.state.lock().map_err(lock_error)?;
        let url = state
            .current_url
            .clone()
            .ok_or_else(|| Error::backend("no page loaded"))?;
        let pages = self.pages.lock().map_err(lock_error)?;
        Ok(pages.get(&url).cloned().unwrap_or_default())
    }
}

impl Default for MockPageBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> Error {
    Error::internal(format!("Lock error: {}", e))
}

#[async_trait]
impl PageBackend for MockPageBackend {
    async fn navigate(&self, url: &str, _new_tab: bool) -> Result<(), Error> {
        self.ensure_open()?;

        let known = self.pages.lock().map_err(lock_error)?.contains_key(url);
        if !known {
            if self.strict {
                return Err(Error::navigation_failed(format!("cannot reach {}", url)));
            }
            self.pages
                .lock()
                .map_err(lock_error)?
                .insert(url.to_string(), MockPage::new("<html><body></body></html>"));
        }

        self.state.lock().map_err(lock_error)?.current_url = Some(url.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), Error> {
        self.ensure_open()?;

        let page = self.current_page()?;
        if !page.selectors.contains_key(selector) {
            return Err(Error::element_not_found(selector));
        }

        self.state
            .lock()
            .map_err(lock_error)?
            .clicked
            .push(selector.to_string());
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), Error> {
        self.ensure_open()?;

        let page = self.current_page()?;
        if !page.selectors.contains_key(selector) {
            return Err(Error::element_not_found(selector));
        }

        self.state
            .lock()
            .map_err(lock_error)?
            .typed
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn wait(&self, seconds: f64) -> Result<(), Error> {
        self.ensure_open()?;

        // Recorded but not slept, to keep tests fast
        self.state.lock().map_err(lock_error)?.waits.push(seconds);
        Ok(())
    }

    async fn solve_captcha(&self, captcha_type: Option<&str>) -> Result<(), Error> {
        self.ensure_open()?;

        if self.fail_captcha {
            return Err(Error::backend("captcha could not be solved"));
        }

        self.state
            .lock()
            .map_err(lock_error)?
            .captchas_solved
            .push(captcha_type.map(String::from));
        Ok(())
    }

    async fn query(&self, selector: &str) -> Result<Vec<MatchedElement>, Error> {
        self.ensure_open()?;

        let page = self.current_page()?;
        Ok(page.selectors.get(selector).cloned().unwrap_or_default())
    }

    async fn content(&self) -> Result<String, Error> {
        self.ensure_open()?;
        Ok(self.current_page()?.html)
    }

    async fn screenshot(&self, element: Option<&str>) -> Result<Vec<u8>, Error> {
        self.ensure_open()?;

        if let Some(selector) = element {
            let page = self.current_page()?;
            if !page.selectors.contains_key(selector) {
                return Err(Error::element_not_found(selector));
            }
        }

        Ok(self.screenshot.lock().map_err(lock_error)?.clone())
    }

    async fn pdf(&self) -> Result<Vec<u8>, Error> {
        self.ensure_open()?;
        Ok(self.pdf.lock().map_err(lock_error)?.clone())
    }

    async fn close(&self) -> Result<(), Error> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn current_url(&self) -> Option<String> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.current_url.clone())
    }
}
