//! Action pipeline executor
//!
//! Runs one navigate/interact call against a session's page:
//! `Idle -> Navigating (if url given) -> Action1 ... ActionN ->
//! ExtractionApplied -> Done`. Actions execute strictly in list order
//! with no intra-call parallelism; each runs against the page state the
//! previous one left behind.

use tracing::debug;

use crate::backend::PageBackend;
use crate::pipeline::extract;
use crate::protocol::envelope::encode_artifact;
use crate::protocol::{Action, ActionResult, ExtractRules, ExtractedData};
use crate::{Error, Result};

/// One pipeline invocation
#[derive(Debug, Clone, Default)]
pub struct PipelineCall<'a> {
    /// URL to load first; `None` for interact/data-style calls
    pub url: Option<&'a str>,

    /// Open the URL in a new tab
    pub new_tab: bool,

    /// Ordered action sequence
    pub actions: &'a [Action],

    /// Extraction rules applied after the actions
    pub extract: Option<&'a ExtractRules>,

    /// Attach full page HTML to the outcome
    pub want_content: bool,

    /// Collect step log and screenshots
    pub debug: bool,
}

/// What one pipeline run produced
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    /// Per-action results, mirroring the submitted order
    pub actions: Vec<ActionResult>,

    /// Extraction results, when rules were supplied
    pub data: Option<ExtractedData>,

    /// Page HTML, when requested
    pub content: Option<String>,

    /// Step log (debug mode)
    pub log: Vec<String>,

    /// Final page screenshot (debug mode)
    pub screenshot: Option<Vec<u8>>,
}

/// Execute one call against a session's page backend.
///
/// Navigation failure aborts the call; action failures do not. A failed
/// action is recorded in its result entry and execution continues with
/// the remaining actions, so callers always receive one entry per
/// submitted action in submission order.
pub async fn run(backend: &dyn PageBackend, call: PipelineCall<'_>) -> Result<PipelineOutcome> {
    let mut outcome = PipelineOutcome::default();

    if let Some(url) = call.url {
        backend
            .navigate(url, call.new_tab)
            .await
            .map_err(|e| match e {
                Error::NavigationFailed(_) => e,
                other => Error::navigation_failed(other.to_string()),
            })?;

        if call.debug {
            outcome.log.push(format!("navigated to {}", url));
        }
    }

    for (index, action) in call.actions.iter().enumerate() {
        let result = execute_action(backend, action).await;

        let mut entry = match result {
            Ok(()) => ActionResult::ok(action.kind()),
            Err(e) => ActionResult::failed(action.kind(), e.to_string()),
        };

        if call.debug {
            outcome.log.push(format!(
                "action {}/{} {}: {}",
                index + 1,
                call.actions.len(),
                action.kind(),
                if entry.ok { "ok" } else { "failed" }
            ));

            // A failure screenshot helps diagnose what the page looked
            // like at this step
            if !entry.ok {
                if let Ok(bytes) = backend.screenshot(None).await {
                    entry.debug_screenshot = Some(encode_artifact(&bytes));
                }
            }
        }

        debug!(
            index,
            action = action.kind(),
            ok = entry.ok,
            "pipeline action executed"
        );

        outcome.actions.push(entry);
    }

    if let Some(rules) = call.extract {
        let data = extract::apply(backend, rules).await?;
        if call.debug {
            outcome
                .log
                .push(format!("extracted {} rule(s)", data.len()));
        }
        outcome.data = Some(data);
    }

    if call.want_content {
        outcome.content = Some(backend.content().await?);
    }

    if call.debug {
        match backend.screenshot(None).await {
            Ok(bytes) => outcome.screenshot = Some(bytes),
            Err(e) => outcome.log.push(format!("debug screenshot failed: {}", e)),
        }
    }

    Ok(outcome)
}

async fn execute_action(backend: &dyn PageBackend, action: &Action) -> Result<()> {
    match action {
        Action::Click { element } => backend.click(element).await,
        Action::Type { element, text } => backend.type_text(element, text).await,
        Action::Wait { seconds } => backend.wait(*seconds).await,
        Action::SolveCaptcha { captcha_type } => {
            backend
                .solve_captcha(captcha_type.map(|t| t.as_str()))
                .await
        }
    }
}
