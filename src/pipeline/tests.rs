//! Action pipeline tests

use super::executor::{run, PipelineCall};
use crate::backend::{MockPage, MockPageBackend, PageBackend};
use crate::protocol::{Action, CaptchaType, ExtractRules};
use crate::Error;

fn form_page() -> MockPage {
    MockPage::new("<html><body><form><input name=q><button id=go>Go</button></form></body></html>")
        .with_text("#go", "Go")
        .with_text("input[name=q]", "")
        .with_text("h1.result", "Results")
}

fn rules(pairs: &[(&str, &str)]) -> ExtractRules {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_navigate_then_actions_then_extraction() {
    let backend = MockPageBackend::new().with_page("https://demo.test/", form_page());

    let actions = vec![
        Action::Type {
            element: "input[name=q]".to_string(),
            text: "rust".to_string(),
        },
        Action::Click {
            element: "#go".to_string(),
        },
    ];
    let extract = rules(&[("heading", "h1.result")]);

    let outcome = run(
        &backend,
        PipelineCall {
            url: Some("https://demo.test/"),
            actions: &actions,
            extract: Some(&extract),
            want_content: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Actions ran in order against the loaded page
    assert_eq!(backend.typed().len(), 1);
    assert_eq!(backend.clicked(), vec!["#go".to_string()]);

    // One result entry per action, in submission order
    assert_eq!(outcome.actions.len(), 2);
    assert_eq!(outcome.actions[0].action, "type");
    assert_eq!(outcome.actions[1].action, "click");
    assert!(outcome.actions.iter().all(|a| a.ok));

    let data = outcome.data.unwrap();
    assert_eq!(data["heading"][0].text, "Results");
    assert!(outcome.content.unwrap().contains("form"));
}

#[tokio::test]
async fn test_failed_action_is_recorded_and_execution_continues() {
    let backend = MockPageBackend::new().with_page("https://demo.test/", form_page());

    let actions = vec![
        Action::Click {
            element: "#does-not-exist".to_string(),
        },
        Action::Click {
            element: "#go".to_string(),
        },
    ];

    let outcome = run(
        &backend,
        PipelineCall {
            url: Some("https://demo.test/"),
            actions: &actions,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.actions.len(), 2);
    assert!(!outcome.actions[0].ok);
    assert!(outcome.actions[0]
        .error
        .as_deref()
        .unwrap()
        .contains("#does-not-exist"));
    // The second action still ran
    assert!(outcome.actions[1].ok);
    assert_eq!(backend.clicked(), vec!["#go".to_string()]);
}

#[tokio::test]
async fn test_navigation_failure_aborts_the_call() {
    let backend = MockPageBackend::new().strict();

    let actions = vec![Action::Click {
        element: "#go".to_string(),
    }];

    let result = run(
        &backend,
        PipelineCall {
            url: Some("https://unreachable.test/"),
            actions: &actions,
            ..Default::default()
        },
    )
    .await;

    assert!(matches!(result, Err(Error::NavigationFailed(_))));
    // No action ran after the failed navigation
    assert!(backend.clicked().is_empty());
}

#[tokio::test]
async fn test_interact_style_call_skips_navigation() {
    let backend = MockPageBackend::new().with_page("https://demo.test/", form_page());
    backend.navigate("https://demo.test/", false).await.unwrap();

    let actions = vec![Action::SolveCaptcha {
        captcha_type: Some(CaptchaType::Turnstile),
    }];

    let outcome = run(
        &backend,
        PipelineCall {
            url: None,
            actions: &actions,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.actions.len(), 1);
    assert!(outcome.actions[0].ok);
    assert_eq!(
        backend.captchas_solved(),
        vec![Some("turnstile".to_string())]
    );
    // Page stayed where the previous call left it
    assert_eq!(backend.current_url().as_deref(), Some("https://demo.test/"));
}

#[tokio::test]
async fn test_unmatched_extraction_rule_yields_empty_list() {
    let backend = MockPageBackend::new().with_page("https://demo.test/", form_page());

    let extract = rules(&[("missing", ".no-such-thing"), ("heading", "h1.result")]);
    let outcome = run(
        &backend,
        PipelineCall {
            url: Some("https://demo.test/"),
            extract: Some(&extract),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let data = outcome.data.unwrap();
    assert!(data["missing"].is_empty());
    assert_eq!(data["heading"].len(), 1);
}

#[tokio::test]
async fn test_debug_mode_collects_log_and_screenshots() {
    let shot = b"frame at failure".to_vec();
    let backend = MockPageBackend::new()
        .with_page("https://demo.test/", form_page())
        .with_screenshot(shot.clone());

    let actions = vec![
        Action::Click {
            element: "#go".to_string(),
        },
        Action::Click {
            element: "#broken".to_string(),
        },
    ];

    let outcome = run(
        &backend,
        PipelineCall {
            url: Some("https://demo.test/"),
            actions: &actions,
            debug: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(outcome.log.iter().any(|l| l.contains("navigated")));
    assert!(outcome.log.iter().any(|l| l.contains("action 2/2")));
    assert_eq!(outcome.screenshot.as_deref(), Some(shot.as_slice()));

    // Only the failed action carries a step screenshot
    assert!(outcome.actions[0].debug_screenshot.is_none());
    assert!(outcome.actions[1].debug_screenshot.is_some());
}

#[tokio::test]
async fn test_empty_action_sequence_produces_no_entries() {
    let backend = MockPageBackend::new().with_page("https://demo.test/", form_page());

    let outcome = run(
        &backend,
        PipelineCall {
            url: Some("https://demo.test/"),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(outcome.actions.is_empty());
    assert!(outcome.data.is_none());
    assert!(outcome.content.is_none());
}

#[tokio::test]
async fn test_wait_action_passes_duration_through() {
    let backend = MockPageBackend::new().with_page("https://demo.test/", form_page());

    let actions = vec![Action::Wait { seconds: 2.5 }];
    let outcome = run(
        &backend,
        PipelineCall {
            url: Some("https://demo.test/"),
            actions: &actions,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(outcome.actions[0].ok);
    assert_eq!(backend.waits(), vec![2.5]);
}
