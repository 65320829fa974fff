//! Worker pool lifecycle tests
//!
//! Exercises admission control, keep-alive expiry, and idempotent close
//! directly against the pool, with millisecond keep-alives to stay fast.

use std::sync::Arc;
use std::time::Duration;

use super::registry::WorkerPool;
use super::worker::{SessionOptions, WorkerState};
use crate::Error;

fn short_lived(keep_alive_ms: u64) -> SessionOptions {
    SessionOptions {
        keep_alive: Some(Duration::from_millis(keep_alive_ms)),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_open_and_acquire_within_keep_alive() {
    let pool = WorkerPool::mock(2);

    let worker = pool.open(short_lived(500)).unwrap();
    assert_eq!(worker.state(), WorkerState::Occupied);
    assert_eq!(pool.occupancy(), 1);

    let again = pool.acquire(worker.id()).unwrap();
    assert_eq!(again.id(), worker.id());
}

#[tokio::test]
async fn test_acquire_unknown_session() {
    let pool = WorkerPool::mock(2);
    let result = pool.acquire("no-such-session");
    assert!(matches!(result, Err(Error::SessionNotFound(_))));
}

#[tokio::test]
async fn test_keep_alive_expiry_is_monotonic() {
    let pool = WorkerPool::mock(2);
    let worker = pool.open(short_lived(50)).unwrap();
    let id = worker.id().to_string();

    tokio::time::sleep(Duration::from_millis(80)).await;

    // First access past the window expires the session...
    let result = pool.acquire(&id);
    assert!(matches!(result, Err(Error::SessionNotFound(_))));
    assert_eq!(worker.state(), WorkerState::Expired);
    assert_eq!(pool.occupancy(), 0);

    // ...and it never un-expires
    let result = pool.acquire(&id);
    assert!(matches!(result, Err(Error::SessionNotFound(_))));
}

#[tokio::test]
async fn test_activity_restarts_keep_alive_window() {
    let pool = WorkerPool::mock(1);
    let worker = pool.open(short_lived(100)).unwrap();
    let id = worker.id().to_string();

    // Touch the session repeatedly; total elapsed time exceeds the
    // window but idle time never does.
    for _ in 0..4 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        pool.acquire(&id).unwrap();
    }
}

#[tokio::test]
async fn test_saturated_pool_rejects_without_consuming_a_slot() {
    let pool = WorkerPool::mock(2);

    let _a = pool.open(short_lived(1000)).unwrap();
    let _b = pool.open(short_lived(1000)).unwrap();
    assert_eq!(pool.occupancy(), 2);

    let result = pool.open(short_lived(1000));
    assert!(matches!(result, Err(Error::ConcurrencyLimitExceeded(_))));
    // Rejection did not consume a slot
    assert_eq!(pool.occupancy(), 2);

    let result = pool.open(short_lived(1000));
    assert!(matches!(result, Err(Error::ConcurrencyLimitExceeded(_))));
}

#[tokio::test]
async fn test_closing_a_session_frees_its_slot() {
    let pool = WorkerPool::mock(1);

    let worker = pool.open(short_lived(1000)).unwrap();
    assert!(matches!(
        pool.open(short_lived(1000)),
        Err(Error::ConcurrencyLimitExceeded(_))
    ));

    let removed = pool.close(worker.id()).unwrap();
    assert!(removed.is_some());
    assert_eq!(worker.state(), WorkerState::Closed);

    // A subsequent open succeeds
    let replacement = pool.open(short_lived(1000)).unwrap();
    assert_ne!(replacement.id(), worker.id());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let pool = WorkerPool::mock(1);
    let worker = pool.open(short_lived(1000)).unwrap();
    let id = worker.id().to_string();

    assert!(pool.close(&id).unwrap().is_some());
    // Second close of the same id is not an error
    assert!(pool.close(&id).unwrap().is_none());
    // Closing a session that never existed is not an error either
    assert!(pool.close("never-existed").unwrap().is_none());
}

#[tokio::test]
async fn test_expired_slot_is_reclaimed_at_open() {
    let pool = WorkerPool::mock(1);
    let worker = pool.open(short_lived(50)).unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;

    // The expired slot frees up for the new session without an
    // intermediate sweep.
    let replacement = pool.open(short_lived(1000)).unwrap();
    assert_ne!(replacement.id(), worker.id());
    assert_eq!(pool.occupancy(), 1);
}

#[tokio::test]
async fn test_sweep_reclaims_only_expired_sessions() {
    let pool = WorkerPool::mock(4);
    let short_a = pool.open(short_lived(50)).unwrap();
    let short_b = pool.open(short_lived(50)).unwrap();
    let long = pool.open(short_lived(10_000)).unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;

    let reclaimed = pool.sweep().unwrap();
    let mut ids: Vec<&str> = reclaimed.iter().map(|w| w.id()).collect();
    ids.sort_unstable();
    let mut expected = vec![short_a.id(), short_b.id()];
    expected.sort_unstable();
    assert_eq!(ids, expected);

    assert_eq!(pool.occupancy(), 1);
    assert!(pool.acquire(long.id()).is_ok());
}

#[tokio::test]
async fn test_keep_alive_clamped_to_maximum() {
    let pool = WorkerPool::new(
        1,
        Duration::from_secs(30),
        Duration::from_secs(60),
        true,
        Arc::new(|options| {
            Ok(Arc::new(crate::backend::MockPageBackend::with_options(options))
                as Arc<dyn crate::backend::PageBackend>)
        }),
    );

    let worker = pool
        .open(SessionOptions {
            keep_alive: Some(Duration::from_secs(86_400)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(worker.keep_alive(), Duration::from_secs(60));
}

#[tokio::test]
async fn test_concurrent_opens_never_exceed_limit() {
    let pool = Arc::new(WorkerPool::mock(4));
    let mut handles = Vec::new();

    for _ in 0..16 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            pool.open(short_lived(1000)).is_ok()
        }));
    }

    let mut opened = 0;
    for handle in handles {
        if handle.await.unwrap() {
            opened += 1;
        }
    }

    assert_eq!(opened, 4);
    assert_eq!(pool.occupancy(), 4);
}

#[test]
fn test_session_options_propagate_to_backend() {
    tokio_test::block_on(async {
        let pool = WorkerPool::mock(1);
        let worker = pool
            .open(SessionOptions {
                keep_alive: Some(Duration::from_secs(5)),
                block_resources: Some(false),
                proxy_country: Some("rs-fr".to_string()),
            })
            .unwrap();

        // The mock backend records the options it was created with
        let debug = format!("{:?}", worker.backend());
        assert!(debug.contains("block_resources: false"));
        assert!(debug.contains("rs-fr"));
    });
}
