//! Integration tests for the runtime facade.
//!
//! Timer-driven tests run on a paused clock so tick counts are exact.

use core_async::sync::{broadcast, watch, CancellationToken};
use core_async::{task, time};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let ticks = Arc::clone(&count);
    (count, move || {
        ticks.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    assert_eq!(handle.await.unwrap(), 42);
}

#[tokio::test(start_paused = true)]
async fn test_periodic_first_tick_after_one_period() {
    let token = CancellationToken::new();
    let (count, on_tick) = counter();
    let _handle = task::spawn_periodic(time::Duration::from_secs(1), token.clone(), on_tick);

    time::sleep(time::Duration::from_millis(999)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    time::sleep(time::Duration::from_millis(2)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    time::sleep(time::Duration::from_secs(2)).await;
    assert_eq!(count.load(Ordering::SeqCst), 3);
    token.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_periodic_stops_on_cancel() {
    let token = CancellationToken::new();
    let (count, on_tick) = counter();
    let handle = task::spawn_periodic(time::Duration::from_millis(100), token.clone(), on_tick);

    time::sleep(time::Duration::from_millis(350)).await;
    token.cancel();
    handle.await.unwrap();
    let after_cancel = count.load(Ordering::SeqCst);
    assert_eq!(after_cancel, 3);

    time::sleep(time::Duration::from_secs(1)).await;
    assert_eq!(count.load(Ordering::SeqCst), after_cancel);
}

#[tokio::test(start_paused = true)]
async fn test_periodic_stops_when_guard_dropped() {
    let token = CancellationToken::new();
    let (count, on_tick) = counter();
    let handle = task::spawn_periodic(time::Duration::from_millis(100), token.clone(), on_tick);
    let guard = token.drop_guard();

    time::sleep(time::Duration::from_millis(150)).await;
    drop(guard);
    handle.await.unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_elapses() {
    let result = time::timeout(
        time::Duration::from_millis(10),
        time::sleep(time::Duration::from_secs(1)),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_watch_keeps_latest_value() {
    let (tx, mut rx) = watch::channel(0u32);
    tx.send_replace(1);
    tx.send_replace(2);

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), 2);
}

#[tokio::test]
async fn test_broadcast_reports_lag() {
    let (tx, mut rx) = broadcast::channel(2);
    for i in 0..4 {
        tx.send(i).unwrap();
    }

    assert!(matches!(
        rx.recv().await,
        Err(broadcast::error::RecvError::Lagged(2))
    ));
    assert_eq!(rx.recv().await.unwrap(), 2);
}
