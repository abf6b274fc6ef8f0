//! Selection loader driven by a Tokio runtime with paused time.

#![cfg(feature = "tokio")]

use std::time::Duration;

use lattice_selection::{LoadPhase, RowCollection, RowId, SelectionLoader};
use lattice_selection_core::TokioScheduler;

const DELAY: Duration = Duration::from_secs(1);

fn setup() -> (SelectionLoader<TokioScheduler>, RowId, RowId) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("lattice_selection=debug")
        .with_test_writer()
        .try_init();

    let mut rows = RowCollection::new();
    let a = rows.push(1);
    let b = rows.push(42);
    (SelectionLoader::new(rows, TokioScheduler::current(), DELAY), a, b)
}

#[tokio::test(start_paused = true)]
async fn test_load_completes_after_delay() {
    let (loader, a, _) = setup();

    loader.select(a);
    tokio::time::sleep(Duration::from_millis(999)).await;
    assert_eq!(loader.phase(), LoadPhase::Loading(a));

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(loader.phase(), LoadPhase::Loaded(a, 1));

    loader.detail_updated(99);
    loader.deselect();
    assert_eq!(loader.row(a).map(|row| row.count), Some(99));
}

#[tokio::test(start_paused = true)]
async fn test_superseded_load_is_never_observed() {
    let (loader, a, b) = setup();

    loader.select(a);
    tokio::time::sleep(Duration::from_millis(500)).await;
    loader.select(b);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(loader.phase(), LoadPhase::Loading(b));
    assert_eq!(loader.row(a).map(|row| row.count), Some(1));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(loader.phase(), LoadPhase::Loaded(b, 42));
}

#[tokio::test(start_paused = true)]
async fn test_deselect_cancels_pending_load() {
    let (loader, a, _) = setup();

    loader.select(a);
    loader.deselect();
    tokio::time::sleep(DELAY * 3).await;

    assert_eq!(loader.phase(), LoadPhase::Empty);
    assert!(!loader.has_pending_load());
}
