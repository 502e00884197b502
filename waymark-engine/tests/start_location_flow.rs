//! Integration test for the start-location preference across a full
//! acquire → confirm → persist → restart cycle.

use std::sync::Arc;
use std::time::Duration;

use waymark_domain::{Coordinate, PositionFix};
use waymark_engine::{EngineConfig, ModeKind, Session};
use waymark_gateways::{StubDialog, StubGeolocation, StubMapView};
use waymark_store::{keys, MemoryKvStore};

struct Harness {
    kv: Arc<MemoryKvStore>,
    sensor: Arc<StubGeolocation>,
    view: Arc<StubMapView>,
    dialog: Arc<StubDialog>,
    session: Session,
}

async fn boot(kv: Arc<MemoryKvStore>) -> Harness {
    let sensor = Arc::new(StubGeolocation::new());
    let view = Arc::new(StubMapView::new());
    let dialog = Arc::new(StubDialog::new());
    let session = Session::bootstrap(
        EngineConfig::default(),
        kv.clone(),
        sensor.clone(),
        view.clone(),
        dialog.clone(),
    )
    .await;
    Harness {
        kv,
        sensor,
        view,
        dialog,
        session,
    }
}

fn fix(lat: f64, lng: f64) -> PositionFix {
    PositionFix::new(Coordinate::new(lat, lng).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_affirmative_answer_drives_the_next_startup_viewport() {
    let kv = Arc::new(MemoryKvStore::new());

    // First run: a one-shot fix, answered "yes please"
    let first = boot(kv.clone()).await;
    first.sensor.push_position(fix(51.5, -0.12));
    first.dialog.push_confirm(true);

    first.session.locator().locate().await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(first.dialog.confirm_count(), 1);
    let raw = first.kv.raw(keys::START_AT_LAST_LOCATION).unwrap();
    assert_eq!(raw["startHere"], true);
    assert_eq!(raw["latlng"]["lat"], 51.5);
    first.session.shutdown().await;

    // Restart: the initial viewport is the remembered fix, before any
    // acquisition happens
    let second = boot(kv).await;
    let (center, zoom) = second.view.last_viewport().unwrap();
    assert_eq!(center.lat, 51.5);
    assert_eq!(center.lng, -0.12);
    assert_eq!(zoom, 12.0);

    // And later fixes never re-prompt
    second.sensor.push_position(fix(48.0, 2.0));
    second.session.locator().locate().await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(second.dialog.confirm_count(), 0);
    assert!(second.session.preference().start_at_last_location());

    second.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_negative_answer_keeps_default_viewport_and_asks_next_session() {
    let kv = Arc::new(MemoryKvStore::new());

    let first = boot(kv.clone()).await;
    first.sensor.push_position(fix(51.5, -0.12));
    first.dialog.push_confirm(false);

    first.session.locator().locate().await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    let raw = first.kv.raw(keys::START_AT_LAST_LOCATION).unwrap();
    assert_eq!(raw["startHere"], false);
    first.session.shutdown().await;

    // Restart: default viewport, and a declined preference is asked again
    let second = boot(kv).await;
    let (center, zoom) = second.view.last_viewport().unwrap();
    assert_eq!(center.lat, 42.9758025);
    assert_eq!(zoom, 13.25);

    second.sensor.push_position(fix(51.5, -0.12));
    second.dialog.push_confirm(false);
    second.session.locator().locate().await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(second.dialog.confirm_count(), 1);

    second.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_watch_fixes_share_the_one_shot_preference_flow() {
    let kv = Arc::new(MemoryKvStore::new());
    let h = boot(kv).await;
    h.dialog.push_confirm(true);

    h.session.locator().clone().listen().await;
    assert_eq!(h.session.locator().mode().await, ModeKind::Watching);

    h.sensor.inject_fix(fix(48.8566, 2.3522)).await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(h.dialog.confirm_count(), 1);
    let raw = h.kv.raw(keys::START_AT_LAST_LOCATION).unwrap();
    assert_eq!(raw["latlng"]["lng"], 2.3522);

    // Further watch fixes recenter but never re-prompt
    h.sensor.inject_fix(fix(48.86, 2.35)).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.dialog.confirm_count(), 1);
    assert_eq!(h.view.last_viewport().unwrap().0.lat, 48.86);

    h.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_interval_mode_prompts_once_per_session() {
    let kv = Arc::new(MemoryKvStore::new());
    let h = boot(kv).await;

    // Enough scripted fixes for several ticks, all answered "No"
    for _ in 0..4 {
        h.sensor.push_position(fix(51.5, -0.12));
    }
    h.dialog.push_confirm(false);

    h.session.locator().clone().listen_interval().await;
    tokio::time::sleep(Duration::from_secs(4)).await;

    // Every tick recentered, but only the first debounced fix prompted
    assert!(h.view.viewports().len() >= 4);
    assert_eq!(h.dialog.confirm_count(), 1);

    h.session.locator().stop_listening().await;
    h.session.shutdown().await;
}
