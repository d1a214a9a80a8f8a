// Behavioural tests for the batched preloader, driven by a scripted in-memory source.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use gallery_engine::config::PreloadConfig;
use gallery_engine::engine::preloader::Preloader;
use gallery_engine::engine::state::ResourceStatus;
use gallery_engine::source::traits::ImageSource;

/// A real 2x2 PNG, so `load` has something to decode.
fn png() -> &'static [u8] {
    static PNG: OnceLock<Vec<u8>> = OnceLock::new();
    PNG.get_or_init(|| {
        let mut buf = Cursor::new(Vec::new());
        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 128, 255, 255]))
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Start(String),
    End(String),
}

/// Source with per-url delay, failure and hang behaviour that records every fetch.
#[derive(Default)]
struct ScriptedSource {
    fail: HashSet<String>,
    hang: HashSet<String>,
    not_image: HashSet<String>,
    truncated: HashSet<String>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    events: Mutex<Vec<Event>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            default_delay: Duration::from_millis(10),
            ..Self::default()
        }
    }

    fn failing(mut self, ids: &[&str]) -> Self {
        self.fail.extend(ids.iter().map(|s| s.to_string()));
        self
    }

    fn hanging(mut self, ids: &[&str]) -> Self {
        self.hang.extend(ids.iter().map(|s| s.to_string()));
        self
    }

    fn not_image(mut self, ids: &[&str]) -> Self {
        self.not_image.extend(ids.iter().map(|s| s.to_string()));
        self
    }

    fn truncated(mut self, ids: &[&str]) -> Self {
        self.truncated.extend(ids.iter().map(|s| s.to_string()));
        self
    }

    fn delayed(mut self, ids: &[&str], delay: Duration) -> Self {
        for id in ids {
            self.delays.insert(id.to_string(), delay);
        }
        self
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Start(id) => Some(id),
                Event::End(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl ImageSource for ScriptedSource {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        self.events.lock().push(Event::Start(url.to_string()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.hang.contains(url) {
            std::future::pending::<()>().await;
        }

        let delay = self.delays.get(url).copied().unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.events.lock().push(Event::End(url.to_string()));

        if self.fail.contains(url) {
            return Err(anyhow!("simulated network error"));
        }
        if self.not_image.contains(url) {
            return Ok(Bytes::from_static(b"<html>not found</html>"));
        }
        if self.truncated.contains(url) {
            let data = png();
            return Ok(Bytes::copy_from_slice(&data[..data.len() / 2]));
        }
        Ok(Bytes::from_static(png()))
    }
}

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn config(batch_size: usize) -> PreloadConfig {
    PreloadConfig::with_batch_size(batch_size)
}

fn position(events: &[Event], wanted: &Event) -> usize {
    events
        .iter()
        .position(|e| e == wanted)
        .unwrap_or_else(|| panic!("missing event {:?}", wanted))
}

/// Every load of batch i must end before any load of batch i+1 starts.
fn assert_batches_sequential(events: &[Event], batches: &[&[&str]]) {
    for pair in batches.windows(2) {
        let last_end = pair[0]
            .iter()
            .map(|id| position(events, &Event::End(id.to_string())))
            .max()
            .unwrap();
        let first_start = pair[1]
            .iter()
            .map(|id| position(events, &Event::Start(id.to_string())))
            .min()
            .unwrap();
        assert!(
            last_end < first_start,
            "batch {:?} started before {:?} resolved: {:?}",
            pair[1],
            pair[0],
            events
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_five_images_in_three_waves() {
    let source = Arc::new(ScriptedSource::new());
    let preloader = Preloader::new(source.clone(), config(2));

    let run = preloader.start(ids(&["a", "b", "c", "d", "e"]));
    let state = preloader.wait_settled(run).await;

    assert_eq!(state.run_id(), run);
    assert_eq!(state.loaded().len(), 5);
    assert!(state.loading().is_empty());
    assert!(state.failed().is_empty());
    assert_eq!(state.progress(), 100.0);
    assert!(state.all_loaded());

    let events = source.events();
    assert_batches_sequential(&events, &[&["a", "b"], &["c", "d"], &["e"]]);
    assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 2);
    assert_eq!(source.started().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_isolated() {
    let source = Arc::new(ScriptedSource::new().failing(&["i1"]));
    let preloader = Preloader::new(source.clone(), config(3));

    let run = preloader.start(ids(&["i0", "i1", "i2", "i3"]));
    let state = preloader.wait_settled(run).await;

    assert_eq!(state.loaded().len(), 3);
    assert_eq!(state.failed().len(), 1);
    assert!(state.is_failed("i1"));
    assert_eq!(state.progress(), 100.0);
    assert!(!state.all_loaded());

    // The batch after the failure still ran.
    assert!(state.is_loaded("i3"));
    let stats = preloader.stats();
    assert_eq!(stats.loads_failed, 1);
    assert_eq!(stats.loads_succeeded, 3);
    assert_eq!(stats.active_loads, 0);
}

#[tokio::test(start_paused = true)]
async fn test_non_image_payload_counts_as_failure() {
    let source = Arc::new(ScriptedSource::new().not_image(&["broken"]));
    let preloader = Preloader::new(source, config(3));

    let run = preloader.start(ids(&["ok", "broken"]));
    let state = preloader.wait_settled(run).await;

    assert_eq!(state.status("ok"), ResourceStatus::Loaded);
    assert_eq!(state.status("broken"), ResourceStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_payload_with_image_signature_must_decode() {
    // Magic bytes alone do not make an image loaded.
    struct StubSource;

    #[async_trait]
    impl ImageSource for StubSource {
        async fn fetch(&self, _url: &str) -> Result<Bytes> {
            Ok(Bytes::from_static(&[0xFF, 0xD8, 0xFF]))
        }
    }

    let preloader = Preloader::new(Arc::new(StubSource), config(3));
    let run = preloader.start(ids(&["stub"]));
    let state = preloader.wait_settled(run).await;
    assert_eq!(state.status("stub"), ResourceStatus::Failed);

    let source = Arc::new(ScriptedSource::new().truncated(&["cut"]));
    let preloader = Preloader::new(source, config(3));
    let run = preloader.start(ids(&["whole", "cut"]));
    let state = preloader.wait_settled(run).await;

    assert_eq!(state.status("whole"), ResourceStatus::Loaded);
    assert_eq!(state.status("cut"), ResourceStatus::Failed);
    assert!(!state.all_loaded());
    assert_eq!(state.progress(), 100.0);
}

#[tokio::test(start_paused = true)]
async fn test_state_stays_disjoint_and_progress_monotonic() {
    let names: Vec<String> = (0..12).map(|i| format!("img-{}", i)).collect();
    let source = ScriptedSource::new()
        .failing(&["img-2", "img-7"])
        .delayed(&["img-0", "img-4"], Duration::from_millis(40))
        .delayed(&["img-5", "img-9"], Duration::from_millis(25));
    let preloader = Preloader::new(Arc::new(source), config(3));
    let mut rx = preloader.subscribe();

    let run = preloader.start(names.clone());

    let mut observed = 0;
    let mut last_progress = 0.0;
    loop {
        {
            let state = rx.borrow_and_update();
            if state.run_id() == run {
                observed += 1;
                assert!(state.loaded().is_disjoint(state.loading()));
                assert!(state.loaded().is_disjoint(state.failed()));
                assert!(state.loading().is_disjoint(state.failed()));
                assert!(state.loading().len() <= 3);
                assert!(state.progress() >= last_progress);
                last_progress = state.progress();
                if state.is_finished() {
                    break;
                }
            }
        }
        rx.changed().await.unwrap();
    }

    assert!(observed > 1);
    assert_eq!(last_progress, 100.0);
    let state = preloader.snapshot();
    assert_eq!(state.failed().len(), 2);
    assert_eq!(state.loaded().len(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_empty_list_dispatches_nothing() {
    let source = Arc::new(ScriptedSource::new());
    let preloader = Preloader::new(source.clone(), config(3));

    let run = preloader.start(Vec::new());
    let state = preloader.snapshot();

    assert_eq!(state.run_id(), run);
    assert!(state.is_finished());
    assert_eq!(state.progress(), 100.0);
    assert!(state.all_loaded());

    let settled = preloader.wait_settled(run).await;
    assert_eq!(settled.run_id(), run);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(source.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_wait_settled_before_first_run_returns() {
    let preloader = Preloader::new(Arc::new(ScriptedSource::new()), config(3));

    let idle = tokio::time::timeout(
        Duration::from_secs(2),
        preloader.wait_settled(preloader.current_run()),
    )
    .await
    .expect("idle engine should already be settled");
    assert!(idle.is_finished());
    assert_eq!(idle.total(), 0);
    assert_eq!(idle.progress(), 100.0);

    // A run id the engine has never issued does not block either.
    let unknown = tokio::time::timeout(Duration::from_secs(2), preloader.wait_settled(42))
        .await
        .expect("unissued run id should not block");
    assert_eq!(unknown.run_id(), preloader.current_run());
}

#[tokio::test(start_paused = true)]
async fn test_wait_settled_for_future_run_id_after_start() {
    let source = Arc::new(ScriptedSource::new().delayed(&["slow"], Duration::from_millis(500)));
    let preloader = Preloader::new(source, config(3));

    let run = preloader.start(ids(&["slow"]));
    let ahead = tokio::time::timeout(Duration::from_secs(2), preloader.wait_settled(run + 5))
        .await
        .expect("future run id should not block");
    assert_eq!(ahead.run_id(), run);

    let state = preloader.wait_settled(run).await;
    assert!(state.is_loaded("slow"));
}

#[tokio::test(start_paused = true)]
async fn test_superseded_run_is_discarded() {
    let source = Arc::new(
        ScriptedSource::new().delayed(&["old-1", "old-2"], Duration::from_millis(1000)),
    );
    let preloader = Preloader::new(source.clone(), config(2));

    let old_run = preloader.start(ids(&["old-1", "old-2", "old-3", "old-4"]));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(preloader.snapshot().is_loading("old-1"));

    let new_run = preloader.start(ids(&["new-1", "new-2"]));
    assert!(new_run > old_run);
    assert_eq!(preloader.current_run(), new_run);

    // Waiting on the replaced run returns right away with the newer state.
    let replaced = preloader.wait_settled(old_run).await;
    assert_eq!(replaced.run_id(), new_run);

    let state = preloader.wait_settled(new_run).await;
    assert!(state.all_loaded());

    // Let the old in-flight loads land.
    tokio::time::sleep(Duration::from_millis(3000)).await;

    let state = preloader.snapshot();
    assert_eq!(state.run_id(), new_run);
    assert_eq!(state.total(), 2);
    assert_eq!(state.loaded().len(), 2);
    assert!(!state.is_loaded("old-1"));
    assert_eq!(preloader.stats().stale_discarded, 2);

    // The replaced run never dispatched its second batch.
    let started = source.started();
    assert!(!started.contains(&"old-3".to_string()));
    assert!(!started.contains(&"old-4".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_hung_load_times_out() {
    let source = Arc::new(ScriptedSource::new().hanging(&["stuck"]));
    let cfg = PreloadConfig {
        batch_size: 2,
        load_timeout_ms: Some(500),
        ..PreloadConfig::default()
    };
    let preloader = Preloader::new(source, cfg);

    let run = preloader.start(ids(&["stuck", "fine", "after"]));
    let state = preloader.wait_settled(run).await;

    assert!(state.is_failed("stuck"));
    assert!(state.is_loaded("fine"));
    assert!(state.is_loaded("after"));
    assert_eq!(state.progress(), 100.0);
    assert!(!state.all_loaded());
}

#[tokio::test(start_paused = true)]
async fn test_duplicates_are_coalesced() {
    let source = Arc::new(ScriptedSource::new());
    let preloader = Preloader::new(source.clone(), config(2));

    let run = preloader.start(ids(&["a", "b", "a", "c"]));
    let state = preloader.wait_settled(run).await;

    assert_eq!(state.total(), 3);
    assert!(state.all_loaded());
    assert_eq!(state.progress(), 100.0);

    let started = source.started();
    assert_eq!(started.iter().filter(|id| id.as_str() == "a").count(), 1);
    assert_eq!(started.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_delay_between_batches() {
    let source = Arc::new(ScriptedSource::new());
    let preloader = Preloader::new(source, config(1));

    let t0 = tokio::time::Instant::now();
    let run = preloader.start(ids(&["a", "b", "c"]));
    preloader.wait_settled(run).await;

    // Three 10 ms loads separated by two 100 ms pauses.
    assert!(t0.elapsed() >= Duration::from_millis(230));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_dispatch() {
    let source = Arc::new(ScriptedSource::new());
    let preloader = Preloader::new(source.clone(), config(2));

    let run = preloader.start(ids(&["a", "b", "c", "d"]));
    preloader.shutdown();

    let state = preloader.wait_settled(run).await;
    assert!(state.is_finished());
    assert!(state.loaded().is_empty());
    assert!(source.events().is_empty());

    // Later runs on a shut-down engine settle immediately without loading.
    let next = preloader.start(ids(&["e"]));
    let state = preloader.wait_settled(next).await;
    assert!(state.is_finished());
    assert_eq!(state.status("e"), ResourceStatus::Pending);
}
