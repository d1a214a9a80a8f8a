// Batched image preloader — loads a resource list in fixed-size waves and publishes live state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{PreloadState, ResourceStatus, RunId};
use super::stats::{PreloadStats, StatsSnapshot};
use crate::config::PreloadConfig;
use crate::source::traits::ImageSource;

/// Drives bounded-concurrency loading of one resource list at a time.
///
/// Each call to [`Preloader::start`] adopts a new list and begins a fresh run
/// with a new [`RunId`]. Batches run strictly one after another; loads inside
/// a batch run concurrently. Completions from a replaced run are dropped, so a
/// category switch never leaks old results into the new state. Loads already
/// in flight for the replaced run are left to finish on their own.
///
/// Must be used from within a tokio runtime.
pub struct Preloader {
    source: Arc<dyn ImageSource>,
    config: PreloadConfig,
    state_tx: Arc<watch::Sender<PreloadState>>,
    last_run: AtomicU64,
    stats: Arc<PreloadStats>,
    shutdown_token: CancellationToken,
}

impl Preloader {
    pub fn new(source: Arc<dyn ImageSource>, config: PreloadConfig) -> Self {
        // Run 0 is the empty list, settled before anything starts.
        let (state_tx, _) = watch::channel(PreloadState::new(0, &[]));
        Self {
            source,
            config: config.validated(),
            state_tx: Arc::new(state_tx),
            last_run: AtomicU64::new(0),
            stats: Arc::new(PreloadStats::new()),
            shutdown_token: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &PreloadConfig {
        &self.config
    }

    /// Adopt `images` as the current list and start loading it in the background.
    pub fn start(&self, images: Vec<String>) -> RunId {
        let run_id = self.last_run.fetch_add(1, Ordering::Relaxed) + 1;
        let fresh = PreloadState::new(run_id, &images);

        // A concurrent start() may already have published a newer run.
        let adopted = self.state_tx.send_if_modified(|state| {
            if run_id > state.run_id() {
                *state = fresh;
                true
            } else {
                false
            }
        });
        if !adopted {
            debug!("run {} superseded before it started", run_id);
            return run_id;
        }

        if images.is_empty() {
            debug!("run {} has no images, nothing to load", run_id);
            return run_id;
        }

        if self.shutdown_token.is_cancelled() {
            warn!("run {} not started: preloader is shut down", run_id);
            self.state_tx
                .send_if_modified(|state| state.run_id() == run_id && state.mark_finished());
            return run_id;
        }

        info!(
            "run {} started: images={} batch_size={}",
            run_id,
            images.len(),
            self.config.batch_size
        );

        tokio::spawn(Self::run_batches(
            run_id,
            images,
            self.config.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.state_tx),
            Arc::clone(&self.stats),
            self.shutdown_token.clone(),
        ));

        run_id
    }

    /// Latest run started by this engine (0 before the first run).
    pub fn current_run(&self) -> RunId {
        self.state_tx.borrow().run_id()
    }

    pub fn subscribe(&self) -> watch::Receiver<PreloadState> {
        self.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> PreloadState {
        self.state_tx.borrow().clone()
    }

    pub fn status(&self, id: &str) -> ResourceStatus {
        self.state_tx.borrow().status(id)
    }

    /// Wait until `run_id` has finished or been replaced by a newer run.
    ///
    /// Returns the state current at that moment, which belongs to a newer run
    /// if `run_id` was replaced. Ids not yet issued return the current state at once.
    pub async fn wait_settled(&self, run_id: RunId) -> PreloadState {
        if run_id > self.last_run.load(Ordering::Relaxed) {
            debug!("wait_settled for unissued run {}, returning current state", run_id);
            return self.snapshot();
        }

        let mut rx = self.state_tx.subscribe();
        let settled = rx
            .wait_for(|state| {
                state.run_id() > run_id || (state.run_id() == run_id && state.is_finished())
            })
            .await
            .map(|state| PreloadState::clone(&state));

        match settled {
            Ok(state) => state,
            Err(_) => self.snapshot(),
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop dispatching further batches. Loads already in flight still land.
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }

    async fn run_batches(
        run_id: RunId,
        images: Vec<String>,
        config: PreloadConfig,
        source: Arc<dyn ImageSource>,
        state_tx: Arc<watch::Sender<PreloadState>>,
        stats: Arc<PreloadStats>,
        shutdown_token: CancellationToken,
    ) {
        let t0 = Instant::now();
        let timeout = config.load_timeout();
        let batch_count = images.len().div_ceil(config.batch_size);

        for (batch_index, batch) in images.chunks(config.batch_size).enumerate() {
            if batch_index > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(config.inter_batch_delay()) => {}
                    _ = shutdown_token.cancelled() => {}
                }
            }

            if shutdown_token.is_cancelled() {
                debug!("run {} stopped before batch {}: shutdown", run_id, batch_index);
                state_tx.send_if_modified(|state| state.run_id() == run_id && state.mark_finished());
                return;
            }

            let mut dispatched = Vec::with_capacity(batch.len());
            state_tx.send_if_modified(|state| {
                if state.run_id() != run_id {
                    return false;
                }
                for id in batch {
                    if state.mark_loading(id) {
                        dispatched.push(id.clone());
                    }
                }
                !dispatched.is_empty()
            });

            if state_tx.borrow().run_id() != run_id {
                debug!(
                    "run {} superseded, skipping batches {}..{}",
                    run_id, batch_index, batch_count
                );
                return;
            }

            debug!(
                "run {} batch {}/{} dispatching {} loads",
                run_id,
                batch_index + 1,
                batch_count,
                dispatched.len()
            );

            let handles: Vec<(String, JoinHandle<()>)> = dispatched
                .into_iter()
                .map(|id| {
                    stats.record_started();
                    let handle = tokio::spawn(Self::load_one(
                        run_id,
                        id.clone(),
                        Arc::clone(&source),
                        Arc::clone(&state_tx),
                        Arc::clone(&stats),
                        timeout,
                    ));
                    (id, handle)
                })
                .collect();

            // Completion order inside a batch is unspecified; the next batch
            // only starts once every handle has resolved.
            for (id, handle) in handles {
                if let Err(e) = handle.await {
                    warn!("run {} load task for {} aborted: {}", run_id, id, e);
                    stats.record_failed();
                    Self::apply_completion(&state_tx, &stats, run_id, &id, false);
                }
            }
        }

        let finished =
            state_tx.send_if_modified(|state| state.run_id() == run_id && state.mark_finished());
        if finished {
            let state = state_tx.borrow();
            info!(
                "run {} finished: loaded={} failed={} total={} elapsed_ms={}",
                run_id,
                state.loaded().len(),
                state.failed().len(),
                state.total(),
                t0.elapsed().as_millis()
            );
        } else {
            debug!("run {} finished after being superseded", run_id);
        }
    }

    async fn load_one(
        run_id: RunId,
        id: String,
        source: Arc<dyn ImageSource>,
        state_tx: Arc<watch::Sender<PreloadState>>,
        stats: Arc<PreloadStats>,
        timeout: Option<Duration>,
    ) {
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, source.load(&id)).await {
                Ok(result) => result,
                Err(_) => Err(anyhow!("timed out after {} ms", limit.as_millis())),
            },
            None => source.load(&id).await,
        };

        let loaded = match result {
            Ok(image) => {
                stats.record_loaded(image.byte_len as u64);
                debug!(
                    "run {} loaded {} ({:?}, {} bytes)",
                    run_id, id, image.format, image.byte_len
                );
                true
            }
            Err(e) => {
                stats.record_failed();
                warn!("run {} image preload failed: {}: {}", run_id, id, e);
                false
            }
        };

        Self::apply_completion(&state_tx, &stats, run_id, &id, loaded);
    }

    fn apply_completion(
        state_tx: &watch::Sender<PreloadState>,
        stats: &PreloadStats,
        run_id: RunId,
        id: &str,
        loaded: bool,
    ) {
        let mut stale = false;
        state_tx.send_if_modified(|state| {
            if state.run_id() != run_id {
                stale = true;
                return false;
            }
            if loaded {
                state.mark_loaded(id)
            } else {
                state.mark_failed(id)
            }
        });

        if stale {
            stats.record_stale();
            debug!("run {} completion for {} discarded: run superseded", run_id, id);
        }
    }
}

impl Drop for Preloader {
    fn drop(&mut self) {
        debug!("Preloader dropped, stopping run {}", self.current_run());
        self.shutdown_token.cancel();
    }
}
