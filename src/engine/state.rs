// Preload state for one run — disjoint loaded/loading/failed sets plus derived progress.

use std::collections::HashSet;

/// Identity of one preload run. Strictly increasing per engine.
pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
    Pending,
    Loading,
    Loaded,
    Failed,
}

/// State of one run over one resource list.
///
/// A resource moves `Pending -> Loading -> Loaded | Failed` and never back.
/// Every transition is idempotent and reports whether it changed anything,
/// so overlapping completions for the same identifier are harmless.
///
/// Repeated identifiers in the input list are coalesced: `total` counts
/// distinct identifiers and each one is tracked once.
#[derive(Debug, Clone, Default)]
pub struct PreloadState {
    run_id: RunId,
    total: usize,
    loaded: HashSet<String>,
    loading: HashSet<String>,
    failed: HashSet<String>,
    finished: bool,
}

impl PreloadState {
    pub fn new(run_id: RunId, images: &[String]) -> Self {
        let total = images.iter().collect::<HashSet<_>>().len();
        Self {
            run_id,
            total,
            finished: total == 0,
            ..Self::default()
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn loaded(&self) -> &HashSet<String> {
        &self.loaded
    }

    pub fn loading(&self) -> &HashSet<String> {
        &self.loading
    }

    pub fn failed(&self) -> &HashSet<String> {
        &self.failed
    }

    pub fn status(&self, id: &str) -> ResourceStatus {
        if self.loaded.contains(id) {
            ResourceStatus::Loaded
        } else if self.failed.contains(id) {
            ResourceStatus::Failed
        } else if self.loading.contains(id) {
            ResourceStatus::Loading
        } else {
            ResourceStatus::Pending
        }
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded.contains(id)
    }

    pub fn is_loading(&self, id: &str) -> bool {
        self.loading.contains(id)
    }

    pub fn is_failed(&self, id: &str) -> bool {
        self.failed.contains(id)
    }

    /// Pending -> Loading. Returns `false` if `id` was already dispatched.
    pub fn mark_loading(&mut self, id: &str) -> bool {
        if self.status(id) != ResourceStatus::Pending {
            return false;
        }
        self.loading.insert(id.to_string())
    }

    /// Loading -> Loaded.
    pub fn mark_loaded(&mut self, id: &str) -> bool {
        if !self.loading.remove(id) {
            return false;
        }
        self.loaded.insert(id.to_string())
    }

    /// Loading -> Failed.
    pub fn mark_failed(&mut self, id: &str) -> bool {
        if !self.loading.remove(id) {
            return false;
        }
        self.failed.insert(id.to_string())
    }

    pub fn mark_finished(&mut self) -> bool {
        let changed = !self.finished;
        self.finished = true;
        changed
    }

    /// True once the run has stopped dispatching and nothing is in flight.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn resolved(&self) -> usize {
        self.loaded.len() + self.failed.len()
    }

    /// Percentage of the list accounted for by loaded or failed resources.
    ///
    /// An empty list counts as complete.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.resolved() as f64 / self.total as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Failed resources never count here, even though they advance `progress`.
    pub fn all_loaded(&self) -> bool {
        self.loaded.len() == self.total
    }
}
