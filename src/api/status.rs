use serde::Serialize;

use crate::engine::state::{PreloadState, RunId};
use crate::gallery::catalog::Category;

/// Preload status of the gallery, flattened for the host UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryStatus {
    pub category: Category,
    pub run_id: RunId,
    pub progress_percent: u8,
    pub loaded: usize,
    pub loading: usize,
    pub failed: usize,
    pub total: usize,
    pub all_loaded: bool,
}

impl GalleryStatus {
    pub fn from_state(category: Category, state: &PreloadState) -> Self {
        Self {
            category,
            run_id: state.run_id(),
            progress_percent: state.progress().round() as u8,
            loaded: state.loaded().len(),
            loading: state.loading().len(),
            failed: state.failed().len(),
            total: state.total(),
            all_loaded: state.all_loaded(),
        }
    }
}
