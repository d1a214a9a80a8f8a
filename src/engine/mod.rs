// Preload engine — batched loading, per-run state and live statistics.

pub mod preloader;
pub mod state;
pub mod stats;
