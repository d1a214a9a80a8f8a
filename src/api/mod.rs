// Host-facing surface — logging setup and plain status types for the UI layer.

pub mod logging;
pub mod status;
