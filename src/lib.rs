// Wallpaper gallery engine — batched image preloading, gallery model and app shell state.

pub mod api;
pub mod app;
pub mod config;
pub mod detect;
pub mod engine;
pub mod gallery;
pub mod source;
