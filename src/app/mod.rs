// Application shell — navigation, toasts, page actions and persisted user settings.

pub mod pages;
pub mod settings;
pub mod shell;
