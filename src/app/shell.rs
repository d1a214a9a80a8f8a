// Application shell — section navigation, toasts and the intro gate, driven by typed messages.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::settings::{SettingsStore, UserSettings};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Home,
    Gallery,
    Categories,
    Favorites,
    Downloads,
    Settings,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Home,
        Section::Gallery,
        Section::Categories,
        Section::Favorites,
        Section::Downloads,
        Section::Settings,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Gallery => "gallery",
            Section::Categories => "categories",
            Section::Favorites => "favorites",
            Section::Downloads => "downloads",
            Section::Settings => "settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Home => "Home",
            Section::Gallery => "Gallery",
            Section::Categories => "Categories",
            Section::Favorites => "Favorites",
            Section::Downloads => "Downloads",
            Section::Settings => "Settings",
        }
    }

    /// Unknown keys fall back to the home page.
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.key() == key)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMessage {
    Navigate(Section),
    Toast(Toast),
}

/// Handle pages use to reach the shell.
#[derive(Clone)]
pub struct AppSender {
    tx: mpsc::UnboundedSender<AppMessage>,
}

impl AppSender {
    pub fn send(&self, message: AppMessage) {
        if self.tx.send(message).is_err() {
            debug!("app shell gone, message dropped");
        }
    }

    pub fn navigate(&self, section: Section) {
        self.send(AppMessage::Navigate(section));
    }

    pub fn toast(&self, message: impl Into<String>, kind: ToastKind) {
        self.send(AppMessage::Toast(Toast {
            message: message.into(),
            kind,
        }));
    }
}

pub struct AppShell {
    store: SettingsStore,
    settings: UserSettings,
    current: Section,
    toasts: Vec<Toast>,
    tx: mpsc::UnboundedSender<AppMessage>,
    rx: mpsc::UnboundedReceiver<AppMessage>,
}

impl AppShell {
    pub fn new(store: SettingsStore, settings: UserSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store,
            settings,
            current: Section::default(),
            toasts: Vec::new(),
            tx,
            rx,
        }
    }

    /// Load persisted settings from `store` and build the shell.
    pub fn open(store: SettingsStore) -> Result<Self> {
        let settings = store.load()?;
        Ok(Self::new(store, settings))
    }

    pub fn show_intro(&self) -> bool {
        !self.settings.has_seen_intro
    }

    /// Called when the intro sequence ends; persists the flag.
    pub fn complete_intro(&mut self) -> Result<()> {
        if self.settings.has_seen_intro {
            return Ok(());
        }
        self.settings = self.store.mark_intro_seen()?;
        Ok(())
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn current_section(&self) -> Section {
        self.current
    }

    pub fn sender(&self) -> AppSender {
        AppSender {
            tx: self.tx.clone(),
        }
    }

    pub fn navigate(&mut self, section: Section) {
        if section != self.current {
            info!("navigate {} -> {}", self.current.key(), section.key());
            self.current = section;
        }
    }

    /// Apply every message queued by pages. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            match message {
                AppMessage::Navigate(section) => self.navigate(section),
                AppMessage::Toast(toast) => {
                    debug!("toast {:?}: {}", toast.kind, toast.message);
                    self.toasts.push(toast);
                }
            }
            handled += 1;
        }
        handled
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }
}
