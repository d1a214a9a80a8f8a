use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// User state that survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub has_seen_intro: bool,
}

/// JSON file holding [`UserSettings`], at a path chosen by the host.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings. A missing file means a first launch.
    pub fn load(&self) -> Result<UserSettings> {
        if !self.path.exists() {
            debug!("no settings at {}, using defaults", self.path.display());
            return Ok(UserSettings::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse {}", self.path.display()))
    }

    pub fn save(&self, settings: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let raw = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, raw).with_context(|| format!("write {}", self.path.display()))
    }

    pub fn mark_intro_seen(&self) -> Result<UserSettings> {
        let mut settings = self.load()?;
        settings.has_seen_intro = true;
        self.save(&settings)?;
        info!("intro marked as seen");
        Ok(settings)
    }
}
