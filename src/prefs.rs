//! User preferences with optional JSON persistence and change notification.

use std::path::PathBuf;
use std::sync::Arc;

use avanza::CourtageClass;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use crate::error::EngineError;

/// Switching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Automatic,
    Manual,
}

/// Persisted user preferences.
///
/// Missing fields fall back to their defaults, so a preferences file from
/// an older build keeps loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    /// Class restored by the post-order reset.
    pub default_class: CourtageClass,
    pub mode: Mode,
    pub reset_after_order: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_class: CourtageClass::Mini,
            mode: Mode::Automatic,
            reset_after_order: true,
        }
    }
}

/// Shared preferences store.
///
/// Reads are cheap snapshots; writes persist to the backing file (when one
/// is configured) and wake the engine's watch subscription so the current
/// order is re-evaluated.
#[derive(Clone)]
pub struct PreferencesStore {
    path: Option<PathBuf>,
    tx: Arc<watch::Sender<UserPreferences>>,
}

impl PreferencesStore {
    /// In-memory store starting from defaults.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tx: Arc::new(watch::channel(UserPreferences::default()).0),
        }
    }

    /// Store backed by a JSON file. A missing or invalid file falls back to
    /// defaults rather than failing.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "invalid preferences file, using defaults");
                    UserPreferences::default()
                }
            },
            Err(_) => UserPreferences::default(),
        };
        Self {
            path: Some(path),
            tx: Arc::new(watch::channel(initial).0),
        }
    }

    /// Snapshot of the current preferences.
    pub fn current(&self) -> UserPreferences {
        self.tx.borrow().clone()
    }

    /// Replace the preferences, persisting and notifying subscribers.
    pub fn update(&self, prefs: UserPreferences) -> Result<(), EngineError> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&prefs)?;
            std::fs::write(path, json)?;
        }
        self.tx.send_replace(prefs);
        Ok(())
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> watch::Receiver<UserPreferences> {
        self.tx.subscribe()
    }
}
