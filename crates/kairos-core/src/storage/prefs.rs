//! Durable, observable alarm preferences.
//!
//! One typed accessor per semantic setting; there is no generic key-value
//! edit surface. State is stored as TOML at `<data_dir>/prefs.toml`. Every
//! write persists to disk first and then publishes the new state on a
//! watch channel, so subscribers observe each committed change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

use crate::error::StoreError;
use crate::policy::AlarmRules;

pub const PREFS_FILE: &str = "prefs.toml";

/// User preference state for the alarm subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Master switch for event alarms.
    #[serde(default = "default_true")]
    pub alarms_enabled: bool,
    /// Alert with vibration only, no ringtone.
    #[serde(default)]
    pub vibrate_only: bool,
    /// One-time autostart suggestion dismissed by the user.
    #[serde(default)]
    pub autostart_hint_dismissed: bool,
    /// Occurrence identities with the alarm turned off individually.
    #[serde(default)]
    pub disabled_instance_ids: BTreeSet<String>,
    /// Series ids with the alarm turned off for every occurrence.
    #[serde(default)]
    pub disabled_series_ids: BTreeSet<String>,
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            alarms_enabled: true,
            vibrate_only: false,
            autostart_hint_dismissed: false,
            disabled_instance_ids: BTreeSet::new(),
            disabled_series_ids: BTreeSet::new(),
        }
    }
}

impl Preferences {
    /// Project the slice the policy engine consumes.
    pub fn rules(&self) -> AlarmRules {
        AlarmRules {
            global_enabled: self.alarms_enabled,
            disabled_instances: self.disabled_instance_ids.clone(),
            disabled_series: self.disabled_series_ids.clone(),
        }
    }
}

/// Durable preference store with push-style observability.
pub struct PrefStore {
    path: PathBuf,
    tx: watch::Sender<Preferences>,
}

impl PrefStore {
    /// Open the store at `path`, loading existing state or defaults.
    ///
    /// An unreadable file falls back to defaults and is rewritten by the
    /// next persisted write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("unreadable preference file {}: {e}", path.display());
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        };
        let (tx, _) = watch::channel(prefs);
        Self { path, tx }
    }

    /// Open in the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::open(super::data_dir()?.join(PREFS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> Preferences {
        self.tx.borrow().clone()
    }

    /// The alarm-relevant projection of the current state.
    pub fn rules(&self) -> AlarmRules {
        self.tx.borrow().rules()
    }

    /// Receive pushed updates. The receiver observes every committed write.
    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.tx.subscribe()
    }

    pub fn set_alarms_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.update(|p| p.alarms_enabled = enabled)
    }

    pub fn set_vibrate_only(&self, on: bool) -> Result<(), StoreError> {
        self.update(|p| p.vibrate_only = on)
    }

    pub fn set_autostart_hint_dismissed(&self, dismissed: bool) -> Result<(), StoreError> {
        self.update(|p| p.autostart_hint_dismissed = dismissed)
    }

    /// Suppress one specific occurrence.
    pub fn disable_instance(&self, instance_key: &str) -> Result<(), StoreError> {
        self.update(|p| {
            p.disabled_instance_ids.insert(instance_key.to_string());
        })
    }

    /// Lift a per-occurrence suppression. No-op if absent.
    pub fn enable_instance(&self, instance_key: &str) -> Result<(), StoreError> {
        self.update(|p| {
            p.disabled_instance_ids.remove(instance_key);
        })
    }

    /// Suppress a whole recurring series, past and future occurrences.
    pub fn disable_series(&self, series_key: &str) -> Result<(), StoreError> {
        self.update(|p| {
            p.disabled_series_ids.insert(series_key.to_string());
        })
    }

    /// Lift a series suppression. No-op if absent.
    pub fn enable_series(&self, series_key: &str) -> Result<(), StoreError> {
        self.update(|p| {
            p.disabled_series_ids.remove(series_key);
        })
    }

    /// Persist-then-publish: durability precedes visibility.
    fn update(&self, mutate: impl FnOnce(&mut Preferences)) -> Result<(), StoreError> {
        let mut next = self.tx.borrow().clone();
        mutate(&mut next);
        let content = toml::to_string_pretty(&next).map_err(|e| StoreError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(|e| StoreError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        self.tx.send_replace(next);
        Ok(())
    }
}
