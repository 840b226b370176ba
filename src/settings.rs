use crate::store::{KeyValueStore, StoreError};
use crate::types::ThemeMode;
use serde_json::{json, Map, Value as JsonValue};
use std::{
  collections::HashMap,
  sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use thiserror::Error;
use tokio::sync::Mutex;

pub const DEFAULT_SETTINGS_KEY: &str = "settings";

pub const KEY_NOTIFICATIONS_ENABLED: &str = "notificationsEnabled";
pub const KEY_MOTION_DETECTION_ENABLED: &str = "motionDetectionEnabled";
pub const KEY_NIGHT_VISION_ENABLED: &str = "nightVisionEnabled";
pub const KEY_AUTO_RECORDING_ENABLED: &str = "autoRecordingEnabled";
pub const KEY_HIGH_QUALITY_ENABLED: &str = "highQualityEnabled";
pub const KEY_REMEMBER_THEME: &str = "rememberTheme";
pub const KEY_THEME_MODE: &str = "themeMode";

fn defaults() -> HashMap<String, JsonValue> {
  HashMap::from([
    (KEY_NOTIFICATIONS_ENABLED.to_string(), json!(true)),
    (KEY_MOTION_DETECTION_ENABLED.to_string(), json!(true)),
    (KEY_NIGHT_VISION_ENABLED.to_string(), json!(true)),
    (KEY_AUTO_RECORDING_ENABLED.to_string(), json!(true)),
    (KEY_HIGH_QUALITY_ENABLED.to_string(), json!(true)),
    (KEY_REMEMBER_THEME.to_string(), json!(false)),
  ])
}

#[derive(Debug, Error)]
pub enum SettingsError {
  #[error(transparent)]
  Store(#[from] StoreError),
  #[error("settings could not be serialized")]
  Json(#[from] serde_json::Error),
}

/// Preference toggles kept as one JSON object in the secure store.
#[derive(Clone)]
pub struct SettingsStore {
  store: Arc<dyn KeyValueStore>,
  key: String,
  values: Arc<RwLock<HashMap<String, JsonValue>>>,
  persist_lock: Arc<Mutex<()>>,
}

impl SettingsStore {
  pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
    Self {
      store,
      key: key.into(),
      values: Arc::new(RwLock::new(defaults())),
      persist_lock: Arc::new(Mutex::new(())),
    }
  }

  fn read(&self) -> RwLockReadGuard<'_, HashMap<String, JsonValue>> {
    self.values.read().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, JsonValue>> {
    self.values.write().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Merges the persisted blob over the defaults. A missing or unreadable
  /// blob leaves the defaults in place; only a store failure is an error.
  pub async fn load(&self) -> Result<(), SettingsError> {
    let Some(raw) = self.store.get(&self.key).await? else {
      return Ok(());
    };

    match serde_json::from_str::<Map<String, JsonValue>>(&raw) {
      Ok(stored) => {
        let mut values = self.write();
        for (k, v) in stored {
          values.insert(k, v);
        }
        tracing::debug!(key = %self.key, "settings loaded");
      }
      Err(err) => {
        tracing::warn!(key = %self.key, error = %err, "ignoring unreadable settings, using defaults");
      }
    }
    Ok(())
  }

  /// Writes the current values. Overlapping calls take their snapshot and
  /// write one at a time, so the last call's snapshot is what lands.
  pub async fn persist(&self) -> Result<(), SettingsError> {
    let _guard = self.persist_lock.lock().await;
    let encoded = {
      let values = self.read();
      let map: Map<String, JsonValue> = values
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
      serde_json::to_string(&map)?
    };
    self.store.set(&self.key, &encoded).await?;
    Ok(())
  }

  pub fn get_bool(&self, key: &str, fallback: bool) -> bool {
    self
      .read()
      .get(key)
      .and_then(|v| v.as_bool())
      .unwrap_or(fallback)
  }

  pub fn get_string(&self, key: &str) -> Option<String> {
    let values = self.read();
    let s = values.get(key)?.as_str()?.trim();
    if s.is_empty() {
      None
    } else {
      Some(s.to_string())
    }
  }

  pub fn set(&self, key: &str, value: impl Into<JsonValue>) {
    self.write().insert(key.to_string(), value.into());
  }

  pub fn remove(&self, key: &str) {
    self.write().remove(key);
  }

  pub fn remember_theme(&self) -> bool {
    self.get_bool(KEY_REMEMBER_THEME, false)
  }

  /// The remembered theme, if the user opted in and a valid one is stored.
  pub fn theme_mode(&self) -> Option<ThemeMode> {
    if !self.remember_theme() {
      return None;
    }
    self
      .get_string(KEY_THEME_MODE)
      .and_then(|value| ThemeMode::parse(&value))
  }
}
