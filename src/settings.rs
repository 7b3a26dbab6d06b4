use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

/// Env flag that shortens every workflow delay tenfold, for demos.
pub const FAST_MODE_ENV: &str = "CLINIREPORT_FAST";

const FAST_MODE_DIVISOR: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowSettings {
    pub tick_interval_ms: u64,
    pub progress_step: u8,
    pub completion_delay_ms: u64,
    pub action_busy_ms: u64,
    pub action_done_ms: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            progress_step: 5,
            completion_delay_ms: 500,
            action_busy_ms: 1000,
            action_done_ms: 1500,
        }
    }
}

impl WorkflowSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// A zero step would never finish, so it counts as one.
    pub fn progress_step(&self) -> u8 {
        self.progress_step.max(1)
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    pub fn action_busy(&self) -> Duration {
        Duration::from_millis(self.action_busy_ms)
    }

    pub fn action_done(&self) -> Duration {
        Duration::from_millis(self.action_done_ms)
    }

    pub fn fast(mut self) -> Self {
        self.tick_interval_ms = (self.tick_interval_ms / FAST_MODE_DIVISOR).max(1);
        self.completion_delay_ms /= FAST_MODE_DIVISOR;
        self.action_busy_ms /= FAST_MODE_DIVISOR;
        self.action_done_ms /= FAST_MODE_DIVISOR;
        self
    }

    pub fn with_env_overrides(self) -> Self {
        let flag = std::env::var(FAST_MODE_ENV).ok();
        self.with_fast_mode_flag(flag.as_deref())
    }

    /// Applies fast mode when `flag` is `1` or `true` (any case); any other
    /// value, or none, leaves the settings as they are.
    pub fn with_fast_mode_flag(self, flag: Option<&str>) -> Self {
        let fast_mode = flag
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if fast_mode {
            self.fast()
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    workflow: WorkflowSettings,
}

pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring unreadable settings file {}: {err}",
                    path.display()
                );
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Store that never touches disk.
    pub fn in_memory(workflow: WorkflowSettings) -> Self {
        Self {
            path: None,
            data: RwLock::new(UserSettings { workflow }),
        }
    }

    pub fn workflow(&self) -> WorkflowSettings {
        self.read().workflow.clone()
    }

    pub fn update_workflow(&self, settings: WorkflowSettings) -> Result<()> {
        let mut guard = self.write();
        guard.workflow = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_settings_path() -> PathBuf {
        std::env::temp_dir().join(format!("clinireport-settings-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let store = SettingsStore::new(temp_settings_path()).unwrap();
        assert_eq!(store.workflow(), WorkflowSettings::default());
    }

    #[test]
    fn updates_are_persisted_and_reloaded() {
        let path = temp_settings_path();
        let store = SettingsStore::new(path.clone()).unwrap();
        let custom = WorkflowSettings {
            tick_interval_ms: 50,
            ..WorkflowSettings::default()
        };
        store.update_workflow(custom.clone()).unwrap();

        let reloaded = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(reloaded.workflow(), custom);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let path = temp_settings_path();
        fs::write(&path, "{ not json").unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.workflow(), WorkflowSettings::default());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_settings_path();
        fs::write(&path, r#"{ "workflow": { "progressStep": 10 } }"#).unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        let settings = store.workflow();
        assert_eq!(settings.progress_step, 10);
        assert_eq!(settings.tick_interval_ms, 200);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn fast_mode_divides_delays() {
        let fast = WorkflowSettings::default().fast();
        assert_eq!(fast.tick_interval_ms, 20);
        assert_eq!(fast.completion_delay_ms, 50);
        assert_eq!(fast.action_busy_ms, 100);
        assert_eq!(fast.action_done_ms, 150);
        assert_eq!(fast.progress_step, 5);
    }

    #[test]
    fn fast_mode_flag_accepts_one_and_true() {
        let defaults = WorkflowSettings::default();
        let fast = defaults.clone().fast();

        assert_eq!(defaults.clone().with_fast_mode_flag(Some("1")), fast);
        assert_eq!(defaults.clone().with_fast_mode_flag(Some("TRUE")), fast);
        assert_eq!(defaults.clone().with_fast_mode_flag(Some("true")), fast);
        assert_eq!(defaults.clone().with_fast_mode_flag(Some("yes")), defaults);
        assert_eq!(defaults.clone().with_fast_mode_flag(Some("")), defaults);
        assert_eq!(defaults.clone().with_fast_mode_flag(None), defaults);
    }

    #[test]
    fn zero_step_is_normalized() {
        let settings = WorkflowSettings {
            progress_step: 0,
            ..WorkflowSettings::default()
        };
        assert_eq!(settings.progress_step(), 1);
    }
}
