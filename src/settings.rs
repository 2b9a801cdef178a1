use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

/// Timing and scoring knobs for a study session. All durations are in
/// milliseconds so the JSON file stays human editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    pub sample_interval_ms: u64,
    pub minute_ms: u64,
    pub quiz_delay_min_ms: u64,
    pub quiz_delay_max_ms: u64,
    pub feedback_delay_ms: u64,
    pub close_delay_ms: u64,
    pub questions_per_quiz: u32,
    pub walk_min_step: f64,
    pub walk_max_step: f64,
    pub initial_attention: f64,
    pub target_minutes: u32,
    pub end_navigation_delay_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 2_000,
            minute_ms: 60_000,
            quiz_delay_min_ms: 5 * 60_000,
            quiz_delay_max_ms: 10 * 60_000,
            feedback_delay_ms: 1_500,
            close_delay_ms: 500,
            questions_per_quiz: 5,
            walk_min_step: -3.0,
            walk_max_step: 7.0,
            initial_attention: 100.0,
            target_minutes: 25,
            end_navigation_delay_ms: 3_000,
        }
    }
}

impl SessionSettings {
    /// Every timer shrunk so a full countdown fits in a few seconds.
    pub fn accelerated() -> Self {
        Self {
            sample_interval_ms: 20,
            minute_ms: 200,
            quiz_delay_min_ms: 500,
            quiz_delay_max_ms: 1_000,
            feedback_delay_ms: 15,
            close_delay_ms: 5,
            end_navigation_delay_ms: 30,
            target_minutes: 5,
            ..Self::default()
        }
    }

    /// Defaults, or the accelerated profile when `FOCUSBOOST_DEBUG` is set.
    pub fn from_env() -> Self {
        let debug_mode = std::env::var("FOCUSBOOST_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if debug_mode {
            Self::accelerated()
        } else {
            Self::default()
        }
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn minute(&self) -> Duration {
        Duration::from_millis(self.minute_ms.max(1))
    }

    pub fn quiz_delay_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.quiz_delay_min_ms),
            Duration::from_millis(self.quiz_delay_max_ms),
        )
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    pub fn end_navigation_delay(&self) -> Duration {
        Duration::from_millis(self.end_navigation_delay_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    session: SessionSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Malformed settings in {}", path.display()))?
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn session(&self) -> SessionSettings {
        self.read().session.clone()
    }

    pub fn update_session(&self, settings: SessionSettings) -> Result<()> {
        let mut guard = self.write();
        guard.session = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
