//! Interval settings and their persistence

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{error::SettingsError, services::Volumes};

/// User-adjustable interval configuration
///
/// Interval lengths are in minutes; `overrun_time_limit` is in seconds and
/// is negative: a countdown completing further past zero than this is treated
/// as abandoned rather than finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub work_interval_length: u32,
    pub short_rest_interval_length: u32,
    pub long_rest_interval_length: u32,
    pub work_intervals_in_set: u32,
    pub stop_after_break: bool,
    pub overrun_time_limit: f64,
    pub show_timer_in_menu_bar: bool,
    pub windup_volume: f32,
    pub ding_volume: f32,
    pub ticking_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_interval_length: 25,
            short_rest_interval_length: 5,
            long_rest_interval_length: 15,
            work_intervals_in_set: 4,
            stop_after_break: false,
            overrun_time_limit: -60.0,
            show_timer_in_menu_bar: true,
            windup_volume: 1.0,
            ding_volume: 1.0,
            ticking_volume: 1.0,
        }
    }
}

impl Settings {
    /// Check the invariants every interval computation relies on
    pub fn validate(&self) -> Result<(), SettingsError> {
        let lengths = [
            ("workIntervalLength", self.work_interval_length),
            ("shortRestIntervalLength", self.short_rest_interval_length),
            ("longRestIntervalLength", self.long_rest_interval_length),
        ];
        for (name, minutes) in lengths {
            if minutes == 0 {
                return Err(SettingsError::Invalid(format!("{} must be greater than 0", name)));
            }
        }

        if self.work_intervals_in_set == 0 {
            return Err(SettingsError::Invalid(
                "workIntervalsInSet must be at least 1".to_string(),
            ));
        }

        if !self.overrun_time_limit.is_finite() || self.overrun_time_limit >= 0.0 {
            return Err(SettingsError::Invalid(
                "overrunTimeLimit must be a finite, negative number of seconds".to_string(),
            ));
        }

        let volumes = [
            ("windupVolume", self.windup_volume),
            ("dingVolume", self.ding_volume),
            ("tickingVolume", self.ticking_volume),
        ];
        for (name, volume) in volumes {
            if !(0.0..=1.0).contains(&volume) {
                return Err(SettingsError::Invalid(format!("{} must be within 0.0..=1.0", name)));
            }
        }

        Ok(())
    }

    pub fn volumes(&self) -> Volumes {
        Volumes {
            windup: self.windup_volume,
            ding: self.ding_volume,
            ticking: self.ticking_volume,
        }
    }
}

/// Partial update of [`Settings`]; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub work_interval_length: Option<u32>,
    pub short_rest_interval_length: Option<u32>,
    pub long_rest_interval_length: Option<u32>,
    pub work_intervals_in_set: Option<u32>,
    pub stop_after_break: Option<bool>,
    pub overrun_time_limit: Option<f64>,
    pub show_timer_in_menu_bar: Option<bool>,
    pub windup_volume: Option<f32>,
    pub ding_volume: Option<f32>,
    pub ticking_volume: Option<f32>,
}

impl SettingsPatch {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(minutes) = self.work_interval_length {
            settings.work_interval_length = minutes;
        }
        if let Some(minutes) = self.short_rest_interval_length {
            settings.short_rest_interval_length = minutes;
        }
        if let Some(minutes) = self.long_rest_interval_length {
            settings.long_rest_interval_length = minutes;
        }
        if let Some(count) = self.work_intervals_in_set {
            settings.work_intervals_in_set = count;
        }
        if let Some(stop) = self.stop_after_break {
            settings.stop_after_break = stop;
        }
        if let Some(limit) = self.overrun_time_limit {
            settings.overrun_time_limit = limit;
        }
        if let Some(show) = self.show_timer_in_menu_bar {
            settings.show_timer_in_menu_bar = show;
        }
        if let Some(volume) = self.windup_volume {
            settings.windup_volume = volume;
        }
        if let Some(volume) = self.ding_volume {
            settings.ding_volume = volume;
        }
        if let Some(volume) = self.ticking_volume {
            settings.ticking_volume = volume;
        }
    }
}

/// Where settings are read from at startup and written to on every change
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings, SettingsError>;
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Settings kept in a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            info!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;

        debug!("Loaded settings from {}", self.path.display());
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Settings held in memory only
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: Mutex<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently saved settings, if any
    pub fn saved(&self) -> Option<Settings> {
        self.saved.lock().ok().and_then(|saved| saved.clone())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        Ok(self.saved().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Ok(mut saved) = self.saved.lock() {
            *saved = Some(settings.clone());
        }
        Ok(())
    }
}
