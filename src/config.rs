use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::{dispatch::DispatchConfig, error::ConfigError, pipeline::PipelineConfig};

pub fn default_settings_path() -> PathBuf {
    PathBuf::from("config").join("settings.json")
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detection: DetectionSettings,
    pub gesture_recognition: GestureSettings,
    pub system_control: SystemControlSettings,
    pub logging: LoggingSettings,
}

/// Passed to the hand detector; the recognition core does not read these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub max_num_hands: i64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.5,
            max_num_hands: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    pub gesture_threshold: f32,
    /// Seconds.
    pub cooldown_period: f64,
    pub smoothing_buffer_size: i64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            gesture_threshold: 0.85,
            cooldown_period: 1.0,
            smoothing_buffer_size: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemControlSettings {
    /// Seconds.
    pub action_cooldown: f64,
    pub volume_step: i64,
    pub enable_audio_control: bool,
}

impl Default for SystemControlSettings {
    fn default() -> Self {
        Self {
            action_cooldown: 1.0,
            volume_step: 5,
            enable_audio_control: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub log_level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Reads and validates settings. A missing file yields defaults; fields
    /// that are out of range fall back to their defaults with a warning.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let (settings, rejected) = Self::read(path)?.validated();
        for err in &rejected {
            log::warn!("{err}; using default");
        }
        Ok(settings)
    }

    /// Parses settings without range checks.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let settings = Self::read_file(path)?;
        log_source(path, settings.is_some());
        Ok(settings.unwrap_or_default())
    }

    /// Like [`Settings::read`] but silent, for use before logging is set up.
    /// `None` means the file does not exist.
    pub fn read_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let encoded = serde_json::to_string_pretty(self).map_err(ConfigError::Encode)?;
        fs::write(path, encoded).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("settings saved to {}", path.display());
        Ok(())
    }

    /// Replaces every out-of-range field with its default and reports what was replaced.
    pub fn validated(mut self) -> (Self, Vec<ConfigError>) {
        let mut rejected = Vec::new();
        let detection = DetectionSettings::default();
        let gesture = GestureSettings::default();
        let control = SystemControlSettings::default();

        check(
            &mut rejected,
            "detection.min_detection_confidence",
            &mut self.detection.min_detection_confidence,
            detection.min_detection_confidence,
            |v| unit_interval(*v),
        );
        check(
            &mut rejected,
            "detection.min_tracking_confidence",
            &mut self.detection.min_tracking_confidence,
            detection.min_tracking_confidence,
            |v| unit_interval(*v),
        );
        check(
            &mut rejected,
            "detection.max_num_hands",
            &mut self.detection.max_num_hands,
            detection.max_num_hands,
            |v| (*v >= 1).then_some(()).ok_or_else(|| "must be at least 1".to_string()),
        );
        check(
            &mut rejected,
            "gesture_recognition.gesture_threshold",
            &mut self.gesture_recognition.gesture_threshold,
            gesture.gesture_threshold,
            |v| unit_interval(*v),
        );
        check(
            &mut rejected,
            "gesture_recognition.cooldown_period",
            &mut self.gesture_recognition.cooldown_period,
            gesture.cooldown_period,
            |v| seconds(*v),
        );
        check(
            &mut rejected,
            "gesture_recognition.smoothing_buffer_size",
            &mut self.gesture_recognition.smoothing_buffer_size,
            gesture.smoothing_buffer_size,
            |v| (*v >= 1).then_some(()).ok_or_else(|| "must be at least 1".to_string()),
        );
        check(
            &mut rejected,
            "system_control.action_cooldown",
            &mut self.system_control.action_cooldown,
            control.action_cooldown,
            |v| seconds(*v),
        );
        check(
            &mut rejected,
            "system_control.volume_step",
            &mut self.system_control.volume_step,
            control.volume_step,
            |v| {
                (1..=100)
                    .contains(v)
                    .then_some(())
                    .ok_or_else(|| "must be between 1 and 100".to_string())
            },
        );
        check(
            &mut rejected,
            "logging.log_level",
            &mut self.logging.log_level,
            LoggingSettings::default().log_level,
            |v| {
                v.parse::<LevelFilter>()
                    .map(|_| ())
                    .map_err(|_| format!("unknown level {v:?}"))
            },
        );

        (self, rejected)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        let gesture = &self.gesture_recognition;
        PipelineConfig {
            gesture_threshold: gesture.gesture_threshold,
            cooldown_period: Duration::try_from_secs_f64(gesture.cooldown_period)
                .unwrap_or(defaults.cooldown_period),
            smoothing_buffer_size: usize::try_from(gesture.smoothing_buffer_size)
                .ok()
                .filter(|size| *size >= 1)
                .unwrap_or(defaults.smoothing_buffer_size),
        }
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        let defaults = DispatchConfig::default();
        let control = &self.system_control;
        DispatchConfig {
            action_cooldown: Duration::try_from_secs_f64(control.action_cooldown)
                .unwrap_or(defaults.action_cooldown),
            volume_step: u32::try_from(control.volume_step).unwrap_or(defaults.volume_step),
            enable_audio_control: control.enable_audio_control,
        }
    }

    pub fn max_hands(&self) -> usize {
        usize::try_from(self.detection.max_num_hands).unwrap_or(1).max(1)
    }

    pub fn log_filter(&self) -> LevelFilter {
        self.logging.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

pub fn log_source(path: &Path, found: bool) {
    if found {
        log::info!("settings loaded from {}", path.display());
    } else {
        log::info!(
            "settings file {} not found, using defaults",
            path.display()
        );
    }
}

fn check<T, F>(
    rejected: &mut Vec<ConfigError>,
    field: &'static str,
    value: &mut T,
    default: T,
    valid: F,
) where
    F: Fn(&T) -> Result<(), String>,
{
    if let Err(reason) = valid(value) {
        rejected.push(ConfigError::OutOfRange { field, reason });
        *value = default;
    }
}

fn unit_interval(value: f32) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{value} is not within 0..=1"))
    }
}

fn seconds(value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{value} is not a non-negative number of seconds"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let (settings, rejected) = Settings::default().validated();
        assert!(rejected.is_empty());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn defaults_feed_pipeline_config() {
        let config = Settings::default().pipeline_config();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(Settings::default().dispatch_config(), DispatchConfig::default());
    }

    #[test]
    fn out_of_range_fields_fall_back() {
        let mut settings = Settings::default();
        settings.gesture_recognition.smoothing_buffer_size = 0;
        settings.gesture_recognition.cooldown_period = -2.0;
        settings.detection.min_detection_confidence = 1.5;
        settings.logging.log_level = "chatty".to_string();

        let (settings, rejected) = settings.validated();
        assert_eq!(rejected.len(), 4);
        assert_eq!(settings, Settings::default());

        let fields: Vec<&str> = rejected
            .iter()
            .filter_map(|err| match err {
                ConfigError::OutOfRange { field, .. } => Some(*field),
                _ => None,
            })
            .collect();
        assert!(fields.contains(&"gesture_recognition.smoothing_buffer_size"));
        assert!(fields.contains(&"gesture_recognition.cooldown_period"));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"gesture_recognition": {"cooldown_period": 2.5}}"#)
                .expect("valid json");
        assert_eq!(settings.gesture_recognition.cooldown_period, 2.5);
        assert_eq!(settings.gesture_recognition.smoothing_buffer_size, 5);
        assert_eq!(
            settings.pipeline_config().cooldown_period,
            Duration::from_millis(2_500)
        );
    }

    #[test]
    fn log_level_parses_case_insensitively() {
        let mut settings = Settings::default();
        settings.logging.log_level = "DEBUG".to_string();
        assert_eq!(settings.log_filter(), LevelFilter::Debug);
    }
}
