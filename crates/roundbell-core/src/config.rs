//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Which preset to run, and the durations of a custom preset
//! - Speech and tone output settings
//! - Celebration settings
//! - Countdown colour thresholds
//!
//! Configuration is stored at `<config dir>/roundbell/config.toml`.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::cue::VoiceSettings;
use crate::error::{ConfigError, Result};
use crate::timer::{PhaseSpec, Preset, UrgencyThresholds};

/// Durations for `preset = "custom"`. `rest_secs = 0` means single-phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPresetConfig {
    #[serde(default = "default_work_secs")]
    pub work_secs: u32,
    #[serde(default)]
    pub rest_secs: u32,
    #[serde(default = "default_session_secs")]
    pub session_secs: u32,
    #[serde(default = "default_work_marks")]
    pub work_marks: Vec<u32>,
    #[serde(default = "default_countdown_marks")]
    pub rest_marks: Vec<u32>,
}

/// Speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Program and leading arguments; the phrase is appended. Empty prints
    /// the phrase instead.
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default = "default_rate")]
    pub rate: f32,
    #[serde(default = "default_one")]
    pub pitch: f32,
    #[serde(default = "default_one")]
    pub volume: f32,
}

/// Tone configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Player reading a WAV file on stdin, e.g. `["aplay", "-q"]`. Empty
    /// rings the terminal bell.
    #[serde(default)]
    pub player: Vec<String>,
    /// Percent.
    #[serde(default = "default_volume")]
    pub volume: u32,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

/// Celebration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelebrationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Fixed seed for reproducible effects; random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

/// Countdown display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_warning_secs")]
    pub warning_secs: u32,
    #[serde(default = "default_critical_secs")]
    pub critical_secs: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<config dir>/roundbell/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `single`, `two-phase` or `custom`.
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default)]
    pub custom: CustomPresetConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub celebration: CelebrationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Tone sample rates accepted by `config set`, in Hz.
pub const SAMPLE_RATES: RangeInclusive<u32> = 8000..=192_000;

// Default functions
fn default_preset() -> String {
    "single".into()
}
fn default_work_secs() -> u32 {
    180
}
fn default_session_secs() -> u32 {
    2700
}
fn default_work_marks() -> Vec<u32> {
    vec![120, 60, 5, 4, 3, 2, 1]
}
fn default_countdown_marks() -> Vec<u32> {
    vec![5, 4, 3, 2, 1]
}
fn default_true() -> bool {
    true
}
fn default_rate() -> f32 {
    0.95
}
fn default_one() -> f32 {
    1.0
}
fn default_volume() -> u32 {
    80
}
fn default_sample_rate() -> u32 {
    22050
}
fn default_frame_rate() -> u32 {
    30
}
fn default_warning_secs() -> u32 {
    10
}
fn default_critical_secs() -> u32 {
    5
}

impl Default for CustomPresetConfig {
    fn default() -> Self {
        Self {
            work_secs: default_work_secs(),
            rest_secs: 0,
            session_secs: default_session_secs(),
            work_marks: default_work_marks(),
            rest_marks: default_countdown_marks(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: Vec::new(),
            rate: default_rate(),
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            player: Vec::new(),
            volume: default_volume(),
            sample_rate: default_sample_rate(),
        }
    }
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: None,
            frame_rate: default_frame_rate(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            warning_secs: default_warning_secs(),
            critical_secs: default_critical_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            custom: CustomPresetConfig::default(),
            speech: SpeechConfig::default(),
            audio: AudioConfig::default(),
            celebration: CelebrationConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Returns `<config dir>/roundbell[-dev]/` based on ROUNDBELL_ENV.
///
/// Set ROUNDBELL_ENV=dev to use a separate development directory.
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let env = std::env::var("ROUNDBELL_ENV").unwrap_or_else(|_| "production".to_string());
    Ok(if env == "dev" {
        base.join("roundbell-dev")
    } else {
        base.join("roundbell")
    })
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn parse_leaf(key: &str, existing: &serde_json::Value, value: &str) -> Result<serde_json::Value> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let parsed = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else if let Ok(n) = value.parse::<f64>() {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                } else {
                    return Err(invalid(format!("cannot parse '{value}' as number")).into());
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            // Unset optional: take numbers and bools literally, else a string.
            serde_json::Value::Null => serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.into())),
            serde_json::Value::String(_) => serde_json::Value::String(value.into()),
        };
        Ok(parsed)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;
                let new_value = Self::parse_leaf(key, existing, value)?;
                obj.insert(part.to_string(), new_value);
                return Ok(());
            }
            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown().into())
    }

    /// Default location of the config file.
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from `path`, writing and returning defaults if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Persist to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value doesn't fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        if !SAMPLE_RATES.contains(&updated.audio.sample_rate) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!(
                    "audio.sample_rate must be between {} and {} Hz",
                    SAMPLE_RATES.start(),
                    SAMPLE_RATES.end()
                ),
            }
            .into());
        }
        *self = updated;
        Ok(())
    }

    /// Resolve the configured preset and validate it.
    pub fn resolve_preset(&self) -> Result<Preset> {
        let preset = match self.preset.as_str() {
            "custom" => {
                let c = &self.custom;
                let rest = (c.rest_secs > 0).then(|| PhaseSpec::new(c.rest_secs, c.rest_marks.clone()));
                Preset::new(
                    "custom",
                    PhaseSpec::new(c.work_secs, c.work_marks.clone()),
                    rest,
                    c.session_secs,
                )?
            }
            name => Preset::by_name(name).ok_or_else(|| ConfigError::UnknownPreset(name.into()))?,
        };
        Ok(preset)
    }

    pub fn voice(&self) -> VoiceSettings {
        VoiceSettings {
            rate: self.speech.rate,
            pitch: self.speech.pitch,
            volume: self.speech.volume,
        }
    }

    pub fn thresholds(&self) -> UrgencyThresholds {
        UrgencyThresholds {
            warning_secs: self.display.warning_secs,
            critical_secs: self.display.critical_secs,
        }
    }
}
