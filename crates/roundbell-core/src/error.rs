//! Core error types for roundbell-core.
//!
//! Control misuse (pausing an idle timer, starting a running one) is never an
//! error; those calls are no-ops. Errors here cover configuration, preset
//! validation and the cue collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for roundbell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Preset validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML write errors
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Unknown preset name
    #[error("Unknown preset '{0}' (expected single, two-phase or custom)")]
    UnknownPreset(String),

    /// No config directory on this platform
    #[error("Could not determine a configuration directory")]
    NoConfigDir,
}

/// Preset validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Zero-length phase or session
    #[error("Duration for '{field}' must be greater than zero")]
    ZeroDuration { field: String },

    /// A trigger outside the phase
    #[error("Mark {mark}s in {phase} phase must be between 1 and {duration_secs}s (exclusive)")]
    MarkOutOfRange {
        phase: String,
        mark: u32,
        duration_secs: u32,
    },

    /// Triggers must strictly descend
    #[error("Marks in {phase} phase must be strictly descending")]
    MarksNotDescending { phase: String },

    /// Bitmask capacity exceeded
    #[error("{phase} phase has {count} marks, at most {max} are supported")]
    TooManyMarks {
        phase: String,
        count: usize,
        max: usize,
    },
}

/// Failures raised by audio and speech collaborators.
///
/// These never reach the caller of the engine: the cue dispatcher logs and
/// drops them.
#[derive(Error, Debug)]
pub enum CueError {
    /// Output backend missing on this machine
    #[error("{0} output is not available")]
    Unavailable(&'static str),

    /// Tone output used before a user-initiated start
    #[error("Audio output is locked until the session is started")]
    Locked,

    /// Backend process or device failure
    #[error("Cue backend failed: {0}")]
    Backend(String),

    /// IO errors from the backend
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
