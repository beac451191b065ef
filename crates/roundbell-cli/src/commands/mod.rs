pub mod config;
pub mod preset;
pub mod run;
pub mod simulate;

use std::path::{Path, PathBuf};

use roundbell_core::{Config, CoreError};

/// The `--config` override, or the platform default location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, CoreError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path(),
    }
}

pub fn load_config(explicit: Option<&Path>) -> Result<Config, CoreError> {
    Config::load_from(&config_path(explicit)?)
}
