// std imports
use std::path::{Path, PathBuf};

// local imports
use crate::error::Result;
use crate::settings::{Settings, SourceFile};

// ---

pub const APP_NAME: &str = "axe";

/// Location of the per-user configuration file, e.g. `~/.config/axe/config.yaml`.
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.yaml"))
}

/// Loads settings from the given configuration file, or from the per-user one if it exists.
pub fn load(custom: Option<&Path>) -> Result<Settings> {
    match custom {
        Some(path) => Settings::load([SourceFile::new(path)]),
        None => Settings::load(default_config_file().map(|path| SourceFile::new(path).required(false))),
    }
}
