// std imports
use std::include_str;
use std::path::{Path, PathBuf};

// third-party imports
use config::{Config, File, FileFormat};
use serde::Deserialize;

// local imports
use crate::error::Result;
use crate::field::TIME_FORMAT;

// ---

static DEFAULT_SETTINGS: &str = include_str!("../etc/defaults/config.yaml");

// ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    pub concurrency: Option<usize>,
    pub format: String,
    pub queue_capacity: usize,
    pub time_format: String,
}

impl Settings {
    /// Loads settings from the embedded defaults overlaid with the given files in order.
    pub fn load(files: impl IntoIterator<Item = SourceFile>) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Yaml));
        for file in files {
            log::debug!("add configuration source {:?} required={}", file.path, file.required);
            builder = builder.add_source(File::from(file.path.as_path()).required(file.required));
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrency: None,
            format: "combined".into(),
            queue_capacity: 1024,
            time_format: TIME_FORMAT.into(),
        }
    }
}

// ---

/// Configuration file to load settings from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    required: bool,
}

impl SourceFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().into(),
            required: true,
        }
    }

    pub fn required(self, required: bool) -> Self {
        Self { required, ..self }
    }
}
