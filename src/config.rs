//! TOML configuration.
//!
//! Every section and field is optional; a missing file section falls back to
//! [`Config::default`].

use crate::core::error::ConfigError;
use crate::core::resolve::FolderPaths;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host folders used for file resolution
    pub folders: FolderConfig,
    /// Batch creator settings
    pub create: CreateConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Host folder locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    /// Folder for uploaded inputs
    pub input: PathBuf,
    /// Folder for saved outputs
    pub output: PathBuf,
    /// Folder for temporary files
    pub temp: PathBuf,
}

/// Batch creator settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateConfig {
    /// Filter used when resizing file items
    pub resample: ResampleFilter,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset
    pub level: String,
}

/// Resampling filter for resizing file items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    /// The matching `image` crate filter.
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Default for FolderConfig {
    fn default() -> Self {
        let folders = FolderPaths::default();
        Self {
            input: folders.input,
            output: folders.output,
            temp: folders.temp,
        }
    }
}

impl FolderConfig {
    /// Folder paths for file resolution.
    pub fn to_folder_paths(&self) -> FolderPaths {
        FolderPaths::new(&self.input, &self.output, &self.temp)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse config from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}
