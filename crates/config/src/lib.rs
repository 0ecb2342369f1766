#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for cypack
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/cypack/config.toml)
//! - Environment variables
//! - CLI flags

use serde::{Deserialize, Serialize};

use cypack_errors::{ConfigError, Error};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub provision: ProvisionConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub color: ColorChoice,
}

/// Build stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Python interpreter driving the extension toolchain
    #[serde(default = "default_python")]
    pub python: String,

    /// Directory names pruned during traversal, in addition to
    /// detected virtual environments
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
}

/// Provisioning stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Name of the isolated environment directory created under the
    /// output tree
    #[serde(default = "default_env_dir")]
    pub env_dir: String,

    /// Skip dependency installation entirely
    #[serde(default)]
    pub skip_install: bool,
}

/// Color output preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_excluded_dirs() -> Vec<String> {
    vec!["__pycache__".to_string()]
}

fn default_env_dir() -> String {
    "venv".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::default(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            excluded_dirs: default_excluded_dirs(),
        }
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            env_dir: default_env_dir(),
            skip_install: false,
        }
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("cypack").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // CYPACK_COLOR
        if let Ok(color) = std::env::var("CYPACK_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "CYPACK_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // CYPACK_PYTHON
        if let Ok(python) = std::env::var("CYPACK_PYTHON") {
            if python.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "CYPACK_PYTHON".to_string(),
                    value: python,
                }
                .into());
            }
            self.build.python = python;
        }

        // CYPACK_SKIP_INSTALL
        if let Ok(skip) = std::env::var("CYPACK_SKIP_INSTALL") {
            self.provision.skip_install = match skip.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "CYPACK_SKIP_INSTALL".to_string(),
                        value: skip,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }
}
