//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/repostress/repostress.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `REPOSTRESS__*` (`__` separates nested keys)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{ContainerConvention, RenamePolicy};

/// Stress run defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StressSettings {
    /// Rename actions per run
    pub iterations: usize,
    /// Worker threads
    pub threads: usize,
}

impl Default for StressSettings {
    fn default() -> Self {
        Self {
            iterations: 100,
            threads: 4,
        }
    }
}

/// Unified configuration for repostress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Seed for all pseudo-random choices; None draws a fresh seed per run
    pub seed: Option<u64>,
    /// Candidate search bounds
    pub rename: RenamePolicy,
    /// Naming scope and content lookup
    pub convention: ContainerConvention,
    pub stress: StressSettings,
}

/// Get the XDG config directory for repostress.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "repostress").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("repostress.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file; it must exist when given
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&Settings::default()).map_err(config_err)?);

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(path) = explicit {
            let path = expand_path(path);
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("REPOSTRESS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Configured seed, or a fresh random one.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# repostress configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/repostress/repostress.toml
#   Explicit: --config <file>
#   Env:      REPOSTRESS__* (e.g. REPOSTRESS__RENAME__MAX_ATTEMPTS=10)

# Seed for reproducible runs (omit for a random seed per run)
# seed = 42

[rename]
# Give up after this many candidates (0 = never give up)
# max_attempts = 100
# Add one suffix digit after this many consecutive collisions (0 = never)
# widen_after = 20
# Maximum suffix digits
# max_width = 4

[convention]
# Parent hops from the renamed node to the naming scope
# scope_depth = 2
# What a rename resolves to: "like-named-child" or "container"
# content = "like-named-child"

[stress]
# iterations = 100
# threads = 4
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
