//! Configuration utilities for the simulation runner and its systems.

use std::time::Duration;

use semver::Version;
use serde::Deserialize;
use thiserror::Error;

pub use element::Element;

mod element;

pub const ENGINE_NAME: &str = env!("CARGO_CRATE_NAME", "library must be compiled by Cargo");

const ENGINE_VERSION_STR: &str = env!("CARGO_PKG_VERSION", "library must be compiled by Cargo");
lazy_static::lazy_static! {
    pub static ref ENGINE_VERSION: Version = ENGINE_VERSION_STR
        .parse()
        .expect("crate version is valid semver");
}

/// Error that can happen when loading [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("step size must be a positive duration, got {0} seconds")]
    InvalidStepSize(f64),
}

/// This struct represents general configuration of the simulation.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ConfigFile")]
pub struct Config {
    name: String,
    version: Version,
    step_size: Duration,
    start_paused: bool,
    iterations: Option<u64>,
}

/// Configuration as written in TOML, before validation.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    name: String,
    version: Version,
    /// Simulated seconds per tick.
    step_size: f64,
    start_paused: bool,
    iterations: Option<u64>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let config = Config::default();
        Self {
            name: config.name,
            version: config.version,
            step_size: config.step_size.as_secs_f64(),
            start_paused: config.start_paused,
            iterations: config.iterations,
        }
    }
}

impl TryFrom<ConfigFile> for Config {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let step_size = Duration::try_from_secs_f64(file.step_size)
            .ok()
            .filter(|step_size| !step_size.is_zero())
            .ok_or(ConfigError::InvalidStepSize(file.step_size))?;
        Ok(Self {
            name: file.name,
            version: file.version,
            step_size,
            start_paused: file.start_paused,
            iterations: file.iterations,
        })
    }
}

impl Config {
    /// Creates new configuration with given name, version and step size.
    pub fn new(name: String, version: Version, step_size: Duration) -> Self {
        Self {
            name,
            version,
            step_size,
            start_paused: false,
            iterations: None,
        }
    }

    /// Parses configuration from TOML text. Missing keys take default values.
    ///
    /// # Errors
    ///
    /// An error is returned if the text is not valid TOML of expected shape
    /// or if the step size is not a positive duration.
    ///
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        Self::try_from(file)
    }

    /// Makes the simulation start in paused state.
    pub fn with_start_paused(mut self, start_paused: bool) -> Self {
        self.start_paused = start_paused;
        self
    }

    /// Limits how many ticks [`Simulation::run`](crate::app::Simulation::run) performs
    /// when called without explicit limit.
    pub fn with_iterations(mut self, iterations: Option<u64>) -> Self {
        self.iterations = iterations;
        self
    }

    /// Name of your simulation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semver version of your simulation.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Simulated time of one tick.
    pub fn step_size(&self) -> Duration {
        self.step_size
    }

    /// If simulation starts paused.
    pub fn start_paused(&self) -> bool {
        self.start_paused
    }

    /// Default count of ticks to run, if limited.
    pub fn iterations(&self) -> Option<u64> {
        self.iterations
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            "default".to_string(),
            Version::new(0, 0, 0),
            Duration::from_millis(1),
        )
    }
}
