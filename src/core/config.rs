//! Configuration module for `degree-forecast`

use crate::core::simulation::{check_stddev, SimulationOptions, DEFAULT_SIMULATIONS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Placeholder expanded to the application config directory
const DIR_VARIABLE: &str = "$DEGREE_FORECAST";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Monte Carlo configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of trials (0 means "use the default")
    #[serde(default)]
    pub count: usize,
    /// Fixed seed for reproducible runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Override for the fitted noise scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,
}

/// Paths configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Gradebook file read when none is given on the command line
    #[serde(default)]
    pub units_file: String,
    /// Directory the distribution chart is written to
    #[serde(default)]
    pub charts_dir: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Simulation settings
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override simulation count
    pub simulations: Option<usize>,
    /// Override simulation seed
    pub seed: Option<u64>,
    /// Override simulation noise scale
    pub stddev: Option<f64>,
    /// Override default gradebook file
    pub units_file: Option<String>,
    /// Override chart output directory
    pub charts_dir: Option<String>,
}

fn parse_optional<T: std::str::FromStr>(key: &str, value: &str) -> Result<Option<T>, String> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    value
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| format!("Invalid value for '{key}': '{value}'"))
}

fn display_optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Config {
    /// Get the `$DEGREE_FORECAST` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/degreeforecast`
    /// - macOS: `~/Library/Application Support/degreeforecast`
    /// - Windows: `%APPDATA%\degreeforecast`
    #[must_use]
    pub fn get_app_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("degreeforecast")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Used when loading configuration so that fields introduced by a newer
    /// release pick up their default values. Only fields that are empty (or
    /// zero) here and set in `defaults` are updated.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    #[allow(clippy::useless_let_if_seq)]
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        if self.logging.level.is_empty() && !defaults.logging.level.is_empty() {
            self.logging.level.clone_from(&defaults.logging.level);
            changed = true;
        }
        if self.logging.file.is_empty() && !defaults.logging.file.is_empty() {
            self.logging.file.clone_from(&defaults.logging.file);
            changed = true;
        }

        if self.simulation.count == 0 && defaults.simulation.count != 0 {
            self.simulation.count = defaults.simulation.count;
            changed = true;
        }

        if self.paths.units_file.is_empty() && !defaults.paths.units_file.is_empty() {
            self.paths.units_file.clone_from(&defaults.paths.units_file);
            changed = true;
        }
        if self.paths.charts_dir.is_empty() && !defaults.paths.charts_dir.is_empty() {
            self.paths.charts_dir.clone_from(&defaults.paths.charts_dir);
            changed = true;
        }

        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Command-line values replace config file values for this run only; the
    /// configuration file is not modified. `None` fields leave the config as is.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut config = Config::load();
    /// let overrides = ConfigOverrides {
    ///     simulations: Some(500),
    ///     ..Default::default()
    /// };
    /// config.apply_overrides(&overrides);
    /// ```
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }

        if let Some(count) = overrides.simulations {
            self.simulation.count = count;
        }
        if overrides.seed.is_some() {
            self.simulation.seed = overrides.seed;
        }
        if overrides.stddev.is_some() {
            self.simulation.stddev = overrides.stddev;
        }

        if let Some(units_file) = &overrides.units_file {
            self.paths.units_file.clone_from(units_file);
        }
        if let Some(charts_dir) = &overrides.charts_dir {
            self.paths.charts_dir.clone_from(charts_dir);
        }
    }

    /// Simulation tunables described by this config
    ///
    /// A zero count falls back to [`DEFAULT_SIMULATIONS`].
    #[must_use]
    pub fn simulation_options(&self) -> SimulationOptions {
        SimulationOptions {
            simulations: if self.simulation.count == 0 {
                DEFAULT_SIMULATIONS
            } else {
                self.simulation.count
            },
            stddev: self.simulation.stddev,
        }
    }

    /// Get the user config file path
    ///
    /// `config.toml` for release builds, `dconfig.toml` for debug builds, inside
    /// the directory returned by [`get_app_dir`](Self::get_app_dir).
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_app_dir().join(CONFIG_FILE_NAME)
    }

    /// Expand `$DEGREE_FORECAST` in a string to the application directory
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let app_dir = Self::get_app_dir();
            value.replace(DIR_VARIABLE, app_dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Missing fields fall back to their serde defaults. `$DEGREE_FORECAST` is
    /// expanded in path values.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.paths.units_file = Self::expand_variables(&config.paths.units_file);
        config.paths.charts_dir = Self::expand_variables(&config.paths.charts_dir);

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML. The
    /// defaults are compiled into the binary and covered by tests.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from file, or create it from defaults if not found
    ///
    /// - Existing file: loaded, missing fields merged from defaults and saved back
    /// - No file (first run): directory created, defaults saved and returned
    ///
    /// Falls back to defaults if the file exists but cannot be read or parsed.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(&config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save();
                    }
                    return config;
                }
            }
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Save configuration to the platform-specific config file
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized, the directory cannot
    /// be created or the file cannot be written
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_file = Self::get_config_file_path();
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&config_file, toml_str)?;
        Ok(())
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `simulations`, `seed`,
    /// `stddev`, `units_file`, `charts_dir`. Unset optional values are returned
    /// as an empty string.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "level" => Some(self.logging.level.clone()),
            "file" => Some(self.logging.file.clone()),
            "verbose" => Some(self.logging.verbose.to_string()),
            "simulations" | "count" => Some(self.simulation.count.to_string()),
            "seed" => Some(display_optional(self.simulation.seed)),
            "stddev" => Some(display_optional(self.simulation.stddev)),
            "units_file" | "units-file" => Some(self.paths.units_file.clone()),
            "charts_dir" | "charts-dir" => Some(self.paths.charts_dir.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// Updates the in-memory config; call [`save()`](Config::save) to persist.
    /// An empty value clears `seed` and `stddev`.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized or the value cannot be
    /// parsed for that key
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "level" => self.logging.level = value.to_string(),
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("Invalid boolean value for 'verbose': '{value}'"))?;
            }
            "simulations" | "count" => {
                self.simulation.count = value
                    .parse::<usize>()
                    .ok()
                    .filter(|count| *count > 0)
                    .ok_or_else(|| format!("Invalid simulation count: '{value}'"))?;
            }
            "seed" => self.simulation.seed = parse_optional(key, value)?,
            "stddev" => {
                let stddev: Option<f64> = parse_optional(key, value)?;
                self.simulation.stddev = stddev
                    .map(check_stddev)
                    .transpose()
                    .map_err(|e| format!("Invalid value for 'stddev': {e}"))?;
            }
            "units_file" | "units-file" => self.paths.units_file = value.to_string(),
            "charts_dir" | "charts-dir" => self.paths.charts_dir = value.to_string(),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to its default)
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match key {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "simulations" | "count" => self.simulation.count = defaults.simulation.count,
            "seed" => self.simulation.seed = defaults.simulation.seed,
            "stddev" => self.simulation.stddev = defaults.simulation.stddev,
            "units_file" | "units-file" => self
                .paths
                .units_file
                .clone_from(&defaults.paths.units_file),
            "charts_dir" | "charts-dir" => self
                .paths
                .charts_dir
                .clone_from(&defaults.paths.charts_dir),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults by deleting the config file
    ///
    /// The next [`load()`](Config::load) recreates it from defaults. Succeeds
    /// without doing anything when no file exists.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be deleted
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[simulation]")?;
        writeln!(f, "  count = {}", self.simulation.count)?;
        writeln!(f, "  seed = \"{}\"", display_optional(self.simulation.seed))?;
        writeln!(f, "  stddev = \"{}\"", display_optional(self.simulation.stddev))?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  units_file = \"{}\"", self.paths.units_file)?;
        writeln!(f, "  charts_dir = \"{}\"", self.paths.charts_dir)?;

        Ok(())
    }
}
