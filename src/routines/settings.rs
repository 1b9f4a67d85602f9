use config::Config as eConfig;
use eyre::{bail, Result, WrapErr};
use serde::Deserialize;
use serde_derive::Serialize;
use std::path::{Path, PathBuf};

use crate::routines::optimization::nelder_mead::DEFAULT_TOLERANCE;

/// Runtime settings, read from a TOML file with environment overrides
#[derive(Debug, Deserialize, Clone, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub optimizer: Optimizer,
    #[serde(default)]
    pub weibull: Weibull,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub output: Output,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Optimizer {
    /// Convergence tolerance on the standard deviation of the simplex costs
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for Optimizer {
    fn default() -> Self {
        Optimizer {
            tolerance: default_tolerance(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    NelderMead,
    Grid,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Weibull {
    #[serde(default)]
    pub method: Method,
    /// Half-width of the grid search in steps; the step is `0.5 / precision`
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for Weibull {
    fn default() -> Self {
        Weibull {
            method: Method::default(),
            precision: default_precision(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file name, relative to the output folder
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Output {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_false")]
    pub write: bool,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            path: default_output_path(),
            write: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.optimizer.tolerance = tolerance;
    }

    pub fn set_method(&mut self, method: Method) {
        self.weibull.method = method;
    }

    pub fn set_precision(&mut self, precision: usize) {
        self.weibull.precision = precision;
    }

    pub fn set_output_path(&mut self, path: impl Into<String>) {
        self.output.path = path.into();
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.optimizer.tolerance > 0.0) {
            bail!(
                "optimizer.tolerance must be positive, got {}",
                self.optimizer.tolerance
            );
        }
        if self.weibull.method == Method::Grid && self.weibull.precision == 0 {
            bail!("weibull.precision must be at least 1 for the grid method");
        }
        Ok(())
    }

    /// Serialize the settings as JSON into the output folder
    pub fn write(&self) -> Result<PathBuf> {
        let serialized =
            serde_json::to_string_pretty(self).wrap_err("Failed to serialize settings")?;

        let path = Path::new(&self.output.path).join("settings.json");
        std::fs::create_dir_all(&self.output.path)
            .wrap_err_with(|| format!("Failed to create output folder {}", self.output.path))?;
        std::fs::write(&path, serialized)
            .wrap_err_with(|| format!("Failed to write settings to {:?}", path))?;
        Ok(path)
    }
}

/// Read settings from a TOML file.
///
/// Values can be overridden with environment variables prefixed with
/// `SIMPLEXFIT`, e.g. `SIMPLEXFIT_OPTIMIZER_TOLERANCE=1e-10`.
pub fn read_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let parsed = eConfig::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .add_source(config::Environment::with_prefix("SIMPLEXFIT").separator("_"))
        .build()
        .wrap_err_with(|| format!("Failed to read settings from {:?}", path))?;

    let settings: Settings = parsed
        .try_deserialize()
        .wrap_err("Failed to parse settings")?;
    settings.validate()?;

    Ok(settings)
}

// *********************************
// Default values for deserializing
// *********************************
fn default_false() -> bool {
    false
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_precision() -> usize {
    50
}

fn default_output_path() -> String {
    "outputs".to_string()
}
