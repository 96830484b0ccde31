//! Demo configuration management.
//!
//! Loads the run configuration from a TOML file, then applies
//! `SMILE_FIT_*` environment variable overrides. Every section is optional;
//! missing values take the library defaults.

use chrono::{DateTime, Utc};
use pricer_core::types::ObservationFilter;
use pricer_models::models::HestonParams;
use pricer_optimiser::calibration::HestonCalibratorConfig;
use pricer_pricing::{HestonPricerConfig, ParallelConfig, VolatilitySource};
use pricer_report::ReportConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "smile_fit.toml";

/// Synthetic option chain used when no input file is given.
///
/// Premia are Heston prices at `params` with multiplicative log-normal
/// noise, quoted in units of the underlying like a crypto venue.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Underlying symbol.
    pub symbol: String,
    /// Underlying spot in quote currency.
    pub spot: f64,
    /// Parameters generating the chain.
    pub params: HestonParams,
    /// Strikes as multiples of spot. Below 1 quotes puts, otherwise calls.
    pub moneyness: Vec<f64>,
    /// Maturities in days.
    pub maturities_days: Vec<u32>,
    /// Standard deviation of the log price noise.
    pub noise: f64,
    /// Noise RNG seed.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC".to_string(),
            spot: 50_000.0,
            params: HestonParams {
                v0: 0.42,
                theta: 0.36,
                kappa: 2.5,
                sigma: 0.9,
                rho: -0.25,
            },
            moneyness: vec![0.6, 0.75, 0.9, 1.0, 1.1, 1.25, 1.5, 2.0],
            maturities_days: vec![30, 60, 91, 182, 365],
            noise: 0.02,
            seed: 7,
        }
    }
}

/// Demo configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmileFitConfig {
    /// Quote CSV. `None` runs on a synthetic chain.
    pub input: Option<PathBuf>,

    /// JSON report destination.
    pub output: PathBuf,

    /// Log level when `RUST_LOG` is unset.
    pub log_level: String,

    /// Valuation time for absolute expiries. Defaults to now.
    pub valuation_time: Option<DateTime<Utc>>,

    /// Continuously compounded risk-free rate.
    pub rate: f64,

    /// Calibration starting point.
    pub initial_guess: HestonParams,

    /// Black-Scholes volatility source.
    pub volatility: VolatilitySource,

    /// Calibration universe filter.
    pub filter: ObservationFilter,

    /// Calibrator settings.
    pub calibration: HestonCalibratorConfig,

    /// Heston pricer used for the final comparison.
    pub pricing: HestonPricerConfig,

    /// Batch pricing parallelism.
    pub parallel: ParallelConfig,

    /// Report settings.
    pub report: ReportConfig,

    /// Synthetic chain settings.
    pub synthetic: SyntheticConfig,
}

impl Default for SmileFitConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: PathBuf::from("smile_fit_report.json"),
            log_level: "info".to_string(),
            valuation_time: None,
            rate: 0.0,
            initial_guess: HestonParams::default(),
            volatility: VolatilitySource::default(),
            filter: ObservationFilter::default(),
            calibration: HestonCalibratorConfig::default(),
            pricing: HestonPricerConfig::default(),
            parallel: ParallelConfig::default(),
            report: ReportConfig::default().with_outlier_quantile(0.975),
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl SmileFitConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load `path` when it exists, otherwise the defaults.
    ///
    /// A file that exists but fails to parse is an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides
    pub fn with_env_override(mut self) -> Self {
        if let Ok(input) = std::env::var("SMILE_FIT_INPUT") {
            self.input = Some(PathBuf::from(input));
        }

        if let Ok(output) = std::env::var("SMILE_FIT_OUTPUT") {
            self.output = PathBuf::from(output);
        }

        if let Ok(log_level) = std::env::var("SMILE_FIT_LOG_LEVEL") {
            self.log_level = log_level;
        }

        if let Some(rate) = env_parse("SMILE_FIT_RATE") {
            self.rate = rate;
        }

        if let Some(restarts) = env_parse("SMILE_FIT_MAX_RESTARTS") {
            self.calibration.max_restarts = restarts;
        }

        if let Some(seed) = env_parse("SMILE_FIT_SEED") {
            self.calibration.seed = seed;
            self.synthetic.seed = seed;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, valid_log_levels
            ));
        }

        if self.output.as_os_str().is_empty() {
            errors.push("output cannot be empty".to_string());
        }

        if !self.rate.is_finite() {
            errors.push(format!("rate must be finite, got {}", self.rate));
        }

        if let VolatilitySource::Fixed(vol) = self.volatility {
            if !vol.is_finite() || vol < 0.0 {
                errors.push(format!("fixed volatility must be non-negative, got {}", vol));
            }
        }

        if let Err(e) = self.initial_guess.validate() {
            errors.push(format!("initial_guess: {}", e));
        }
        if let Err(e) = self.calibration.validate() {
            errors.push(format!("calibration: {}", e));
        }
        if let Err(e) = self.pricing.validate() {
            errors.push(format!("pricing: {}", e));
        }
        if let Err(e) = self.report.validate() {
            errors.push(format!("report: {}", e));
        }

        // Synthetic chain only matters without an input file
        if self.input.is_none() {
            let synthetic = &self.synthetic;
            if !(synthetic.spot.is_finite() && synthetic.spot > 0.0) {
                errors.push(format!("synthetic spot must be positive, got {}", synthetic.spot));
            }
            if let Err(e) = synthetic.params.validate() {
                errors.push(format!("synthetic params: {}", e));
            }
            if synthetic.moneyness.is_empty() || synthetic.moneyness.iter().any(|m| !(*m > 0.0)) {
                errors.push("synthetic moneyness must be a non-empty list of positive values".to_string());
            }
            if synthetic.maturities_days.is_empty() || synthetic.maturities_days.contains(&0) {
                errors.push("synthetic maturities_days must be a non-empty list of positive days".to_string());
            }
            if !(synthetic.noise.is_finite() && synthetic.noise >= 0.0) {
                errors.push(format!("synthetic noise must be non-negative, got {}", synthetic.noise));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from file with environment overrides and validate
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_or_default(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Configuration error type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(String),
    /// Parse error in config file
    #[error("Parse error: {0}")]
    Parse(String),
    /// Validation error
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
