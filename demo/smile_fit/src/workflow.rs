//! End-to-end smile fit: load, filter, calibrate, price, compare.

use std::path::Path;

use chrono::Utc;
use pricer_core::types::MarketObservation;
use pricer_models::models::HestonParams;
use pricer_optimiser::calibration::{CalibrationResult, HestonCalibrator};
use pricer_pricing::{
    price_batch_black_scholes, price_batch_heston, BlackScholesPricer, HestonPricer,
    PricingResult,
};
use pricer_report::{summarize_results, ChartData, ComparisonReport};
use serde::Serialize;
use tracing::info;

use crate::config::SmileFitConfig;
use crate::data;
use crate::error::DemoError;

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct SmileFitOutcome {
    /// Observations loaded before filtering.
    pub loaded: usize,
    /// Observations the models were fitted and compared on.
    pub universe: Vec<MarketObservation>,
    /// Heston calibration.
    pub calibration: CalibrationResult,
    /// Black-Scholes prices.
    pub black_scholes: Vec<PricingResult>,
    /// Heston prices at the calibrated parameters.
    pub heston: Vec<PricingResult>,
    /// Model comparison.
    pub report: ComparisonReport,
    /// Chart series for the comparison.
    pub chart: ChartData,
}

impl SmileFitOutcome {
    /// Calibrated parameters.
    pub fn params(&self) -> &HestonParams {
        &self.calibration.params
    }

    /// Write the outcome as pretty JSON.
    ///
    /// NaN prices of flagged instruments are written as `null`.
    pub fn write_json(&self, path: &Path) -> Result<(), DemoError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Smile fit workflow.
#[derive(Debug, Clone)]
pub struct SmileFitWorkflow {
    config: SmileFitConfig,
}

impl SmileFitWorkflow {
    /// Create a workflow over a validated configuration.
    pub fn new(config: SmileFitConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SmileFitConfig {
        &self.config
    }

    /// Observations from the configured CSV, or a synthetic chain.
    pub fn load_observations(&self) -> Result<Vec<MarketObservation>, DemoError> {
        match &self.config.input {
            Some(path) => {
                let valuation_time = self.config.valuation_time.unwrap_or_else(Utc::now);
                info!(path = %path.display(), %valuation_time, "loading quotes");
                data::load_quotes(path, valuation_time, self.config.rate)
            }
            None => {
                info!(symbol = %self.config.synthetic.symbol, "generating synthetic chain");
                let pricer = HestonPricer::new(self.config.pricing);
                data::synthesize(&self.config.synthetic, self.config.rate, &pricer)
            }
        }
    }

    /// Load observations and run.
    pub fn run(&self) -> Result<SmileFitOutcome, DemoError> {
        let observations = self.load_observations()?;
        self.run_on(&observations)
    }

    /// Run on the given observations.
    ///
    /// # Errors
    ///
    /// * `EmptyUniverse` - the filter rejected every observation
    /// * `Calibration` - calibration failed outright
    /// * `Report` - the comparison could not be built
    pub fn run_on(&self, observations: &[MarketObservation]) -> Result<SmileFitOutcome, DemoError> {
        let config = &self.config;
        let universe = config.filter.apply(observations);
        info!(loaded = observations.len(), kept = universe.len(), "observations filtered");
        if universe.is_empty() {
            return Err(DemoError::EmptyUniverse {
                total: observations.len(),
            });
        }

        let calibration =
            HestonCalibrator::new(config.calibration).calibrate(&universe, config.initial_guess)?;

        let bs_pricer = BlackScholesPricer::new(config.volatility);
        let heston_pricer = HestonPricer::new(config.pricing);
        let black_scholes = price_batch_black_scholes(&bs_pricer, &universe, &config.parallel);
        let heston =
            price_batch_heston(&heston_pricer, &universe, &calibration.params, &config.parallel);

        let report = summarize_results(&universe, &black_scholes, &heston, &config.report)?;
        let chart = ChartData::from_report(&report);
        info!(
            mae_bs = report.mae_bs,
            mae_heston = report.mae_heston,
            excluded = report.excluded,
            trimmed = report.trimmed,
            "comparison complete"
        );

        Ok(SmileFitOutcome {
            loaded: observations.len(),
            universe,
            calibration,
            black_scholes,
            heston,
            report,
            chart,
        })
    }
}
