//! Calibration result types.
//!
//! A [`CalibrationResult`] carries the fitted parameters, the objective at
//! those parameters and the per-instrument residuals for every observation
//! passed in, including those dropped from the fit.

use std::time::Duration;

use pricer_models::models::HestonParams;

/// Model minus market for one instrument at the fitted parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstrumentResidual {
    /// Venue instrument identifier.
    pub instrument_id: String,
    /// Market premium in quote currency.
    pub market_price: f64,
    /// Fitted model price. NaN when unpriceable.
    pub model_price: f64,
    /// model - market. NaN when unpriceable.
    pub residual: f64,
    /// Whether the instrument took part in the fit.
    pub used_in_fit: bool,
}

/// Calibration diagnostics.
///
/// Contains detailed information about the calibration process
/// for analysis and debugging.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationDiagnostics {
    /// Iterations of the winning run.
    pub iterations: usize,
    /// Objective evaluations across all runs.
    pub evaluations: usize,
    /// Additional runs from perturbed starting points.
    pub restarts_used: usize,
    /// Index of the winning run; 0 is the initial guess.
    pub winning_run: usize,
    /// Root mean squared residual over priced instruments.
    pub rmse: f64,
    /// Largest absolute residual over priced instruments.
    pub max_error: f64,
    /// Wall-clock duration.
    pub duration: Duration,
}

impl Default for CalibrationDiagnostics {
    fn default() -> Self {
        Self {
            iterations: 0,
            evaluations: 0,
            restarts_used: 0,
            winning_run: 0,
            rmse: f64::NAN,
            max_error: f64::NAN,
            duration: Duration::ZERO,
        }
    }
}

impl CalibrationDiagnostics {
    /// Fill RMSE and max error from residuals, ignoring NaN entries.
    pub fn with_residuals(mut self, residuals: &[InstrumentResidual]) -> Self {
        let finite: Vec<f64> = residuals
            .iter()
            .map(|r| r.residual)
            .filter(|r| r.is_finite())
            .collect();
        if !finite.is_empty() {
            let n = finite.len() as f64;
            self.rmse = (finite.iter().map(|e| e * e).sum::<f64>() / n).sqrt();
            self.max_error = finite.iter().map(|e| e.abs()).fold(0.0_f64, f64::max);
        }
        self
    }

    /// Check if calibration quality is acceptable.
    ///
    /// # Arguments
    ///
    /// * `tolerance` - Maximum acceptable RMSE
    pub fn is_quality_acceptable(&self, tolerance: f64) -> bool {
        self.rmse <= tolerance
    }
}

/// Heston calibration result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationResult {
    /// Fitted parameters.
    pub params: HestonParams,
    /// Objective at the fitted parameters.
    pub objective: f64,
    /// Whether the winning run met its tolerance.
    pub converged: bool,
    /// Whether the fitted parameters satisfy 2κθ ≥ σ².
    pub feller_satisfied: bool,
    /// One entry per input observation, in input order.
    pub residuals: Vec<InstrumentResidual>,
    /// Instruments dropped because they failed at the initial guess.
    pub dropped: Vec<String>,
    /// Run diagnostics.
    pub diagnostics: CalibrationDiagnostics,
}

impl CalibrationResult {
    /// Get the calibrated parameters.
    pub fn params(&self) -> &HestonParams {
        &self.params
    }

    /// Residuals as plain numbers, NaN for unpriceable instruments.
    pub fn residual_values(&self) -> Vec<f64> {
        self.residuals.iter().map(|r| r.residual).collect()
    }

    /// Get the RMSE of the calibration.
    pub fn rmse(&self) -> f64 {
        self.diagnostics.rmse
    }
}
