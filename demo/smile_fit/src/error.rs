//! Error types for the smile fit demo.

use pricer_core::types::PricingError;
use pricer_optimiser::CalibrationError;
use pricer_report::ReportError;
use thiserror::Error;

/// Demo error type
#[derive(Debug, Error)]
pub enum DemoError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Data loading error
    #[error("Data loading error: {0}")]
    DataLoad(String),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing survived the observation filter
    #[error("No observations left after filtering ({total} loaded)")]
    EmptyUniverse {
        /// Observations before filtering
        total: usize,
    },

    /// Pricing error outside a batch
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Calibration failure
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    /// Report construction failure
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

impl DemoError {
    /// Create a data loading error
    pub fn data_load(msg: impl Into<String>) -> Self {
        Self::DataLoad(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DemoError::data_load("row 3: unknown option type");
        assert!(err.to_string().contains("row 3"));
        let err = DemoError::EmptyUniverse { total: 12 };
        assert!(err.to_string().contains("12 loaded"));
    }

    #[test]
    fn test_calibration_error_converts() {
        let err: DemoError = CalibrationError::EmptyObservations.into();
        assert!(matches!(err, DemoError::Calibration(_)));
    }
}
