//! Smile Fit Demo CLI
//!
//! Entry point for calibrating Heston to an option chain and comparing it
//! with Black-Scholes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use smile_fit::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Calibrate Heston to a crypto option chain and compare with Black-Scholes
#[derive(Parser)]
#[command(name = "smile-fit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Quote CSV (overrides the configuration)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Ignore any configured input and use a synthetic chain
    #[arg(long, conflicts_with = "input")]
    synthetic: bool,

    /// Report destination
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Calibration restarts
    #[arg(long)]
    max_restarts: Option<usize>,

    /// Seed for restarts and synthetic noise
    #[arg(long)]
    seed: Option<u64>,

    /// Number of worst Heston fits to print
    #[arg(long, default_value_t = 5)]
    worst: usize,
}

impl Cli {
    fn apply(&self, mut config: SmileFitConfig) -> SmileFitConfig {
        if let Some(input) = &self.input {
            config.input = Some(input.clone());
        }
        if self.synthetic {
            config.input = None;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(restarts) = self.max_restarts {
            config.calibration.max_restarts = restarts;
        }
        if let Some(seed) = self.seed {
            config.calibration.seed = seed;
            config.synthetic.seed = seed;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SmileFitConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?
        .with_env_override();
    let config = cli.apply(config);
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("smile_fit={0},pricer={0}", config.log_level)))?;
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("Smile Fit Demo Starting...");

    let workflow = SmileFitWorkflow::new(config);
    let outcome = workflow.run()?;
    let output = &workflow.config().output;
    outcome
        .write_json(output)
        .with_context(|| format!("writing {}", output.display()))?;

    let p = outcome.params();
    println!(
        "Heston: v0={:.4} theta={:.4} kappa={:.4} sigma={:.4} rho={:.4} (feller {})",
        p.v0,
        p.theta,
        p.kappa,
        p.sigma,
        p.rho,
        if outcome.calibration.feller_satisfied { "ok" } else { "violated" }
    );
    println!(
        "Instruments: {} loaded, {} fitted, {} excluded, {} trimmed",
        outcome.loaded,
        outcome.universe.len(),
        outcome.report.excluded,
        outcome.report.trimmed
    );
    println!(
        "MAE  black_scholes={:.2} heston={:.2}",
        outcome.report.mae_bs, outcome.report.mae_heston
    );
    println!(
        "Bias black_scholes={:.2} heston={:.2}",
        outcome.report.bias_bs, outcome.report.bias_heston
    );
    for row in outcome.report.largest_heston_errors(cli.worst) {
        println!(
            "  {:<28} market={:>10.2} heston={:>10.2} bs={:>10.2}",
            row.instrument_id.as_deref().unwrap_or("-"),
            row.market,
            row.heston,
            row.black_scholes
        );
    }
    println!("Report written to {}", output.display());

    Ok(())
}
