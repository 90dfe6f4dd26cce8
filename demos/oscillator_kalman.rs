//! Kalman filtering of a forced harmonic oscillator observed through its position.
//!
//! Prints the true state, the measurement, the Kalman estimate and the finite difference velocity as CSV.

use std::path::PathBuf;

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

use lq_estimate::config::Scenario;
use lq_estimate::error::EstimateError;
use lq_estimate::simulation::oscillator::OscillatorScenario;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario TOML file, the course defaults when absent
    #[arg(short, long)]
    scenario: Option<PathBuf>,
}

fn main() -> Result<(), EstimateError> {
    env_logger::init();
    let cli = Cli::parse();
    let scenario = match &cli.scenario {
        Some(path) => Scenario::from_file(path)?,
        None => Scenario::default(),
    };

    let oscillator = OscillatorScenario::from_config(&scenario.oscillator)?;
    let mut rng = StdRng::seed_from_u64(scenario.oscillator.seed);
    let run = oscillator.run(&mut rng)?;

    println!("t,x1,x2,y,xhat1,xhat2,fd2");
    for (t, estimate) in run.estimates.iter().enumerate() {
        let x = &run.record.x[t];
        println!(
            "{:.4},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            t as f64 * oscillator.dt,
            x[0],
            x[1],
            run.record.y[t][0],
            estimate.x[0],
            estimate.x[1],
            run.finite_difference[t]
        );
    }
    eprintln!(
        "velocity RMSE: Kalman {:.4}, finite difference {:.4}",
        run.kalman_rmse, run.finite_difference_rmse
    );
    Ok(())
}
