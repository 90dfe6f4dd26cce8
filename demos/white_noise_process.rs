//! Autocorrelation of white noise and of the process it drives.
//!
//! Prints the sample autocorrelations of both with the theoretical process autocorrelation as CSV.

use std::path::PathBuf;

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

use lq_estimate::analysis::{autocorrelation, component, remove_mean};
use lq_estimate::config::Scenario;
use lq_estimate::error::EstimateError;
use lq_estimate::simulation::process::{ar1_autocovariance, white_noise};

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

    let config = &scenario.process;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = white_noise(config.sigma, config.steps, &mut rng)?;
    let process = config.process()?;
    let states = process.simulate(&config.initial_state(), config.steps, &mut rng)?;
    let series = remove_mean(&component(&states, 0));

    let noise_acf = autocorrelation(&noise, config.max_lag);
    let process_acf = autocorrelation(&series, config.max_lag);
    let theory = ar1_autocovariance(config.a, config.sigma, config.max_lag)?;

    println!("lag,noise,process,theory");
    for (k, (n, p)) in noise_acf.iter().zip(&process_acf).enumerate() {
        println!("{},{:.6},{:.6},{:.6}", k, n, p, theory[k]);
    }
    Ok(())
}
