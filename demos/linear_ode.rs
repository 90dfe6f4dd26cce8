#![allow(non_snake_case)]

//! Two dimensional linear ODE, Euler integration against the exact solution.
//!
//! Prints the eigenvalues and equilibrium to stderr and both trajectories as CSV.

use std::path::PathBuf;

use clap::Parser;

use lq_estimate::analysis::max_abs_error;
use lq_estimate::config::{matrix2, vector2, Scenario};
use lq_estimate::error::EstimateError;
use lq_estimate::simulation::ode::{euler, exact, Modes};

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

    let ode = &scenario.ode;
    let A = matrix2(&ode.a);
    let x0 = vector2(&ode.x0);
    let modes = Modes::of(&A);
    eprintln!(
        "eigenvalues {} and {}, {:?}",
        modes.values[0],
        modes.values[1],
        modes.equilibrium()
    );
    if let Some(vectors) = &modes.vectors {
        eprintln!("eigenvectors {:.4}", vectors);
    }

    let numerical = euler(&A, &x0, ode.dt, ode.steps)?;
    let analytic = exact(&A, &x0, ode.dt, ode.steps)?;

    println!("t,euler1,euler2,exact1,exact2");
    for (k, (xe, xa)) in numerical.iter().zip(&analytic).enumerate() {
        println!(
            "{:.4},{:.6},{:.6},{:.6},{:.6}",
            k as f64 * ode.dt,
            xe[0],
            xe[1],
            xa[0],
            xa[1]
        );
    }
    eprintln!("max Euler error {:.3e}", max_abs_error(&numerical, &analytic)?);
    Ok(())
}
