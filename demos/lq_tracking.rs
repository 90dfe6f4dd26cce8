//! Linear-quadratic tracking of a sinusoidal reference.
//!
//! Prints the reference, the controlled state and the control as CSV.

use std::path::PathBuf;

use clap::Parser;

use lq_estimate::config::Scenario;
use lq_estimate::error::EstimateError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario TOML file, the course defaults when absent
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Overrides the control cost weight of the scenario
    #[arg(long)]
    lambda: Option<f64>,
}

fn main() -> Result<(), EstimateError> {
    env_logger::init();
    let cli = Cli::parse();
    let mut scenario = match &cli.scenario {
        Some(path) => Scenario::from_file(path)?,
        None => Scenario::default(),
    };
    if let Some(lambda) = cli.lambda {
        scenario.tracking.lambda = lambda;
    }

    let tracking = &scenario.tracking;
    let problem = tracking.problem()?;
    let reference = tracking.reference();
    let solution = problem.solve(&reference, &tracking.initial_state())?;
    let trajectory = &solution.trajectory;

    println!("t,r1,r2,x1,x2,u");
    for (t, x) in trajectory.x.iter().enumerate() {
        let u = trajectory.u.get(t).map_or(f64::NAN, |u| u[0]);
        println!(
            "{:.4},{:.6},{:.6},{:.6},{:.6},{:.6}",
            t as f64 * tracking.dt,
            reference[t][0],
            reference[t][1],
            x[0],
            x[1],
            u
        );
    }
    eprintln!("cost {:.6}", problem.cost(trajectory, &reference)?);
    Ok(())
}
