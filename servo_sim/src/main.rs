// servo_sim/src/main.rs

//! Scenario runner: loads a servo scenario from TOML, closes the loop
//! against the kinematic camera simulator and narrates the squared error
//! norm per iteration. The default scenario is the classical theta-U
//! eye-in-hand simulation: start 20/10/50 degrees away from the goal,
//! gain 1, 200 iterations, velocity computed in the camera frame.

mod cli;
mod scenario;

use clap::Parser;
use log::{error, info};

use servo_core::prelude::{CameraSimulator, ControlLoop, ServoError};

use crate::cli::Cli;
use crate::scenario::ScenarioFile;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.quiet { "warn" } else { "info" }),
    )
    .init();

    if let Err(e) = run(&cli) {
        error!("servo run aborted: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file = ScenarioFile::load(&cli.scenario)
        .map_err(|e| ServoError::Upstream(format!("scenario {:?}: {e}", cli.scenario)))?;

    let iterations = cli.iters.unwrap_or(file.scenario.iterations);
    info!(
        "scenario {:?}: {} features, lambda {}, {} iterations",
        cli.scenario,
        file.servo.active_features.len(),
        file.servo.lambda,
        iterations
    );

    let mut task = file.servo.build_task()?;

    let mut robot = CameraSimulator::with_sample_time(file.scenario.sample_time)?;
    robot.set_position(file.scenario.initial());

    let mut control_loop = ControlLoop::new(file.scenario.desired())
        .with_iterations(iterations)
        .with_observer(|iter, norm| info!("iter {iter:4}  |E|^2 = {norm:.6e}"));

    let outcome = control_loop.run(&mut task, &mut robot)?;

    info!(
        "converged after {} iterations, final |E|^2 = {:.6e}",
        outcome.iterations, outcome.final_error_norm2
    );
    Ok(())
}
