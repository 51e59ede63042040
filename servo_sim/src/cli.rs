// servo_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Visual-servoing simulation runner.
///
/// Closes the control loop between a servo task and an ideal free-flying
/// camera, reproducing the classical theta-U eye-in-hand scenario from a
/// TOML description.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(
        short,
        long,
        default_value = "servo_sim/assets/scenarios/theta_u_cam_velocity.toml"
    )]
    pub scenario: PathBuf,

    /// Override the scenario's iteration budget.
    #[arg(long)]
    pub iters: Option<usize>,

    /// Only report the final outcome, not per-iteration error norms.
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}
