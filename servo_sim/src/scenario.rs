// servo_sim/src/scenario.rs

//! Scenario loading: a TOML file describing the servo configuration plus
//! the simulated world (initial/desired camera poses, iteration budget,
//! control period).

use std::path::Path;

use figment::{
    providers::{Format, Toml},
    Figment,
};
use nalgebra::Vector3;
use serde::Deserialize;

use servo_core::lie::pose_from_vector;
use servo_core::prelude::{Pose, PoseVector, ServoConfig};

fn default_iterations() -> usize {
    200
}

fn default_sample_time() -> f64 {
    0.040
}

/// The `[scenario]` table. Poses are 6-vectors (tx, ty, tz, rx, ry, rz)
/// with the axis-angle rotation part in degrees for readability.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioSection {
    pub initial_pose: [f64; 6],
    pub desired_pose: [f64; 6],
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_sample_time")]
    pub sample_time: f64,
}

impl ScenarioSection {
    pub fn initial(&self) -> Pose {
        pose_from_degrees(&self.initial_pose)
    }

    pub fn desired(&self) -> Pose {
        pose_from_degrees(&self.desired_pose)
    }
}

/// A complete scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    pub servo: ServoConfig,
    pub scenario: ScenarioSection,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self, figment::Error> {
        Figment::new().merge(Toml::file(path)).extract()
    }
}

fn pose_from_degrees(v: &[f64; 6]) -> Pose {
    let rot: Vector3<f64> = Vector3::new(v[3], v[4], v[5]) * std::f64::consts::PI / 180.0;
    pose_from_vector(&PoseVector::new(v[0], v[1], v[2], rot.x, rot.y, rot.z))
}
