// servo_core/src/simulator.rs

//! An ideal free-flying camera: the kinematic model needed to close the
//! servo loop in software. No disturbance, no latency, deterministic —
//! intentionally simplistic, so the convergence behavior observed is that
//! of the control law alone.

use crate::error::ServoError;
use crate::lie::exp_se3;
use crate::types::{ControlFrame, Pose, Screw};

/// Default control period, in seconds (a typical 25 Hz servo rate).
const DEFAULT_SAMPLE_TIME: f64 = 0.040;

#[derive(Debug, Clone)]
enum SimState {
    Uninitialized,
    Running { cmo: Pose },
}

/// Kinematic camera simulator tracking the pose `cMo` of a fixed object
/// frame in the moving camera frame.
///
/// Two-state machine: `Uninitialized -> Running` on the first
/// [`set_position`](Self::set_position). Reading the pose or applying a
/// velocity before that is an `InvalidState` error. Each
/// [`set_velocity`](Self::set_velocity) call integrates the screw over one
/// sample period; the component itself is otherwise time-step-agnostic.
#[derive(Debug, Clone)]
pub struct CameraSimulator {
    state: SimState,
    sample_time: f64,
}

impl CameraSimulator {
    pub fn new() -> Self {
        Self {
            state: SimState::Uninitialized,
            sample_time: DEFAULT_SAMPLE_TIME,
        }
    }

    /// A simulator integrating over `sample_time` seconds per velocity
    /// command. Non-positive periods are nonsensical for a forward
    /// integrator and are rejected, never silently reinterpreted.
    pub fn with_sample_time(sample_time: f64) -> Result<Self, ServoError> {
        if !(sample_time > 0.0) {
            return Err(ServoError::InvalidState("sample time must be > 0"));
        }
        Ok(Self {
            state: SimState::Uninitialized,
            sample_time,
        })
    }

    pub fn sample_time(&self) -> f64 {
        self.sample_time
    }

    /// Fixes the camera pose and transitions to `Running`. Also serves as
    /// an explicit re-initialization between scenario runs.
    pub fn set_position(&mut self, cmo: Pose) {
        self.state = SimState::Running { cmo };
    }

    /// The current pose of the object frame in the camera frame.
    pub fn position(&self) -> Result<Pose, ServoError> {
        match &self.state {
            SimState::Running { cmo } => Ok(*cmo),
            SimState::Uninitialized => Err(ServoError::InvalidState(
                "simulator position queried before set_position",
            )),
        }
    }

    /// The only mutator: composes the pose with the rigid-body exponential
    /// of the screw over one sample period. A camera moving with velocity
    /// `v` in its own frame sees the object pose evolve as
    /// `cMo <- exp(v * dt)^-1 * cMo`.
    pub fn set_velocity(&mut self, frame: ControlFrame, v: &Screw) -> Result<(), ServoError> {
        if frame != ControlFrame::Camera {
            return Err(ServoError::ActuatorFault(format!(
                "camera simulator only accepts camera-frame velocities, got {frame:?}"
            )));
        }
        match &mut self.state {
            SimState::Running { cmo } => {
                *cmo = exp_se3(v, self.sample_time).inverse() * *cmo;
                Ok(())
            }
            SimState::Uninitialized => Err(ServoError::InvalidState(
                "velocity applied before set_position",
            )),
        }
    }
}

impl Default for CameraSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lie::{pose_from_vector, pose_to_vector};
    use crate::types::PoseVector;
    use approx::assert_abs_diff_eq;

    #[test]
    fn position_before_init_is_invalid_state() {
        let sim = CameraSimulator::new();
        assert!(matches!(
            sim.position(),
            Err(ServoError::InvalidState(_))
        ));
    }

    #[test]
    fn velocity_before_init_is_invalid_state() {
        let mut sim = CameraSimulator::new();
        assert!(matches!(
            sim.set_velocity(ControlFrame::Camera, &Screw::zeros()),
            Err(ServoError::InvalidState(_))
        ));
    }

    #[test]
    fn zero_velocity_leaves_pose_unchanged() {
        let start = pose_from_vector(&PoseVector::from_column_slice(&[
            0.1, 0.2, 2.0, 0.35, 0.17, 0.87,
        ]));
        let mut sim = CameraSimulator::new();
        sim.set_position(start);
        sim.set_velocity(ControlFrame::Camera, &Screw::zeros())
            .unwrap();
        assert_abs_diff_eq!(
            pose_to_vector(&sim.position().unwrap()),
            pose_to_vector(&start),
            epsilon = 1e-12
        );
    }

    #[test]
    fn reference_frame_velocity_is_an_actuator_fault() {
        let mut sim = CameraSimulator::new();
        sim.set_position(Pose::identity());
        assert!(matches!(
            sim.set_velocity(ControlFrame::Reference, &Screw::zeros()),
            Err(ServoError::ActuatorFault(_))
        ));
    }

    #[test]
    fn forward_motion_moves_object_backwards_in_camera_frame() {
        // Camera translating +1 m/s along its z axis for one 0.5 s step:
        // the object, 2 m ahead, ends up 1.5 m ahead.
        let mut sim = CameraSimulator::with_sample_time(0.5).unwrap();
        sim.set_position(pose_from_vector(&PoseVector::from_column_slice(&[
            0.0, 0.0, 2.0, 0.0, 0.0, 0.0,
        ])));
        let v = Screw::from_column_slice(&[0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        sim.set_velocity(ControlFrame::Camera, &v).unwrap();
        let cmo = sim.position().unwrap();
        assert_abs_diff_eq!(cmo.translation.vector.z, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn non_positive_sample_time_is_rejected() {
        assert!(matches!(
            CameraSimulator::with_sample_time(0.0),
            Err(ServoError::InvalidState(_))
        ));
        assert!(matches!(
            CameraSimulator::with_sample_time(-0.04),
            Err(ServoError::InvalidState(_))
        ));
        assert!(matches!(
            CameraSimulator::with_sample_time(f64::NAN),
            Err(ServoError::InvalidState(_))
        ));
        assert!(CameraSimulator::with_sample_time(0.01).is_ok());
    }

    #[test]
    fn reinitialization_resets_the_pose() {
        let mut sim = CameraSimulator::new();
        sim.set_position(Pose::identity());
        let v = Screw::from_column_slice(&[0.3, 0.0, 0.0, 0.0, 0.0, 0.1]);
        sim.set_velocity(ControlFrame::Camera, &v).unwrap();
        sim.set_position(Pose::identity());
        assert_abs_diff_eq!(
            pose_to_vector(&sim.position().unwrap()),
            PoseVector::zeros(),
            epsilon = 1e-12
        );
    }
}
