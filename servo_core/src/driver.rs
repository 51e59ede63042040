// servo_core/src/driver.rs

//! The control-loop driver: the fixed-iteration orchestration of
//! read pose -> refresh features -> control law -> apply velocity.
//! Deterministic given deterministic inputs; any failure aborts the run
//! cleanly (the task is torn down, no partial command is sent) and the
//! error is returned to the caller, which owns the retry policy.

use crate::error::ServoError;
use crate::features::FeatureContext;
use crate::simulator::CameraSimulator;
use crate::task::ServoTask;
use crate::types::{ControlFrame, Pose, Screw};

/// The actuator boundary: satisfied by [`CameraSimulator`] for software
/// runs and by a real robot driver on hardware. Real drivers report
/// actuation problems as [`ServoError::ActuatorFault`].
pub trait Robot {
    fn position(&mut self) -> Result<Pose, ServoError>;
    fn apply_velocity(&mut self, frame: ControlFrame, v: &Screw) -> Result<(), ServoError>;
}

impl Robot for CameraSimulator {
    fn position(&mut self) -> Result<Pose, ServoError> {
        CameraSimulator::position(self)
    }

    fn apply_velocity(&mut self, frame: ControlFrame, v: &Screw) -> Result<(), ServoError> {
        self.set_velocity(frame, v)
    }
}

/// The pose-source boundary (model-based tracker, motion-capture, ...).
/// A lost track is an [`ServoError::Upstream`] failure, which aborts the
/// current run — the loop never retries indefinitely.
pub trait PoseSource {
    fn current_pose(&mut self) -> Result<Pose, ServoError>;
}

/// In simulation the robot is its own pose source.
impl<R: Robot> PoseSource for R {
    fn current_pose(&mut self) -> Result<Pose, ServoError> {
        self.position()
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy)]
pub struct LoopOutcome {
    /// Iterations actually executed.
    pub iterations: usize,
    /// Squared norm of the stacked error after the last iteration.
    pub final_error_norm2: f64,
}

/// Fixed-iteration control loop around a task and a robot. The observer
/// hook, when present, is called after each completed iteration with the
/// iteration number and the current squared error norm — narration lives
/// here, never inside the numerical components.
pub struct ControlLoop {
    desired: Pose,
    iterations: usize,
    observer: Option<Box<dyn FnMut(usize, f64)>>,
}

impl ControlLoop {
    /// A loop regulating the camera towards `desired` (the object pose in
    /// the desired camera frame), with the classical 200-iteration budget.
    pub fn new(desired: Pose) -> Self {
        Self {
            desired,
            iterations: 200,
            observer: None,
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_observer(mut self, observer: impl FnMut(usize, f64) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Runs the loop to the iteration budget, with the robot serving as
    /// its own pose source (the simulation configuration). On any error
    /// the task is killed and the error is propagated; no further velocity
    /// command is attempted.
    pub fn run(
        &mut self,
        task: &mut ServoTask,
        robot: &mut dyn Robot,
    ) -> Result<LoopOutcome, ServoError> {
        self.run_inner(task, None, robot)
    }

    /// Runs the loop reading poses from an external tracker while
    /// commanding a separate actuator (the real-robot replacement: the
    /// robot's own odometry is never consulted).
    pub fn run_with_pose_source(
        &mut self,
        task: &mut ServoTask,
        tracker: &mut dyn PoseSource,
        robot: &mut dyn Robot,
    ) -> Result<LoopOutcome, ServoError> {
        self.run_inner(task, Some(tracker), robot)
    }

    fn run_inner(
        &mut self,
        task: &mut ServoTask,
        mut tracker: Option<&mut dyn PoseSource>,
        robot: &mut dyn Robot,
    ) -> Result<LoopOutcome, ServoError> {
        let mut last_norm = f64::INFINITY;
        for iter in 1..=self.iterations {
            let result = match tracker.as_mut() {
                Some(t) => t.current_pose(),
                None => robot.position(),
            }
            .and_then(|current| self.step(task, robot, current));
            match result {
                Ok(norm) => {
                    last_norm = norm;
                    if let Some(observer) = &mut self.observer {
                        observer(iter, norm);
                    }
                }
                Err(e) => {
                    task.kill();
                    return Err(e);
                }
            }
        }
        Ok(LoopOutcome {
            iterations: self.iterations,
            final_error_norm2: last_norm,
        })
    }

    /// One control cycle from an already-acquired pose.
    fn step(
        &self,
        task: &mut ServoTask,
        robot: &mut dyn Robot,
        current: Pose,
    ) -> Result<f64, ServoError> {
        let ctx = FeatureContext {
            current,
            desired: self.desired,
        };
        task.refresh_features(&ctx)?;
        let v = task.compute_control_law()?;
        robot.apply_velocity(task.scheme().output_frame(), &v)?;
        Ok(task.error_norm_squared().unwrap_or(f64::INFINITY))
    }
}
