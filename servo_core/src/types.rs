// servo_core/src/types.rs

use nalgebra::{Isometry3, Vector6};

// --- Core Type Aliases ---

/// A rigid transform between two frames. Storing the rotation as a unit
/// quaternion keeps the rotation part on the group by construction:
/// composition and inversion cannot produce a non-orthonormal rotation.
pub type Pose = Isometry3<f64>;

/// Minimal 6-parameter pose representation: (tx, ty, tz, tux, tuy, tuz)
/// where the last three entries are the axis-angle vector u*theta.
pub type PoseVector = Vector6<f64>;

/// A velocity screw: (vx, vy, vz, wx, wy, wz). Linear part first.
pub type Screw = Vector6<f64>;

// --- Reference Frames ---

/// The frame a velocity screw is expressed in. Consumers take this tag
/// explicitly; mixing frames without an explicit transform is a contract
/// violation and is rejected, never silently reinterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlFrame {
    /// The moving camera/end-effector frame (eye-in-hand control).
    Camera,
    /// A fixed reference (base) frame.
    Reference,
}
