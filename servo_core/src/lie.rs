// servo_core/src/lie.rs

//! SO(3)/SE(3) numerics shared by the features and the simulator: the
//! cross-product (skew) matrix, rotation log/exp via axis-angle, the
//! closed-form rigid-body exponential of a velocity screw, and the minimal
//! 6-parameter pose representation.

use nalgebra::{Matrix3, Translation3, UnitQuaternion, Vector3};

use crate::types::{Pose, PoseVector, Screw};

/// Below this angle (radians) the exponential-map coefficients switch to
/// their Taylor expansions to avoid dividing by ~0.
const SMALL_ANGLE: f64 = 1e-8;

/// The skew-symmetric cross-product matrix [w]x such that [w]x * p = w x p.
pub fn skew(w: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -w.z, w.y, //
        w.z, 0.0, -w.x, //
        -w.y, w.x, 0.0,
    )
}

/// Axis-angle vector u*theta of a rotation. The quaternion route is
/// numerically stable at both degenerate ends: theta ~ 0 gives the zero
/// vector, theta ~ pi does not divide by a vanishing sine.
pub fn rotation_log(rotation: &UnitQuaternion<f64>) -> Vector3<f64> {
    rotation.scaled_axis()
}

/// Rotation from an axis-angle vector u*theta.
pub fn rotation_exp(theta_u: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_scaled_axis(*theta_u)
}

/// Closed-form SE(3) exponential: the rigid displacement produced by a
/// constant velocity screw `v` (camera-frame, linear part first) applied
/// over `dt` seconds.
///
/// R = exp([w*dt]x), t = V * (v_lin * dt) with
/// V = I + B*[w]x + C*[w]x^2, B = (1 - cos th)/th^2, C = (th - sin th)/th^3.
pub fn exp_se3(screw: &Screw, dt: f64) -> Pose {
    let lin: Vector3<f64> = screw.fixed_rows::<3>(0) * dt;
    let ang: Vector3<f64> = screw.fixed_rows::<3>(3) * dt;

    let theta = ang.norm();
    let rotation = UnitQuaternion::from_scaled_axis(ang);

    let (b, c) = if theta < SMALL_ANGLE {
        // Taylor: B -> 1/2 - th^2/24, C -> 1/6 - th^2/120
        let t2 = theta * theta;
        (0.5 - t2 / 24.0, 1.0 / 6.0 - t2 / 120.0)
    } else {
        let t2 = theta * theta;
        ((1.0 - theta.cos()) / t2, (theta - theta.sin()) / (t2 * theta))
    };

    let wx = skew(&ang);
    let v_mat = Matrix3::identity() + b * wx + c * (wx * wx);
    let translation = v_mat * lin;

    Pose::from_parts(Translation3::from(translation), rotation)
}

/// Minimal representation of a pose: translation stacked on the axis-angle
/// rotation vector.
pub fn pose_to_vector(pose: &Pose) -> PoseVector {
    let mut v = PoseVector::zeros();
    v.fixed_rows_mut::<3>(0)
        .copy_from(&pose.translation.vector);
    v.fixed_rows_mut::<3>(3)
        .copy_from(&rotation_log(&pose.rotation));
    v
}

/// Rebuilds a pose from its minimal (t, u*theta) representation.
pub fn pose_from_vector(v: &PoseVector) -> Pose {
    let t: Vector3<f64> = v.fixed_rows::<3>(0).into();
    let theta_u: Vector3<f64> = v.fixed_rows::<3>(3).into();
    Pose::from_parts(Translation3::from(t), rotation_exp(&theta_u))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    const EPS: f64 = 1e-10;

    #[test]
    fn skew_matches_cross_product() {
        let w = Vector3::new(0.3, -1.2, 0.7);
        let p = Vector3::new(-0.5, 0.4, 2.0);
        assert_relative_eq!(skew(&w) * p, w.cross(&p), epsilon = EPS);
    }

    #[test]
    fn rotation_log_exp_round_trip() {
        // Sweep angles across (0, pi), including values close to both ends.
        for &theta in &[1e-7, 0.01, 0.5, 1.5, PI / 2.0, 3.0, PI - 1e-6] {
            let axis = Vector3::new(1.0, -2.0, 0.5).normalize();
            let tu = axis * theta;
            let back = rotation_log(&rotation_exp(&tu));
            assert_abs_diff_eq!(back, tu, epsilon = 1e-8);
        }
    }

    #[test]
    fn rotation_log_of_identity_is_zero() {
        assert_abs_diff_eq!(
            rotation_log(&UnitQuaternion::identity()),
            Vector3::zeros(),
            epsilon = EPS
        );
    }

    #[test]
    fn pose_vector_round_trip() {
        let v = PoseVector::from_column_slice(&[0.1, 0.2, 2.0, 0.35, 0.17, 0.87]);
        let pose = pose_from_vector(&v);
        assert_abs_diff_eq!(pose_to_vector(&pose), v, epsilon = 1e-10);
    }

    #[test]
    fn compose_invert_consistency() {
        let a = pose_from_vector(&PoseVector::from_column_slice(&[
            0.4, -0.1, 1.3, 0.2, -0.6, 0.9,
        ]));
        let id = a * a.inverse();
        assert_abs_diff_eq!(id.translation.vector, Vector3::zeros(), epsilon = EPS);
        assert_abs_diff_eq!(id.rotation.angle(), 0.0, epsilon = EPS);

        let back = a.inverse().inverse();
        assert_relative_eq!(
            back.to_homogeneous(),
            a.to_homogeneous(),
            epsilon = EPS
        );
    }

    #[test]
    fn exp_se3_zero_screw_is_identity() {
        let motion = exp_se3(&Screw::zeros(), 0.04);
        assert_abs_diff_eq!(motion.translation.vector, Vector3::zeros(), epsilon = EPS);
        assert_abs_diff_eq!(motion.rotation.angle(), 0.0, epsilon = EPS);
    }

    #[test]
    fn exp_se3_pure_translation() {
        let screw = Screw::from_column_slice(&[1.0, -2.0, 0.5, 0.0, 0.0, 0.0]);
        let motion = exp_se3(&screw, 0.1);
        assert_abs_diff_eq!(
            motion.translation.vector,
            Vector3::new(0.1, -0.2, 0.05),
            epsilon = EPS
        );
    }

    #[test]
    fn exp_se3_pure_rotation() {
        let screw = Screw::from_column_slice(&[0.0, 0.0, 0.0, 0.0, 0.0, PI]);
        let motion = exp_se3(&screw, 0.5);
        assert_abs_diff_eq!(
            rotation_log(&motion.rotation),
            Vector3::new(0.0, 0.0, PI / 2.0),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(motion.translation.vector, Vector3::zeros(), epsilon = EPS);
    }

    #[test]
    fn exp_se3_is_consistent_with_small_steps() {
        // One big step of a constant screw equals many small steps composed.
        let screw = Screw::from_column_slice(&[0.2, -0.1, 0.3, 0.4, 0.1, -0.2]);
        let big = exp_se3(&screw, 1.0);
        let mut composed = Pose::identity();
        for _ in 0..1000 {
            composed = exp_se3(&screw, 1e-3) * composed;
        }
        assert_relative_eq!(
            big.to_homogeneous(),
            composed.to_homogeneous(),
            epsilon = 1e-6
        );
    }
}
