// servo_core/src/features/theta_u.rs

//! The theta-U rotation feature: the relative rotation the camera still has
//! to realize, represented as the axis-angle vector u*theta of the rotation
//! part of `cdMc = cdMo * cMo^-1`. The desired value is the zero vector by
//! construction (current frame == desired frame => zero rotation), so the
//! error equals the value itself.

use nalgebra::{DMatrix, DVector, Matrix3, Matrix3x6, Vector3};

use crate::error::ServoError;
use crate::features::{
    select_components, select_rows, FeatureContext, InteractionKind, Select, VisualFeature,
};
use crate::lie::{rotation_log, skew};

/// Angles below this are treated as zero: the interaction matrix reduces
/// exactly to the identity block there.
const SMALL_ANGLE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct ThetaUFeature {
    select: Select,
    /// Current value s = u*theta of cdRc. Also the error, since s* = 0.
    theta_u: Vector3<f64>,
}

impl ThetaUFeature {
    pub fn new() -> Self {
        Self::with_selection(Select::ALL)
    }

    /// Restricts the feature to a subset of its three rotation components.
    pub fn with_selection(select: Select) -> Self {
        Self {
            select,
            theta_u: Vector3::zeros(),
        }
    }

    /// The full (unselected) current value.
    pub fn value(&self) -> Vector3<f64> {
        self.theta_u
    }

    /// The 3x3 rotation block of the interaction matrix:
    /// `Lw = I - (theta/2)[u]x + (1 - sinc(theta)/sinc^2(theta/2)) [u]x^2`.
    /// At theta ~ 0 this is the identity, which is also the value used for
    /// the `Desired` evaluation. A well-known property of this matrix is
    /// `Lw * theta_u = theta_u`, which makes the closed-loop rotation error
    /// decay exactly exponentially.
    fn rotation_block(theta_u: &Vector3<f64>) -> Matrix3<f64> {
        let theta = theta_u.norm();
        if theta < SMALL_ANGLE {
            return Matrix3::identity();
        }
        let u = theta_u / theta;
        let sinc = theta.sin() / theta;
        let half = theta / 2.0;
        let sinc_half = half.sin() / half;
        let k = 1.0 - sinc / (sinc_half * sinc_half);

        let ux = skew(&u);
        Matrix3::identity() - (theta / 2.0) * ux + k * (ux * ux)
    }

    /// Full 3x6 interaction matrix [0 | Lw]: the rotation feature is
    /// insensitive to linear velocity.
    fn full_interaction(&self, kind: InteractionKind) -> Matrix3x6<f64> {
        let lw = match kind {
            InteractionKind::Current => Self::rotation_block(&self.theta_u),
            InteractionKind::Desired => Matrix3::identity(),
        };
        let mut full = Matrix3x6::zeros();
        full.fixed_view_mut::<3, 3>(0, 3).copy_from(&lw);
        full
    }
}

impl Default for ThetaUFeature {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualFeature for ThetaUFeature {
    fn dim(&self) -> usize {
        self.select.count()
    }

    fn error(&self) -> DVector<f64> {
        select_components(&self.theta_u, self.select)
    }

    fn interaction(&self, kind: InteractionKind) -> DMatrix<f64> {
        select_rows(&self.full_interaction(kind), self.select)
    }

    fn refresh(&mut self, ctx: &FeatureContext) -> Result<(), ServoError> {
        let cdmc = ctx.desired * ctx.current.inverse();
        self.theta_u = rotation_log(&cdmc.rotation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lie::{pose_from_vector, rotation_exp};
    use crate::types::{Pose, PoseVector};
    use approx::assert_abs_diff_eq;
    use nalgebra::Translation3;

    #[test]
    fn zero_error_when_current_equals_desired() {
        let pose = pose_from_vector(&PoseVector::from_column_slice(&[
            0.1, 0.2, 2.0, 0.3, -0.1, 0.5,
        ]));
        let mut feature = ThetaUFeature::new();
        feature
            .refresh(&FeatureContext {
                current: pose,
                desired: pose,
            })
            .unwrap();
        assert_abs_diff_eq!(feature.error(), DVector::zeros(3), epsilon = 1e-12);
    }

    #[test]
    fn value_is_log_of_relative_rotation() {
        let tu = Vector3::new(0.2, -0.4, 0.1);
        let current = Pose::from_parts(Translation3::identity(), rotation_exp(&-tu));
        let desired = Pose::identity();
        let mut feature = ThetaUFeature::new();
        feature.refresh(&FeatureContext { current, desired }).unwrap();
        // cdMc = I * current^-1, whose rotation is exp(tu).
        assert_abs_diff_eq!(feature.value(), tu, epsilon = 1e-10);
    }

    #[test]
    fn interaction_is_identity_block_at_zero() {
        let feature = ThetaUFeature::new();
        let l = feature.interaction(InteractionKind::Current);
        assert_eq!(l.nrows(), 3);
        let expected = {
            let mut m = DMatrix::zeros(3, 6);
            for i in 0..3 {
                m[(i, i + 3)] = 1.0;
            }
            m
        };
        assert_abs_diff_eq!(l, expected, epsilon = 1e-12);
    }

    #[test]
    fn rotation_block_fixes_theta_u() {
        // Lw * theta_u == theta_u for any rotation vector.
        let tu = Vector3::new(0.35, 0.17, 0.87);
        let lw = ThetaUFeature::rotation_block(&tu);
        assert_abs_diff_eq!(lw * tu, tu, epsilon = 1e-10);
    }

    #[test]
    fn selection_restricts_rows() {
        let mut feature = ThetaUFeature::with_selection(Select::Z);
        let current = Pose::from_parts(
            Translation3::identity(),
            rotation_exp(&Vector3::new(0.0, 0.0, -0.5)),
        );
        feature
            .refresh(&FeatureContext {
                current,
                desired: Pose::identity(),
            })
            .unwrap();
        assert_eq!(feature.dim(), 1);
        let e = feature.error();
        assert_eq!(e.nrows(), 1);
        assert_abs_diff_eq!(e[0], 0.5, epsilon = 1e-10);
        assert_eq!(feature.interaction(InteractionKind::Desired).nrows(), 1);
    }
}
