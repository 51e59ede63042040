// servo_core/src/features/translation.rs

//! The 3-D translation feature: the position of the current camera frame
//! expressed in the desired camera frame, i.e. the translation part of
//! `cdMc = cdMo * cMo^-1`. Its desired value is the zero vector, so the
//! error equals the value. Stacked with the theta-U feature this spans a
//! full 6-DOF positioning task.

use nalgebra::{DMatrix, DVector, Matrix3, Matrix3x6, Vector3};

use crate::error::ServoError;
use crate::features::{
    select_components, select_rows, FeatureContext, InteractionKind, Select, VisualFeature,
};

#[derive(Debug, Clone)]
pub struct TranslationFeature {
    select: Select,
    /// Current value s = cd_t_c. Also the error, since s* = 0.
    translation: Vector3<f64>,
    /// Rotation part of cdMc, needed by the `Current` interaction matrix.
    cd_r_c: Matrix3<f64>,
}

impl TranslationFeature {
    pub fn new() -> Self {
        Self::with_selection(Select::ALL)
    }

    /// Restricts the feature to a subset of its three components.
    pub fn with_selection(select: Select) -> Self {
        Self {
            select,
            translation: Vector3::zeros(),
            cd_r_c: Matrix3::identity(),
        }
    }

    /// The full (unselected) current value.
    pub fn value(&self) -> Vector3<f64> {
        self.translation
    }

    /// Full 3x6 interaction matrix [cdRc | 0]: the translation error is
    /// insensitive to angular velocity to first order, and a linear camera
    /// velocity appears rotated into the desired frame.
    fn full_interaction(&self, kind: InteractionKind) -> Matrix3x6<f64> {
        let block = match kind {
            InteractionKind::Current => self.cd_r_c,
            InteractionKind::Desired => Matrix3::identity(),
        };
        let mut full = Matrix3x6::zeros();
        full.fixed_view_mut::<3, 3>(0, 0).copy_from(&block);
        full
    }
}

impl Default for TranslationFeature {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualFeature for TranslationFeature {
    fn dim(&self) -> usize {
        self.select.count()
    }

    fn error(&self) -> DVector<f64> {
        select_components(&self.translation, self.select)
    }

    fn interaction(&self, kind: InteractionKind) -> DMatrix<f64> {
        select_rows(&self.full_interaction(kind), self.select)
    }

    fn refresh(&mut self, ctx: &FeatureContext) -> Result<(), ServoError> {
        let cdmc = ctx.desired * ctx.current.inverse();
        self.translation = cdmc.translation.vector;
        self.cd_r_c = cdmc.rotation.to_rotation_matrix().into_inner();
        Ok(())
    }
}
