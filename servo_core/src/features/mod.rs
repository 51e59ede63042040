// servo_core/src/features/mod.rs

//! Polymorphic visual features. A feature produces a current value `s`, an
//! error `e = s - s*` against its desired value, and an interaction matrix
//! `L` (k x 6) relating its time-derivative to a velocity screw of the
//! observing camera: `s_dot = L * v`. The servo task depends only on this
//! capability set, never on a concrete feature identity.

use std::fmt::Debug;
use std::ops::BitOr;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::ServoError;
use crate::types::Pose;

pub mod measured;
pub mod theta_u;
pub mod translation;

pub use measured::{FeatureMeasurementSource, MeasuredFeature};
pub use theta_u::ThetaUFeature;
pub use translation::TranslationFeature;

/// Which value the interaction matrix is evaluated at when the control law
/// is computed. `Desired` (the classical choice for these features) gives a
/// constant matrix and exact first-order decoupling near the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    /// Evaluate L at the current feature value.
    Current,
    /// Evaluate L at the desired (goal) value.
    #[default]
    Desired,
}

/// The world context a pose-derived feature needs to recompute itself:
/// the current and desired poses of the observed object in the camera
/// frame (cMo and cdMo). Features derive their own relative transform
/// `cdMc = desired * current^-1` from these.
#[derive(Debug, Clone, Copy)]
pub struct FeatureContext {
    pub current: Pose,
    pub desired: Pose,
}

/// Selection of the active sub-components of a (up to 3-dimensional)
/// geometric feature. Deselected rows are dropped from both the error
/// vector and the interaction matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Select(u8);

impl Select {
    pub const X: Select = Select(0b001);
    pub const Y: Select = Select(0b010);
    pub const Z: Select = Select(0b100);
    pub const ALL: Select = Select(0b111);

    pub fn contains(self, component: Select) -> bool {
        self.0 & component.0 == component.0
    }

    /// Number of selected components.
    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Indices (0..3) of the selected components, in order.
    pub(crate) fn indices(self) -> impl Iterator<Item = usize> {
        let bits = self.0;
        (0..3).filter(move |i| bits & (1 << i) != 0)
    }
}

impl Default for Select {
    fn default() -> Self {
        Select::ALL
    }
}

impl BitOr for Select {
    type Output = Select;
    fn bitor(self, rhs: Select) -> Select {
        Select(self.0 | rhs.0)
    }
}

/// The contract every visual feature satisfies. `Send + Sync` so features
/// can live inside a task that is moved across threads by an embedding
/// application.
pub trait VisualFeature: Debug + Send + Sync {
    /// Number of active rows k. Fixed per instance; must match the row
    /// count of both `error()` and `interaction()`.
    fn dim(&self) -> usize;

    /// The current error `e = s - s*` (selected rows only).
    fn error(&self) -> DVector<f64>;

    /// The k x 6 interaction matrix, evaluated per `kind`.
    fn interaction(&self, kind: InteractionKind) -> DMatrix<f64>;

    /// Recomputes `s` (and anything `L` depends on) from the context, or
    /// pulls a fresh measurement from an external source. Overwrites only
    /// this feature's own state; no effect on any other feature.
    fn refresh(&mut self, ctx: &FeatureContext) -> Result<(), ServoError>;
}

/// Extracts the selected rows of a fixed 3 x 6 matrix as a dynamic matrix.
pub(crate) fn select_rows(full: &nalgebra::Matrix3x6<f64>, select: Select) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(select.count(), 6);
    for (row, idx) in select.indices().enumerate() {
        out.row_mut(row).copy_from(&full.row(idx));
    }
    out
}

/// Extracts the selected components of a 3-vector as a dynamic vector.
pub(crate) fn select_components(
    full: &nalgebra::Vector3<f64>,
    select: Select,
) -> DVector<f64> {
    DVector::from_iterator(select.count(), select.indices().map(|i| full[i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_defaults_to_all_components() {
        let s = Select::default();
        assert_eq!(s.count(), 3);
        assert!(s.contains(Select::X));
        assert!(s.contains(Select::Y));
        assert!(s.contains(Select::Z));
    }

    #[test]
    fn select_combines_with_bitor() {
        let s = Select::X | Select::Z;
        assert_eq!(s.count(), 2);
        assert!(s.contains(Select::X));
        assert!(!s.contains(Select::Y));
        assert_eq!(s.indices().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn select_rows_keeps_order() {
        let mut full = nalgebra::Matrix3x6::zeros();
        full.row_mut(0).fill(1.0);
        full.row_mut(2).fill(3.0);
        let picked = select_rows(&full, Select::X | Select::Z);
        assert_eq!(picked.nrows(), 2);
        assert_eq!(picked[(0, 0)], 1.0);
        assert_eq!(picked[(1, 0)], 3.0);
    }
}
