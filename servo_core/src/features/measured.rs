// servo_core/src/features/measured.rs

//! Adapter for features whose error and interaction matrix are produced by
//! an external collaborator (keypoint matcher, homography estimator, ...).
//! The engine never computes matches or homographies; it only consumes
//! their numeric outputs through `FeatureMeasurementSource`.

use std::fmt::Debug;

use nalgebra::{DMatrix, DVector};

use crate::error::ServoError;
use crate::features::{FeatureContext, InteractionKind, VisualFeature};

/// The boundary with an external feature-measurement pipeline. A failed
/// measurement (e.g. not enough matches) is an `Upstream` error, which the
/// control loop treats as "abort this run", not "retry".
pub trait FeatureMeasurementSource: Debug + Send + Sync {
    /// One fresh (error, interaction matrix) pair.
    fn measure(&mut self) -> Result<(DVector<f64>, DMatrix<f64>), ServoError>;
}

/// A visual feature fed by an external measurement source. The dimension is
/// fixed at construction and every refreshed measurement is validated
/// against it.
#[derive(Debug)]
pub struct MeasuredFeature {
    dim: usize,
    source: Box<dyn FeatureMeasurementSource>,
    error: DVector<f64>,
    interaction: DMatrix<f64>,
}

impl MeasuredFeature {
    pub fn new(dim: usize, source: Box<dyn FeatureMeasurementSource>) -> Self {
        Self {
            dim,
            source,
            error: DVector::zeros(dim),
            interaction: DMatrix::zeros(dim, 6),
        }
    }
}

impl VisualFeature for MeasuredFeature {
    fn dim(&self) -> usize {
        self.dim
    }

    fn error(&self) -> DVector<f64> {
        self.error.clone()
    }

    fn interaction(&self, _kind: InteractionKind) -> DMatrix<f64> {
        // An external source provides a single matrix; the current/desired
        // distinction is the source's concern.
        self.interaction.clone()
    }

    fn refresh(&mut self, _ctx: &FeatureContext) -> Result<(), ServoError> {
        let (error, interaction) = self.source.measure()?;
        if error.nrows() != self.dim
            || interaction.nrows() != self.dim
            || interaction.ncols() != 6
        {
            return Err(ServoError::DimensionMismatch {
                error_rows: error.nrows(),
                matrix_rows: interaction.nrows(),
                matrix_cols: interaction.ncols(),
            });
        }
        self.error = error;
        self.interaction = interaction;
        Ok(())
    }
}
