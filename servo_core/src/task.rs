// servo_core/src/task.rs

//! The servo task: an ordered collection of visual features stacked into a
//! single task function, regulated to zero by `v = -lambda * L^+ * E`.

use nalgebra::{DMatrix, DVector};

use crate::error::ServoError;
use crate::features::{FeatureContext, InteractionKind, VisualFeature};
use crate::types::{ControlFrame, Screw};

/// Relative threshold on singular values when forming the pseudo-inverse.
/// Singular values below `sigma_max * PINV_RELATIVE_TOLERANCE` are treated
/// as zero, which yields the minimum-norm least-squares solution: degrees
/// of freedom the features do not constrain receive zero velocity.
const PINV_RELATIVE_TOLERANCE: f64 = 1e-10;

/// Which control configuration the task computes velocities for. Only the
/// eye-in-hand, camera-frame law is implemented; the tag makes the frame of
/// the returned screw self-describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServoScheme {
    /// Camera mounted on the moving end-effector; the returned screw is the
    /// camera velocity expressed in the camera frame.
    #[default]
    EyeInHandCamera,
}

impl ServoScheme {
    /// The frame the computed velocity screw is expressed in.
    pub fn output_frame(&self) -> ControlFrame {
        match self {
            ServoScheme::EyeInHandCamera => ControlFrame::Camera,
        }
    }
}

/// Aggregates features, stacks their errors and interaction matrices in
/// registration order, and computes the gain-scaled control law.
///
/// Singularity policy: by default a rank-deficient stacked matrix yields
/// the minimum-norm solution (an all-zero matrix gives the zero screw).
/// Setting a condition threshold opts into a hard
/// [`ServoError::SingularConfiguration`] instead; the numerical degradation
/// near a singular configuration is reported, never silently masked or
/// avoided.
#[derive(Debug)]
pub struct ServoTask {
    scheme: ServoScheme,
    interaction: InteractionKind,
    lambda: f64,
    condition_threshold: Option<f64>,
    features: Vec<Box<dyn VisualFeature>>,
    last_error: Option<DVector<f64>>,
    alive: bool,
}

impl ServoTask {
    pub fn new(scheme: ServoScheme) -> Self {
        Self {
            scheme,
            interaction: InteractionKind::default(),
            lambda: 1.0,
            condition_threshold: None,
            features: Vec::new(),
            last_error: None,
            alive: true,
        }
    }

    pub fn scheme(&self) -> ServoScheme {
        self.scheme
    }

    /// Selects whether interaction matrices are evaluated at the current or
    /// the desired feature value.
    pub fn set_interaction(&mut self, kind: InteractionKind) {
        self.interaction = kind;
    }

    /// Sets the control gain. Lambda controls the exponential decay rate of
    /// the error and must be strictly positive.
    pub fn set_lambda(&mut self, lambda: f64) -> Result<(), ServoError> {
        if !(lambda > 0.0) {
            return Err(ServoError::InvalidState("gain lambda must be > 0"));
        }
        self.lambda = lambda;
        Ok(())
    }

    /// Opts into `SingularConfiguration` errors when the condition number
    /// of the stacked interaction matrix exceeds `threshold`.
    pub fn set_condition_threshold(&mut self, threshold: Option<f64>) {
        self.condition_threshold = threshold;
    }

    /// Registers a feature. Registration order defines which rows the
    /// feature occupies in the stacked task function.
    pub fn add_feature(&mut self, feature: Box<dyn VisualFeature>) {
        self.features.push(feature);
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Recomputes every registered feature from the given context. Any
    /// feature failure aborts the refresh and leaves the remaining features
    /// untouched.
    pub fn refresh_features(&mut self, ctx: &FeatureContext) -> Result<(), ServoError> {
        if !self.alive {
            return Err(ServoError::InvalidState("task has been killed"));
        }
        for feature in &mut self.features {
            feature.refresh(ctx)?;
        }
        Ok(())
    }

    /// Computes the camera velocity `v = -lambda * L^+ * E` from the
    /// stacked error E and interaction matrix L of all registered features.
    /// The stacked error is retained for inspection via [`Self::last_error`].
    pub fn compute_control_law(&mut self) -> Result<Screw, ServoError> {
        if !self.alive {
            return Err(ServoError::InvalidState("task has been killed"));
        }
        if self.features.is_empty() {
            return Err(ServoError::InvalidState(
                "control law requested on a task with no features",
            ));
        }

        let (error, l_stack) = self.stack()?;

        let svd = l_stack.svd(true, true);
        let sigma_max = svd.singular_values.iter().cloned().fold(0.0, f64::max);

        if let Some(threshold) = self.condition_threshold {
            let sigma_min = svd
                .singular_values
                .iter()
                .cloned()
                .fold(f64::INFINITY, f64::min);
            let condition = sigma_max / sigma_min;
            if !condition.is_finite() || condition > threshold {
                return Err(ServoError::SingularConfiguration { condition });
            }
        }

        // Minimum-norm pseudo-inverse; an all-zero L maps everything to the
        // zero screw. The tolerance is relative to the largest singular
        // value (absolute for an all-zero matrix).
        let tolerance = if sigma_max > 0.0 {
            sigma_max * PINV_RELATIVE_TOLERANCE
        } else {
            PINV_RELATIVE_TOLERANCE
        };
        let pinv = svd
            .pseudo_inverse(tolerance)
            .map_err(|_| ServoError::InvalidState("pseudo-inverse tolerance must be >= 0"))?;

        let v = -(self.lambda) * (&pinv * &error);
        self.last_error = Some(error);

        Ok(Screw::from_column_slice(v.as_slice()))
    }

    /// The stacked error vector retained by the last control-law
    /// computation, for convergence monitoring.
    pub fn last_error(&self) -> Option<&DVector<f64>> {
        self.last_error.as_ref()
    }

    /// Squared norm of the retained error, the usual scalar progress metric.
    pub fn error_norm_squared(&self) -> Option<f64> {
        self.last_error.as_ref().map(|e| e.norm_squared())
    }

    /// Tears the task down: releases the feature collection. Subsequent
    /// control-law computations fail with `InvalidState`.
    pub fn kill(&mut self) {
        self.features.clear();
        self.alive = false;
    }

    /// Stacks every feature's error and interaction matrix in registration
    /// order, validating the per-feature row bookkeeping.
    fn stack(&self) -> Result<(DVector<f64>, DMatrix<f64>), ServoError> {
        let total: usize = self.features.iter().map(|f| f.dim()).sum();
        let mut error = DVector::zeros(total);
        let mut l_stack = DMatrix::zeros(total, 6);

        let mut row = 0;
        for feature in &self.features {
            let e = feature.error();
            let l = feature.interaction(self.interaction);
            let k = feature.dim();
            if e.nrows() != k || l.nrows() != k || l.ncols() != 6 {
                return Err(ServoError::DimensionMismatch {
                    error_rows: e.nrows(),
                    matrix_rows: l.nrows(),
                    matrix_cols: l.ncols(),
                });
            }
            error.rows_mut(row, k).copy_from(&e);
            l_stack.rows_mut(row, k).copy_from(&l);
            row += k;
        }
        Ok((error, l_stack))
    }
}
