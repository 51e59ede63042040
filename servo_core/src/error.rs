// servo_core/src/error.rs

use thiserror::Error;

/// Everything that can go wrong inside the control engine. All variants are
/// surfaced to the control-loop driver, which aborts the current run rather
/// than sending a possibly-garbage velocity command. There is no automatic
/// retry inside the engine; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum ServoError {
    /// An operation was invoked on an unconfigured or torn-down component,
    /// e.g. a control law with zero features or a position query on an
    /// uninitialized simulator.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// A feature's error vector and interaction matrix disagree on their
    /// row count, or an interaction matrix does not have 6 columns.
    #[error("dimension mismatch: error has {error_rows} rows, interaction matrix is {matrix_rows}x{matrix_cols}")]
    DimensionMismatch {
        error_rows: usize,
        matrix_rows: usize,
        matrix_cols: usize,
    },

    /// The stacked interaction matrix is ill-conditioned beyond the
    /// caller's threshold. Reported, never auto-corrected.
    #[error("singular configuration: interaction matrix condition number {condition:.3e}")]
    SingularConfiguration { condition: f64 },

    /// A pose or feature-measurement source failed (e.g. tracking lost).
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// The robot/actuator driver reported a fault. Kept distinct from
    /// `Upstream` so the loop can surface actuation problems as such.
    #[error("actuator fault: {0}")]
    ActuatorFault(String),
}
