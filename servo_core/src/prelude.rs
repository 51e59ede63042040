// servo_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::driver::{PoseSource, Robot};
pub use crate::features::{FeatureMeasurementSource, VisualFeature};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::error::ServoError;
pub use crate::features::{FeatureContext, InteractionKind, Select};
pub use crate::types::{ControlFrame, Pose, PoseVector, Screw};

// --- Concrete Implementations (Export common ones for convenience) ---
pub use crate::config::{FeatureKind, ServoConfig};
pub use crate::driver::{ControlLoop, LoopOutcome};
pub use crate::features::{MeasuredFeature, ThetaUFeature, TranslationFeature};
pub use crate::simulator::CameraSimulator;
pub use crate::task::{ServoScheme, ServoTask};
