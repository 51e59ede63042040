// servo_core/src/config.rs

//! Key-value servo configuration: the gain, the interaction-matrix choice
//! and the set of active features. Deserialized by the embedding
//! application (TOML in the simulator binary) and validated here before a
//! task is built from it.

use serde::Deserialize;

use crate::error::ServoError;
use crate::features::{InteractionKind, ThetaUFeature, TranslationFeature, VisualFeature};
use crate::task::{ServoScheme, ServoTask};

/// The pose-derived features a configuration can activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    ThetaU,
    Translation,
}

fn default_lambda() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServoConfig {
    /// Control gain, strictly positive.
    #[serde(default = "default_lambda")]
    pub lambda: f64,
    /// Interaction-matrix evaluation point (`"current"` or `"desired"`).
    #[serde(default)]
    pub interaction: InteractionKind,
    /// Features to register, in stacking order.
    pub active_features: Vec<FeatureKind>,
    /// Opt-in condition-number threshold for singularity reporting.
    #[serde(default)]
    pub condition_threshold: Option<f64>,
}

impl ServoConfig {
    pub fn validate(&self) -> Result<(), ServoError> {
        if !(self.lambda > 0.0) {
            return Err(ServoError::InvalidState(
                "configured gain lambda must be > 0",
            ));
        }
        if self.active_features.is_empty() {
            return Err(ServoError::InvalidState(
                "configuration activates no features",
            ));
        }
        Ok(())
    }

    /// Builds a ready-to-run eye-in-hand task from this configuration.
    pub fn build_task(&self) -> Result<ServoTask, ServoError> {
        self.validate()?;
        let mut task = ServoTask::new(ServoScheme::EyeInHandCamera);
        task.set_interaction(self.interaction);
        task.set_lambda(self.lambda)?;
        task.set_condition_threshold(self.condition_threshold);
        for kind in &self.active_features {
            let feature: Box<dyn VisualFeature> = match kind {
                FeatureKind::ThetaU => Box::new(ThetaUFeature::new()),
                FeatureKind::Translation => Box::new(TranslationFeature::new()),
            };
            task.add_feature(feature);
        }
        Ok(task)
    }
}
