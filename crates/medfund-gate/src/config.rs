use serde::{Deserialize, Serialize};

use medfund_types::ReviewStage;

use crate::error::GateError;

/// Which review stages an application passes through, in order.
///
/// The default is the single-stage workflow (hospital only). The two-stage
/// variant adds the civic-office review after the hospital:
///
/// ```toml
/// stages = ["hospital", "civic"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub stages: Vec<ReviewStage>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::hospital_only()
    }
}

impl WorkflowConfig {
    /// Hospital review, then fundraising.
    pub fn hospital_only() -> Self {
        Self {
            stages: vec![ReviewStage::Hospital],
        }
    }

    /// Hospital review, then civic-office review, then fundraising.
    pub fn two_stage() -> Self {
        Self {
            stages: vec![ReviewStage::Hospital, ReviewStage::Civic],
        }
    }

    /// Check the stage list.
    ///
    /// Every application starts pending hospital review, so the hospital
    /// stage must come first. A stage may appear at most once.
    pub fn validate(&self) -> Result<(), GateError> {
        match self.stages.first() {
            None => return Err(GateError::Config("at least one review stage is required".into())),
            Some(ReviewStage::Hospital) => {}
            Some(other) => {
                return Err(GateError::Config(format!(
                    "first review stage must be hospital, found {other}"
                )))
            }
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].contains(stage) {
                return Err(GateError::Config(format!(
                    "review stage {stage} listed more than once"
                )));
            }
        }
        Ok(())
    }
}
