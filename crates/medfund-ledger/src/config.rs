use serde::{Deserialize, Serialize};

use medfund_gate::WorkflowConfig;

use crate::error::{LedgerError, LedgerResult};

/// Largest scale a `rust_decimal` value can carry.
const MAX_SCALE: u32 = 28;

/// Engine configuration.
///
/// ```toml
/// max_fraction_digits = 2
///
/// [workflow]
/// stages = ["hospital", "civic"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Most digits accepted after the decimal point in amount arguments.
    pub max_fraction_digits: u32,
    /// Review stages an application passes before fundraising.
    pub workflow: WorkflowConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workflow: WorkflowConfig::default(),
            max_fraction_digits: 2,
        }
    }
}

impl EngineConfig {
    /// Default settings with the hospital-then-civic workflow.
    pub fn two_stage() -> Self {
        Self {
            workflow: WorkflowConfig::two_stage(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.max_fraction_digits > MAX_SCALE {
            return Err(LedgerError::Validation(format!(
                "max_fraction_digits must be at most {MAX_SCALE}, got {}",
                self.max_fraction_digits
            )));
        }
        self.workflow
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medfund_types::ReviewStage;

    #[test]
    fn default_config() {
        let c = EngineConfig::default();
        assert_eq!(c.max_fraction_digits, 2);
        assert_eq!(c.workflow.stages, vec![ReviewStage::Hospital]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn parses_toml_with_defaults() {
        let c: EngineConfig = toml::from_str(
            r#"
            [workflow]
            stages = ["hospital", "civic"]
            "#,
        )
        .unwrap();
        assert_eq!(c, EngineConfig::two_stage());
    }

    #[test]
    fn rejects_excessive_scale() {
        let c = EngineConfig {
            max_fraction_digits: 29,
            ..EngineConfig::default()
        };
        assert!(matches!(c.validate(), Err(LedgerError::Validation(_))));
    }
}
