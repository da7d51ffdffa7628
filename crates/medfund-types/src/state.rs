use std::fmt;

use serde::{Deserialize, Serialize};

/// Workflow state of an application.
///
/// ```text
/// PendingHospitalReview ──► HospitalRejected
///          │
///          ├──► PendingCivicReview ──► CivicRejected     (two-stage workflow)
///          │            │
///          └────────────┴──► Raising
///
/// any state ──► Fraud
/// ```
///
/// `Raising` persists across donation and loan events. Which review stages
/// exist is a workflow setting; the states themselves are fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationState {
    /// Submitted, waiting for the hospital verifier.
    PendingHospitalReview,
    /// Rejected by the hospital verifier. Terminal.
    HospitalRejected,
    /// Approved by the hospital, waiting for the civic-office verifier.
    PendingCivicReview,
    /// Rejected by the civic-office verifier. Terminal.
    CivicRejected,
    /// Verified and accepting donations and loans.
    Raising,
    /// Flagged as fraudulent. Terminal for loan receipt and recharge.
    Fraud,
}

impl ApplicationState {
    /// The initial state of every application.
    pub const INITIAL: ApplicationState = ApplicationState::PendingHospitalReview;

    /// Returns `true` for the review-rejection states.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::HospitalRejected | Self::CivicRejected)
    }

    pub fn is_fraud(&self) -> bool {
        matches!(self, Self::Fraud)
    }

    /// Stable snake_case tag, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingHospitalReview => "pending_hospital_review",
            Self::HospitalRejected => "hospital_rejected",
            Self::PendingCivicReview => "pending_civic_review",
            Self::CivicRejected => "civic_rejected",
            Self::Raising => "raising",
            Self::Fraud => "fraud",
        }
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verification stage an application passes through before fundraising.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStage {
    /// Review by the treating hospital.
    Hospital,
    /// Review by the applicant's civic (street) office.
    Civic,
}

impl ReviewStage {
    /// State an application sits in while awaiting this stage.
    pub fn pending_state(&self) -> ApplicationState {
        match self {
            Self::Hospital => ApplicationState::PendingHospitalReview,
            Self::Civic => ApplicationState::PendingCivicReview,
        }
    }

    /// Terminal state entered when this stage rejects.
    pub fn rejected_state(&self) -> ApplicationState {
        match self {
            Self::Hospital => ApplicationState::HospitalRejected,
            Self::Civic => ApplicationState::CivicRejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hospital => "hospital",
            Self::Civic => "civic",
        }
    }
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_serialize_as_tags() {
        let json = serde_json::to_string(&ApplicationState::PendingHospitalReview).unwrap();
        assert_eq!(json, "\"pending_hospital_review\"");
        let back: ApplicationState = serde_json::from_str("\"raising\"").unwrap();
        assert_eq!(back, ApplicationState::Raising);
    }

    #[test]
    fn display_matches_serde_tag() {
        for state in [
            ApplicationState::PendingHospitalReview,
            ApplicationState::HospitalRejected,
            ApplicationState::PendingCivicReview,
            ApplicationState::CivicRejected,
            ApplicationState::Raising,
            ApplicationState::Fraud,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
        }
    }

    #[test]
    fn stage_states() {
        assert_eq!(
            ReviewStage::Hospital.pending_state(),
            ApplicationState::INITIAL
        );
        assert_eq!(
            ReviewStage::Civic.rejected_state(),
            ApplicationState::CivicRejected
        );
        assert!(ReviewStage::Civic.rejected_state().is_rejected());
    }
}
