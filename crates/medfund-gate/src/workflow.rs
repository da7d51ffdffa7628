use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use medfund_types::{ApplicationState, ReviewStage};

use crate::config::WorkflowConfig;
use crate::error::GateError;

// ---------------------------------------------------------------------------
// ReviewDecision
// ---------------------------------------------------------------------------

/// Verdict of a reviewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl FromStr for ReviewDecision {
    type Err = GateError;

    /// Accepts the wire flags `"1"` / `"0"` as well as the words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "approve" | "agree" => Ok(Self::Approve),
            "0" | "reject" => Ok(Self::Reject),
            _ => Err(GateError::InvalidDecision(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowEvent / Transition
// ---------------------------------------------------------------------------

/// Something that moves an application between states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkflowEvent {
    Review {
        stage: ReviewStage,
        decision: ReviewDecision,
    },
    MarkFraud,
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Review {
                stage,
                decision: ReviewDecision::Approve,
            } => write!(f, "approve {stage} review"),
            Self::Review {
                stage,
                decision: ReviewDecision::Reject,
            } => write!(f, "reject {stage} review"),
            Self::MarkFraud => f.write_str("mark fraud"),
        }
    }
}

/// One permitted edge of the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: ApplicationState,
    pub event: WorkflowEvent,
    pub to: ApplicationState,
}

// ---------------------------------------------------------------------------
// TransitionTable
// ---------------------------------------------------------------------------

/// Explicit list of every permitted transition for a workflow.
///
/// Any (state, event) pair not listed is rejected.
#[derive(Clone, Debug)]
pub struct TransitionTable {
    transitions: Vec<Transition>,
}

/// Every state, for building the fraud edges.
const ALL_STATES: [ApplicationState; 6] = [
    ApplicationState::PendingHospitalReview,
    ApplicationState::HospitalRejected,
    ApplicationState::PendingCivicReview,
    ApplicationState::CivicRejected,
    ApplicationState::Raising,
    ApplicationState::Fraud,
];

impl TransitionTable {
    /// Build the table for a list of review stages.
    ///
    /// Stage `i` approves into the pending state of stage `i + 1`, the last
    /// stage approves into `Raising`, and every stage can reject into its own
    /// terminal state. Fraud can be flagged from every state, including
    /// `Fraud` itself so repeated flags are harmless.
    pub fn for_stages(stages: &[ReviewStage]) -> Self {
        let mut transitions = Vec::new();
        for (i, stage) in stages.iter().enumerate() {
            let from = stage.pending_state();
            let approved = stages
                .get(i + 1)
                .map(ReviewStage::pending_state)
                .unwrap_or(ApplicationState::Raising);
            transitions.push(Transition {
                from,
                event: WorkflowEvent::Review {
                    stage: *stage,
                    decision: ReviewDecision::Approve,
                },
                to: approved,
            });
            transitions.push(Transition {
                from,
                event: WorkflowEvent::Review {
                    stage: *stage,
                    decision: ReviewDecision::Reject,
                },
                to: stage.rejected_state(),
            });
        }
        for from in ALL_STATES {
            transitions.push(Transition {
                from,
                event: WorkflowEvent::MarkFraud,
                to: ApplicationState::Fraud,
            });
        }
        Self { transitions }
    }

    /// Target state for `event` from `from`, if the edge exists.
    pub fn next_state(
        &self,
        from: ApplicationState,
        event: WorkflowEvent,
    ) -> Option<ApplicationState> {
        self.transitions
            .iter()
            .find(|t| t.from == from && t.event == event)
            .map(|t| t.to)
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// The verification gate: ordered review stages plus the transition table
/// derived from them.
#[derive(Clone, Debug)]
pub struct Workflow {
    config: WorkflowConfig,
    table: TransitionTable,
}

impl Workflow {
    /// Validate `config` and derive its transition table.
    pub fn new(config: WorkflowConfig) -> Result<Self, GateError> {
        config.validate()?;
        let table = TransitionTable::for_stages(&config.stages);
        Ok(Self { config, table })
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn stages(&self) -> &[ReviewStage] {
        &self.config.stages
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Apply a review verdict and return the resulting state.
    ///
    /// Fails when `stage` is not awaiting review in `current`. The error
    /// reason tells the caller whether an earlier stage is still pending,
    /// an earlier stage already rejected the application, or this stage was
    /// already decided.
    pub fn review(
        &self,
        current: ApplicationState,
        stage: ReviewStage,
        decision: ReviewDecision,
    ) -> Result<ApplicationState, GateError> {
        let event = WorkflowEvent::Review { stage, decision };
        if let Some(next) = self.table.next_state(current, event) {
            debug!(from = %current, to = %next, %event, "review transition");
            return Ok(next);
        }
        Err(GateError::rejected(
            current,
            event.to_string(),
            self.review_conflict_reason(current, stage),
        ))
    }

    /// Flag fraud. Permitted from every state; flagging twice is a no-op.
    pub fn mark_fraud(&self, current: ApplicationState) -> Result<ApplicationState, GateError> {
        let event = WorkflowEvent::MarkFraud;
        self.table
            .next_state(current, event)
            .ok_or_else(|| GateError::rejected(current, event.to_string(), "no fraud edge"))
    }

    fn review_conflict_reason(&self, current: ApplicationState, stage: ReviewStage) -> String {
        let Some(position) = self.config.stages.iter().position(|s| *s == stage) else {
            return format!("{stage} review is not part of this workflow");
        };
        if current.is_fraud() {
            return "application is flagged as fraud".into();
        }
        for earlier in &self.config.stages[..position] {
            if current == earlier.pending_state() {
                return format!("{earlier} review is still pending");
            }
            if current == earlier.rejected_state() {
                return format!("application was already rejected at {earlier} review");
            }
        }
        if current == stage.rejected_state() {
            return format!("{stage} review already rejected this application");
        }
        format!("{stage} review has already been completed")
    }
}

impl Default for Workflow {
    fn default() -> Self {
        let config = WorkflowConfig::default();
        let table = TransitionTable::for_stages(&config.stages);
        Self { config, table }
    }
}
