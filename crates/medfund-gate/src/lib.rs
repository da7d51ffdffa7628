//! Verification gate for medfund applications.
//!
//! An application leaves its initial state only by passing every configured
//! review stage in order. The gate owns the stage list and the explicit
//! transition table derived from it; any transition not in the table is
//! rejected.
//!
//! # Quick Start
//!
//! ```rust
//! use medfund_gate::{ReviewDecision, Workflow, WorkflowConfig};
//! use medfund_types::{ApplicationState, ReviewStage};
//!
//! let workflow = Workflow::new(WorkflowConfig::two_stage()).unwrap();
//! let next = workflow
//!     .review(ApplicationState::INITIAL, ReviewStage::Hospital, ReviewDecision::Approve)
//!     .unwrap();
//! assert_eq!(next, ApplicationState::PendingCivicReview);
//! ```

pub mod config;
pub mod error;
pub mod workflow;

pub use config::WorkflowConfig;
pub use error::GateError;
pub use workflow::{ReviewDecision, Transition, TransitionTable, Workflow, WorkflowEvent};
