//! Application lifecycle and financial bookkeeping for medfund.
//!
//! This crate is the heart of medfund. It provides:
//! - The [`Application`] aggregate and its sub-ledger records
//! - Key layout and JSON codec over any [`medfund_store::LedgerStore`]
//! - The [`Engine`]: intake, verification reviews and the fraud flag,
//!   donations, loans with the credit ceiling, recharges
//! - Read-only reconciliation ([`Engine::audit`])
//!
//! ```
//! use medfund_ledger::{ApplicantIdentity, Engine, IntakeRequest};
//! use medfund_store::InMemoryLedgerStore;
//! use medfund_types::{Amount, ApplicationId, ApplicationState};
//!
//! let engine = Engine::with_defaults(InMemoryLedgerStore::new());
//! let app = engine
//!     .intake(IntakeRequest {
//!         application_id: ApplicationId::new("A1").unwrap(),
//!         identity: ApplicantIdentity::default(),
//!         requested_amount: Amount::parse("4000.32").unwrap(),
//!         attachments: Vec::new(),
//!     })
//!     .unwrap();
//! assert_eq!(app.state, ApplicationState::PendingHospitalReview);
//! ```

pub mod audit;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod fundraising;
pub mod lending;
mod locks;
pub mod recharge;
pub mod records;
pub mod registry;
pub mod requests;

#[cfg(test)]
mod testing;

pub use audit::{AuditReport, Violation, ViolationKind};
pub use codec::SubLedger;
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use records::{Application, ApplicantIdentity, Donation, LoanInfo, RechargeHistory, ReviewRecord};
pub use requests::{
    DonationRequest, IntakeRequest, LoanReceiptRequest, LoanRequest, RechargeRequest,
    ReviewRequest,
};
