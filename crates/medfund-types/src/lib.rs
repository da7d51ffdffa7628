//! Foundation types for the medfund ledger.
//!
//! This crate provides the identity, monetary, and workflow types shared by
//! every other medfund crate.
//!
//! # Key Types
//!
//! - [`ApplicationId`] -- Validated ledger key of one crowdfunding campaign
//! - [`Amount`] -- Exact decimal amount with one canonical text form
//! - [`Attachment`] -- `{id, content_hash}` pair submitted as supporting evidence
//! - [`ApplicationState`] -- Tagged workflow state of an application
//! - [`ReviewStage`] -- A verification stage (hospital, civic)

pub mod amount;
pub mod attachment;
pub mod error;
pub mod identity;
pub mod state;

pub use amount::Amount;
pub use attachment::{parse_attachments, Attachment};
pub use error::TypeError;
pub use identity::ApplicationId;
pub use state::{ApplicationState, ReviewStage};
