use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("invalid application id {input:?}: {reason}")]
    InvalidApplicationId { input: String, reason: String },

    #[error("invalid attachment list: {0}")]
    InvalidAttachments(String),
}
