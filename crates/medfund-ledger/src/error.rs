use medfund_store::StoreError;
use medfund_types::{Amount, ApplicationId, ApplicationState, TypeError};

/// Errors produced by ledger operations.
///
/// Every error aborts the operation before anything is committed, so the
/// ledger is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("application {0} already exists")]
    DuplicateApplication(ApplicationId),

    #[error("loan {loan_seq} of application {application_id} was already received")]
    DuplicateReceipt {
        application_id: ApplicationId,
        loan_seq: u64,
    },

    #[error("application {application_id} is {state}: {reason}")]
    StateConflict {
        application_id: ApplicationId,
        state: ApplicationState,
        reason: String,
    },

    #[error("integrity error: {0}")]
    Integrity(String),

    #[error(
        "credit ceiling exceeded: loaning {requested} on top of {total_loaned} would exceed {amount_raised} raised"
    )]
    CreditCeilingExceeded {
        requested: Amount,
        total_loaned: Amount,
        amount_raised: Amount,
    },

    #[error("cannot decode {key}: {reason}")]
    Codec { key: String, reason: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Flat classification of [`LedgerError`] for envelope mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    StateConflict,
    Integrity,
    CreditCeilingExceeded,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Duplicate => "duplicate",
            Self::StateConflict => "state_conflict",
            Self::Integrity => "integrity",
            Self::CreditCeilingExceeded => "credit_ceiling_exceeded",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::DuplicateApplication(_) | Self::DuplicateReceipt { .. } => ErrorKind::Duplicate,
            Self::StateConflict { .. } => ErrorKind::StateConflict,
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::CreditCeilingExceeded { .. } => ErrorKind::CreditCeilingExceeded,
            Self::Codec { .. } | Self::Store(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn conflict(
        application_id: &ApplicationId,
        state: ApplicationState,
        reason: impl Into<String>,
    ) -> Self {
        Self::StateConflict {
            application_id: application_id.clone(),
            state,
            reason: reason.into(),
        }
    }
}

impl From<TypeError> for LedgerError {
    fn from(e: TypeError) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
