use medfund_ledger::{ErrorKind, LedgerError};

/// Errors produced while decoding or executing an invocation.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("unsupported function: {0}")]
    UnknownFunction(String),

    #[error("{function} expects {expected} arguments, got {got}")]
    Arity {
        function: &'static str,
        expected: String,
        got: usize,
    },

    #[error("invalid {name} {value:?}: {reason}")]
    Argument {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("cannot encode response: {0}")]
    Encode(String),
}

impl InvokeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFunction(_) | Self::Arity { .. } | Self::Argument { .. } => {
                ErrorKind::Validation
            }
            Self::Ledger(e) => e.kind(),
            Self::Encode(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn argument(
        name: &'static str,
        value: &str,
        reason: impl ToString,
    ) -> Self {
        Self::Argument {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type InvokeResult<T> = Result<T, InvokeError>;
