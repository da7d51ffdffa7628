use medfund_types::ApplicationState;

/// Errors from workflow configuration and transition checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The workflow configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The requested transition is not in the table for the current state.
    #[error("cannot {event} while {from}: {reason}")]
    TransitionRejected {
        from: ApplicationState,
        event: String,
        reason: String,
    },

    /// A review decision argument could not be understood.
    #[error("invalid review decision: {0:?}")]
    InvalidDecision(String),
}

impl GateError {
    pub(crate) fn rejected(
        from: ApplicationState,
        event: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TransitionRejected {
            from,
            event: event.into(),
            reason: reason.into(),
        }
    }
}
