//! Application registry: intake, verification reviews, and the fraud flag.

use tracing::{info, warn};

use medfund_gate::{GateError, ReviewDecision};
use medfund_store::LedgerStore;
use medfund_types::{ApplicationId, ApplicationState, ReviewStage};

use crate::codec::{application_key, load_application, stage_application};
use crate::engine::Engine;
use crate::error::{LedgerError, LedgerResult};
use crate::records::{Application, ReviewRecord};
use crate::requests::{require_text, IntakeRequest, ReviewRequest};

impl<S: LedgerStore> Engine<S> {
    /// Create a new application in the initial state.
    ///
    /// Fails with `DuplicateApplication` if the id is already on the ledger;
    /// the existing record is left untouched.
    pub fn intake(&self, request: IntakeRequest) -> LedgerResult<Application> {
        self.check_positive("requested amount", request.requested_amount)?;
        let id = request.application_id.clone();
        self.execute(&id, |tx| {
            if tx.exists(&application_key(&id))? {
                return Err(LedgerError::DuplicateApplication(id.clone()));
            }
            let application = Application::new(
                request.application_id,
                request.identity,
                request.requested_amount,
                request.attachments,
            );
            stage_application(tx, &application)?;
            info!(
                application = %id,
                requested = %application.requested_amount,
                "application submitted"
            );
            Ok(application)
        })
    }

    /// Hospital verification.
    pub fn hospital_verify(&self, request: ReviewRequest) -> LedgerResult<ApplicationState> {
        self.review(ReviewStage::Hospital, request)
    }

    /// Civic-office verification, only in workflows that include the stage.
    pub fn civic_verify(&self, request: ReviewRequest) -> LedgerResult<ApplicationState> {
        self.review(ReviewStage::Civic, request)
    }

    /// Apply a review verdict for `stage` and return the new state.
    ///
    /// Valid only while the application is pending that stage. Approval
    /// records the approved amount; both verdicts record the operator and
    /// attachments.
    pub fn review(
        &self,
        stage: ReviewStage,
        request: ReviewRequest,
    ) -> LedgerResult<ApplicationState> {
        require_text("operator", &request.operator)?;
        if request.approved_amount.as_decimal().is_sign_negative() {
            return Err(LedgerError::Validation(format!(
                "approved amount must not be negative, got {}",
                request.approved_amount
            )));
        }
        self.check_precision("approved amount", request.approved_amount)?;

        let id = request.application_id.clone();
        self.execute(&id, |tx| {
            let mut application = load_application(tx, &id)?;
            let from = application.state;
            let next = self
                .workflow()
                .review(from, stage, request.decision)
                .map_err(|e| gate_conflict(&id, from, e))?;

            let approved_amount = match request.decision {
                ReviewDecision::Approve => Some(request.approved_amount),
                ReviewDecision::Reject => None,
            };
            application.reviews.push(ReviewRecord {
                stage,
                decision: request.decision,
                approved_amount,
                operator: request.operator,
                attachments: request.attachments,
            });
            application.state = next;
            stage_application(tx, &application)?;
            info!(application = %id, %stage, from = %from, to = %next, "review recorded");
            Ok(next)
        })
    }

    /// Flag the application as fraudulent.
    ///
    /// Unconditional and idempotent: flagging an already flagged application
    /// changes nothing. The flag only withholds loan receipts and recharges;
    /// donations and loan issuance stop because they require `Raising`, not
    /// because of a fraud check of their own.
    pub fn mark_fraud(&self, id: &ApplicationId) -> LedgerResult<ApplicationState> {
        self.execute(id, |tx| {
            let mut application = load_application(tx, id)?;
            let from = application.state;
            let next = self
                .workflow()
                .mark_fraud(from)
                .map_err(|e| gate_conflict(id, from, e))?;
            if from == next {
                return Ok(next);
            }
            application.state = next;
            stage_application(tx, &application)?;
            warn!(application = %id, from = %from, "application flagged as fraud");
            Ok(next)
        })
    }

    /// Full snapshot of the application aggregate.
    pub fn get_info(&self, id: &ApplicationId) -> LedgerResult<Application> {
        self.read(id, |tx| load_application(tx, id))
    }
}

fn gate_conflict(id: &ApplicationId, state: ApplicationState, err: GateError) -> LedgerError {
    match err {
        GateError::TransitionRejected { reason, .. } => LedgerError::conflict(id, state, reason),
        other => LedgerError::Validation(other.to_string()),
    }
}
