//! Typed operation requests.
//!
//! Callers build these directly, or the chaincode adapter builds them from
//! ordered string arguments. Range checks (positive amounts, precision,
//! required references) are applied by the engine, not here, so every entry
//! path is held to the same rules.

use medfund_gate::ReviewDecision;
use medfund_types::{Amount, ApplicationId, Attachment};

use crate::error::{LedgerError, LedgerResult};
use crate::records::ApplicantIdentity;

/// Submit a new application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntakeRequest {
    pub application_id: ApplicationId,
    pub identity: ApplicantIdentity,
    pub requested_amount: Amount,
    pub attachments: Vec<Attachment>,
}

/// Record a reviewer's verdict for one verification stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRequest {
    pub application_id: ApplicationId,
    pub operator: String,
    pub decision: ReviewDecision,
    pub approved_amount: Amount,
    pub attachments: Vec<Attachment>,
}

/// Record a donation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DonationRequest {
    pub application_id: ApplicationId,
    pub donor: String,
    pub amount: Amount,
    pub settlement_ref: String,
    pub platform_id: String,
}

/// Issue a loan against the funds raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoanRequest {
    pub application_id: ApplicationId,
    pub amount: Amount,
    pub loan_number: String,
    pub first_repayment: String,
    pub total_periods: u32,
}

/// Confirm the lender's disbursement of a previously issued loan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoanReceiptRequest {
    pub application_id: ApplicationId,
    pub loan_number: String,
    pub loan_seq: u64,
    pub settlement_ref: String,
}

/// Record a recharge of the beneficiary's account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RechargeRequest {
    pub application_id: ApplicationId,
    pub settlement_ref: String,
    pub amount: Amount,
}

/// Reject blank reference fields.
pub(crate) fn require_text(field: &str, value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Reject amounts that are not strictly positive.
pub(crate) fn require_positive(field: &str, amount: Amount) -> LedgerResult<()> {
    if !amount.is_positive() {
        return Err(LedgerError::Validation(format!(
            "{field} must be greater than zero, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("operator", "").is_err());
        assert!(require_text("operator", "  ").is_err());
        assert!(require_text("operator", "op1").is_ok());
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        assert!(require_positive("amount", Amount::ZERO).is_err());
        assert!(require_positive("amount", Amount::parse("-1").unwrap()).is_err());
        let err = require_positive("amount", Amount::ZERO).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }
}
