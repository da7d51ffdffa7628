//! Persisted record types.
//!
//! One [`Application`] row exists per campaign. Donations, loans, and
//! recharges live in append-only sub-ledgers of their own, one row per event,
//! and the application keeps the counters and running totals that tie them
//! together.

use serde::{Deserialize, Serialize};

use medfund_gate::ReviewDecision;
use medfund_types::{Amount, ApplicationId, ApplicationState, Attachment, ReviewStage};

use crate::codec::SubLedger;

/// Identity fields submitted at intake. Never changed afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantIdentity {
    pub applicant_name: String,
    pub national_id: String,
    pub hospital_code: String,
    pub department_code: String,
    pub civic_office_code: String,
    pub clinic_card_number: String,
    /// Hash of the off-ledger description of the medical condition.
    pub description_hash: String,
}

/// Outcome of one verification stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub stage: ReviewStage,
    pub decision: ReviewDecision,
    /// Amount the reviewer approved; absent on rejection.
    pub approved_amount: Option<Amount>,
    pub operator: String,
    pub attachments: Vec<Attachment>,
}

/// The aggregate record of one crowdfunding application.
///
/// Counters only ever grow by one per event and each counter value is the
/// permanent sequence number of its sub-ledger record. Totals always equal
/// the sum of the matching sub-ledger entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub application_id: ApplicationId,
    pub identity: ApplicantIdentity,
    pub requested_amount: Amount,
    pub attachments: Vec<Attachment>,
    pub state: ApplicationState,
    /// Completed reviews, in stage order.
    pub reviews: Vec<ReviewRecord>,

    pub donation_counter: u64,
    pub amount_raised: Amount,
    pub balance: Amount,

    pub loan_counter: u64,
    pub total_loaned: Amount,
    /// Sum of loans whose funds the lender has confirmed as received.
    pub total_received: Amount,

    pub recharge_counter: u64,
    pub recharge_total: Amount,
}

impl Application {
    /// A freshly submitted application with zeroed counters.
    pub fn new(
        application_id: ApplicationId,
        identity: ApplicantIdentity,
        requested_amount: Amount,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            application_id,
            identity,
            requested_amount,
            attachments,
            state: ApplicationState::INITIAL,
            reviews: Vec::new(),
            donation_counter: 0,
            amount_raised: Amount::ZERO,
            balance: Amount::ZERO,
            loan_counter: 0,
            total_loaned: Amount::ZERO,
            total_received: Amount::ZERO,
            recharge_counter: 0,
            recharge_total: Amount::ZERO,
        }
    }

    /// The recorded review for `stage`, if that stage has decided.
    pub fn review(&self, stage: ReviewStage) -> Option<&ReviewRecord> {
        self.reviews.iter().find(|r| r.stage == stage)
    }

    /// Current counter of a sub-ledger.
    pub fn counter(&self, ledger: SubLedger) -> u64 {
        match ledger {
            SubLedger::Donation => self.donation_counter,
            SubLedger::Loan => self.loan_counter,
            SubLedger::Recharge => self.recharge_counter,
        }
    }

    /// Funds raised that are not yet committed to loans.
    pub fn available_credit(&self) -> Amount {
        self.amount_raised
            .checked_sub(self.total_loaned)
            .unwrap_or(Amount::ZERO)
    }
}

/// One donation. Immutable once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    /// Donor name, organisation, or "anonymous".
    pub donor: String,
    pub amount: Amount,
    /// Reference of the settlement on the donor's payment rail.
    pub settlement_ref: String,
    /// Donor's identifier on the donation platform.
    pub platform_id: String,
}

/// One loan drawn against the funds raised.
///
/// Immutable once written except for the single `funds_received`
/// false-to-true transition, which also fills `receipt_settlement_ref`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInfo {
    pub loan_number: String,
    /// First repayment period, e.g. `"2020-09"`.
    pub first_repayment: String,
    pub total_periods: u32,
    pub amount: Amount,
    pub funds_received: bool,
    pub receipt_settlement_ref: Option<String>,
    /// Settlement refs of repayments. Always empty; repayment scheduling is
    /// handled off-ledger.
    pub repayment_history: Vec<String>,
}

/// One disbursement to the beneficiary (hospital account recharge).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechargeHistory {
    pub amount: Amount,
    pub settlement_ref: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_application() -> Application {
        let mut app = Application::new(
            ApplicationId::new("1").unwrap(),
            ApplicantIdentity {
                applicant_name: "lyx".into(),
                national_id: "500222199009214433".into(),
                hospital_code: "995".into(),
                department_code: "3".into(),
                civic_office_code: "8876".into(),
                clinic_card_number: "9988123519".into(),
                description_hash: "abcdabcdabcdabcdabcdabcdabcdabcd".into(),
            },
            Amount::parse("4000.32").unwrap(),
            vec![Attachment::new("scan-1", "md5-1")],
        );
        app.reviews.push(ReviewRecord {
            stage: ReviewStage::Hospital,
            decision: ReviewDecision::Approve,
            approved_amount: Some(Amount::parse("3500").unwrap()),
            operator: "lengtingxue".into(),
            attachments: vec![],
        });
        app.state = ApplicationState::Raising;
        app.donation_counter = 2;
        app.amount_raised = Amount::parse("300.10").unwrap();
        app.balance = app.amount_raised;
        app
    }

    #[test]
    fn new_application_starts_pending() {
        let app = Application::new(
            ApplicationId::new("A1").unwrap(),
            ApplicantIdentity::default(),
            Amount::parse("10").unwrap(),
            vec![],
        );
        assert_eq!(app.state, ApplicationState::PendingHospitalReview);
        assert_eq!(app.donation_counter, 0);
        assert!(app.amount_raised.is_zero());
        assert!(app.review(ReviewStage::Hospital).is_none());
    }

    #[test]
    fn application_round_trips_through_json() {
        let app = sample_application();
        let json = serde_json::to_vec(&app).unwrap();
        let back: Application = serde_json::from_slice(&json).unwrap();
        assert_eq!(back, app);
        assert_eq!(back.requested_amount.to_string(), "4000.32");
        assert_eq!(back.amount_raised.to_string(), "300.1");
    }

    #[test]
    fn loan_round_trips_through_json() {
        let loan = LoanInfo {
            loan_number: "L1".into(),
            first_repayment: "2020-09".into(),
            total_periods: 24,
            amount: Amount::parse("200.05").unwrap(),
            funds_received: true,
            receipt_settlement_ref: Some("recv1".into()),
            repayment_history: vec![],
        };
        let back: LoanInfo = serde_json::from_slice(&serde_json::to_vec(&loan).unwrap()).unwrap();
        assert_eq!(back, loan);
    }

    #[test]
    fn available_credit_is_raised_minus_loaned() {
        let mut app = sample_application();
        app.total_loaned = Amount::parse("100").unwrap();
        assert_eq!(app.available_credit().to_string(), "200.1");
    }

    #[test]
    fn review_lookup_by_stage() {
        let app = sample_application();
        let review = app.review(ReviewStage::Hospital).unwrap();
        assert_eq!(review.operator, "lengtingxue");
        assert!(app.review(ReviewStage::Civic).is_none());
    }
}
