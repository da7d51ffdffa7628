//! Positional argument decoding.
//!
//! Each function takes its arguments as an ordered list of strings. This
//! module turns that list into the engine's typed requests. Only syntax is
//! checked here; ranges and precision are the engine's business.

use medfund_gate::ReviewDecision;
use medfund_ledger::{
    ApplicantIdentity, DonationRequest, IntakeRequest, LoanReceiptRequest, LoanRequest,
    RechargeRequest, ReviewRequest,
};
use medfund_types::{parse_attachments, Amount, ApplicationId, Attachment};

use crate::error::{InvokeError, InvokeResult};
use crate::function::Function;

/// Arguments of one invocation, already checked against the function's arity.
#[derive(Debug)]
pub struct Args<'a> {
    function: Function,
    values: &'a [String],
}

impl<'a> Args<'a> {
    pub fn new(function: Function, values: &'a [String]) -> InvokeResult<Self> {
        let arity = function.arity();
        if !arity.contains(&values.len()) {
            let expected = if arity.start() == arity.end() {
                arity.start().to_string()
            } else {
                format!("{} to {}", arity.start(), arity.end())
            };
            return Err(InvokeError::Arity {
                function: function.name(),
                expected,
                got: values.len(),
            });
        }
        Ok(Self { function, values })
    }

    pub fn function(&self) -> Function {
        self.function
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn raw(&self, index: usize) -> &'a str {
        self.values.get(index).map(String::as_str).unwrap_or_default()
    }

    fn text(&self, index: usize) -> String {
        self.raw(index).to_string()
    }

    pub fn application_id(&self) -> InvokeResult<ApplicationId> {
        let raw = self.raw(0);
        ApplicationId::new(raw).map_err(|e| InvokeError::argument("application id", raw, e))
    }

    fn amount(&self, index: usize, name: &'static str) -> InvokeResult<Amount> {
        let raw = self.raw(index);
        Amount::parse(raw).map_err(|e| InvokeError::argument(name, raw, e))
    }

    fn number<T: std::str::FromStr>(&self, index: usize, name: &'static str) -> InvokeResult<T>
    where
        T::Err: std::fmt::Display,
    {
        let raw = self.raw(index);
        raw.trim()
            .parse()
            .map_err(|e| InvokeError::argument(name, raw, e))
    }

    /// Sequence number of a sub-ledger record.
    pub fn seq(&self, index: usize) -> InvokeResult<u64> {
        self.number(index, "sequence number")
    }

    fn decision(&self, index: usize) -> InvokeResult<ReviewDecision> {
        let raw = self.raw(index);
        raw.parse().map_err(|e| InvokeError::argument("decision", raw, e))
    }

    /// Attachment list at `index`; absent or blank means none.
    fn attachments(&self, index: usize) -> InvokeResult<Vec<Attachment>> {
        let raw = self.raw(index);
        parse_attachments(raw).map_err(|e| InvokeError::argument("attachments", raw, e))
    }

    /// `id, name, nationalId, hospital, department, civicOffice, card, descHash, amount [, attachments]`
    pub fn intake(&self) -> InvokeResult<IntakeRequest> {
        Ok(IntakeRequest {
            application_id: self.application_id()?,
            identity: ApplicantIdentity {
                applicant_name: self.text(1),
                national_id: self.text(2),
                hospital_code: self.text(3),
                department_code: self.text(4),
                civic_office_code: self.text(5),
                clinic_card_number: self.text(6),
                description_hash: self.text(7),
            },
            requested_amount: self.amount(8, "requested amount")?,
            attachments: self.attachments(9)?,
        })
    }

    /// `id, operator, decision, approvedAmount, attachments`
    pub fn review(&self) -> InvokeResult<ReviewRequest> {
        Ok(ReviewRequest {
            application_id: self.application_id()?,
            operator: self.text(1),
            decision: self.decision(2)?,
            approved_amount: self.amount(3, "approved amount")?,
            attachments: self.attachments(4)?,
        })
    }

    /// `id, donor, amount, settlementRef, platformId`
    pub fn donation(&self) -> InvokeResult<DonationRequest> {
        Ok(DonationRequest {
            application_id: self.application_id()?,
            donor: self.text(1),
            amount: self.amount(2, "donation amount")?,
            settlement_ref: self.text(3),
            platform_id: self.text(4),
        })
    }

    /// `id, amount, loanNumber, firstRepayment, totalPeriods`
    pub fn loan(&self) -> InvokeResult<LoanRequest> {
        Ok(LoanRequest {
            application_id: self.application_id()?,
            amount: self.amount(1, "loan amount")?,
            loan_number: self.text(2),
            first_repayment: self.text(3),
            total_periods: self.number(4, "total periods")?,
        })
    }

    /// `id, loanNumber, loanSeq, settlementRef`
    pub fn loan_receipt(&self) -> InvokeResult<LoanReceiptRequest> {
        Ok(LoanReceiptRequest {
            application_id: self.application_id()?,
            loan_number: self.text(1),
            loan_seq: self.seq(2)?,
            settlement_ref: self.text(3),
        })
    }

    /// `id, settlementRef, amount`
    pub fn recharge(&self) -> InvokeResult<RechargeRequest> {
        Ok(RechargeRequest {
            application_id: self.application_id()?,
            settlement_ref: self.text(1),
            amount: self.amount(2, "recharge amount")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn arity_is_checked() {
        let values = strings(&["A1", "d1", "300"]);
        let err = Args::new(Function::Donate, &values).unwrap_err();
        assert_eq!(err.to_string(), "donate expects 5 arguments, got 3");

        let values = strings(&["A1"; 8]);
        let err = Args::new(Function::Intake, &values).unwrap_err();
        assert!(err.to_string().contains("9 to 10"));
    }

    #[test]
    fn intake_without_attachments() {
        let values = strings(&[
            "1",
            "lyx",
            "500222199009214433",
            "995",
            "3",
            "8876",
            "9988123519",
            "abcdabcdabcdabcdabcdabcdabcdabcd",
            "4000.32",
        ]);
        let request = Args::new(Function::Intake, &values).unwrap().intake().unwrap();
        assert_eq!(request.application_id.as_str(), "1");
        assert_eq!(request.identity.hospital_code, "995");
        assert_eq!(request.identity.civic_office_code, "8876");
        assert_eq!(request.requested_amount.to_string(), "4000.32");
        assert!(request.attachments.is_empty());
    }

    #[test]
    fn intake_with_attachments() {
        let mut values = strings(&["1", "n", "i", "h", "d", "c", "k", "m", "10"]);
        values.push(r#"[{"id":"a1","md5":"h1"}]"#.into());
        let request = Args::new(Function::Intake, &values).unwrap().intake().unwrap();
        assert_eq!(request.attachments.len(), 1);
        assert_eq!(request.attachments[0].content_hash, "h1");
    }

    #[test]
    fn review_decision_flags() {
        let values = strings(&["A1", "op1", "1", "3500", "[]"]);
        let request = Args::new(Function::HospitalVerify, &values).unwrap().review().unwrap();
        assert_eq!(request.decision, ReviewDecision::Approve);

        let values = strings(&["A1", "op1", "maybe", "3500", "[]"]);
        let err = Args::new(Function::HospitalVerify, &values)
            .unwrap()
            .review()
            .unwrap_err();
        assert!(matches!(err, InvokeError::Argument { name: "decision", .. }));
    }

    #[test]
    fn malformed_amount_names_the_argument() {
        let values = strings(&["A1", "d1", "lots", "s1", "p1"]);
        let err = Args::new(Function::Donate, &values).unwrap().donation().unwrap_err();
        assert!(err.to_string().contains("donation amount"));
    }

    #[test]
    fn legacy_float_text_is_accepted() {
        let values = strings(&["A1", "d1", "3e+02", "s1", "p1"]);
        let request = Args::new(Function::Donate, &values).unwrap().donation().unwrap();
        assert_eq!(request.amount.to_string(), "300");
    }

    #[test]
    fn loan_and_receipt_fields() {
        let values = strings(&["A1", "200", "L1", "2020-09", "24"]);
        let loan = Args::new(Function::IssueLoan, &values).unwrap().loan().unwrap();
        assert_eq!(loan.total_periods, 24);

        let values = strings(&["A1", "L1", "x", "recv1"]);
        let err = Args::new(Function::ConfirmLoanReceived, &values)
            .unwrap()
            .loan_receipt()
            .unwrap_err();
        assert!(matches!(err, InvokeError::Argument { name: "sequence number", .. }));
    }

    #[test]
    fn invalid_application_id() {
        let values = strings(&["A,1"]);
        let err = Args::new(Function::GetInfo, &values)
            .unwrap()
            .application_id()
            .unwrap_err();
        assert!(matches!(err, InvokeError::Argument { name: "application id", .. }));
    }
}
