//! Lending ledger: loans drawn against raised funds and their receipt.

use tracing::{info, warn};

use medfund_store::LedgerStore;
use medfund_types::{ApplicationId, ApplicationState};

use crate::codec::{load_application, load_record, stage_application, stage_record};
use crate::engine::{add, Engine};
use crate::error::{LedgerError, LedgerResult};
use crate::records::LoanInfo;
use crate::requests::{require_text, LoanReceiptRequest, LoanRequest};

impl<S: LedgerStore> Engine<S> {
    /// Issue a loan and return its sequence number.
    ///
    /// Requires `Raising`. The cumulative amount loaned may never exceed the
    /// amount raised (the credit ceiling). The returned sequence number is
    /// what the lender later quotes to confirm receipt.
    pub fn issue_loan(&self, request: LoanRequest) -> LedgerResult<u64> {
        self.check_positive("loan amount", request.amount)?;
        require_text("loan number", &request.loan_number)?;
        require_text("first repayment period", &request.first_repayment)?;
        if request.total_periods == 0 {
            return Err(LedgerError::Validation(
                "total repayment periods must be at least 1".into(),
            ));
        }

        let id = request.application_id.clone();
        self.execute(&id, |tx| {
            let mut application = load_application(tx, &id)?;
            if application.state != ApplicationState::Raising {
                return Err(LedgerError::conflict(
                    &id,
                    application.state,
                    "not accepting loans",
                ));
            }

            let total_loaned = add(application.total_loaned, request.amount, "total loaned")?;
            if total_loaned > application.amount_raised {
                warn!(
                    application = %id,
                    requested = %request.amount,
                    loaned = %application.total_loaned,
                    raised = %application.amount_raised,
                    "loan exceeds credit ceiling"
                );
                return Err(LedgerError::CreditCeilingExceeded {
                    requested: request.amount,
                    total_loaned: application.total_loaned,
                    amount_raised: application.amount_raised,
                });
            }

            let seq = application.loan_counter + 1;
            let loan = LoanInfo {
                loan_number: request.loan_number,
                first_repayment: request.first_repayment,
                total_periods: request.total_periods,
                amount: request.amount,
                funds_received: false,
                receipt_settlement_ref: None,
                repayment_history: Vec::new(),
            };
            application.total_loaned = total_loaned;
            application.loan_counter = seq;

            stage_record(tx, &id, seq, &loan)?;
            stage_application(tx, &application)?;
            info!(
                application = %id,
                seq,
                loan_number = %loan.loan_number,
                amount = %loan.amount,
                loaned = %application.total_loaned,
                "loan issued"
            );
            Ok(seq)
        })
    }

    /// Confirm that the lender disbursed loan `loan_seq`.
    ///
    /// Withheld once the application is flagged as fraud. The quoted loan
    /// number must match the stored one, and each loan can be confirmed only
    /// once.
    pub fn confirm_loan_received(&self, request: LoanReceiptRequest) -> LedgerResult<()> {
        require_text("settlement reference", &request.settlement_ref)?;
        let id = request.application_id.clone();
        let seq = request.loan_seq;
        self.execute(&id, |tx| {
            let mut application = load_application(tx, &id)?;
            if application.state == ApplicationState::Fraud {
                warn!(application = %id, seq, "loan receipt attempted after fraud flag");
                return Err(LedgerError::conflict(
                    &id,
                    application.state,
                    "fraud, disbursement withheld",
                ));
            }

            let mut loan: LoanInfo = load_record(tx, &id, seq)?
                .ok_or_else(|| LedgerError::NotFound(format!("loan {seq} of {id}")))?;
            if loan.loan_number != request.loan_number {
                return Err(LedgerError::Integrity(format!(
                    "loan {seq} of {id} has number {}, not {}",
                    loan.loan_number, request.loan_number
                )));
            }
            if loan.funds_received {
                return Err(LedgerError::DuplicateReceipt {
                    application_id: id.clone(),
                    loan_seq: seq,
                });
            }

            loan.funds_received = true;
            loan.receipt_settlement_ref = Some(request.settlement_ref);
            application.total_received = add(application.total_received, loan.amount, "total received")?;

            stage_record(tx, &id, seq, &loan)?;
            stage_application(tx, &application)?;
            info!(
                application = %id,
                seq,
                amount = %loan.amount,
                received = %application.total_received,
                "loan funds received"
            );
            Ok(())
        })
    }

    /// Loan record `seq` of the application.
    pub fn get_loan(&self, id: &ApplicationId, seq: u64) -> LedgerResult<LoanInfo> {
        self.read(id, |tx| {
            load_application(tx, id)?;
            load_record(tx, id, seq)?
                .ok_or_else(|| LedgerError::NotFound(format!("loan {seq} of {id}")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::DonationRequest;
    use crate::testing::{id, pending_engine, raising_engine};
    use medfund_store::InMemoryLedgerStore;
    use medfund_types::Amount;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn donate(engine: &Engine<InMemoryLedgerStore>, amount: &str) {
        engine
            .donate(DonationRequest {
                application_id: id("A1"),
                donor: "d1".into(),
                amount: Amount::parse(amount).unwrap(),
                settlement_ref: "s1".into(),
                platform_id: "p1".into(),
            })
            .unwrap();
    }

    fn loan(amount: &str, number: &str) -> LoanRequest {
        LoanRequest {
            application_id: id("A1"),
            amount: Amount::parse(amount).unwrap(),
            loan_number: number.into(),
            first_repayment: "2020-09".into(),
            total_periods: 24,
        }
    }

    fn receipt(number: &str, seq: u64) -> LoanReceiptRequest {
        LoanReceiptRequest {
            application_id: id("A1"),
            loan_number: number.into(),
            loan_seq: seq,
            settlement_ref: "recv1".into(),
        }
    }

    #[test]
    fn loan_within_ceiling_is_issued() {
        let engine = raising_engine("A1");
        donate(&engine, "300");
        assert_eq!(engine.issue_loan(loan("200", "L1")).unwrap(), 1);

        let app = engine.get_info(&id("A1")).unwrap();
        assert_eq!(app.loan_counter, 1);
        assert_eq!(app.total_loaned.to_string(), "200");

        let record = engine.get_loan(&id("A1"), 1).unwrap();
        assert_eq!(record.loan_number, "L1");
        assert_eq!(record.total_periods, 24);
        assert!(!record.funds_received);
        assert!(record.receipt_settlement_ref.is_none());
        assert!(record.repayment_history.is_empty());
    }

    #[test]
    fn loan_over_ceiling_is_rejected_without_writes() {
        let engine = raising_engine("A1");
        donate(&engine, "300");
        engine.issue_loan(loan("200", "L1")).unwrap();
        let before = engine.store().snapshot();

        let err = engine.issue_loan(loan("150", "L2")).unwrap_err();
        assert!(matches!(err, LedgerError::CreditCeilingExceeded { .. }));
        assert_eq!(engine.store().snapshot(), before);
    }

    #[test]
    fn loan_exactly_at_ceiling_is_allowed() {
        let engine = raising_engine("A1");
        donate(&engine, "300");
        engine.issue_loan(loan("200", "L1")).unwrap();
        assert_eq!(engine.issue_loan(loan("100", "L2")).unwrap(), 2);
        let app = engine.get_info(&id("A1")).unwrap();
        assert!(app.available_credit().is_zero());
    }

    #[test]
    fn loan_with_nothing_raised_is_rejected() {
        let engine = raising_engine("A1");
        let err = engine.issue_loan(loan("1", "L1")).unwrap_err();
        assert!(matches!(err, LedgerError::CreditCeilingExceeded { .. }));
    }

    #[test]
    fn loan_argument_validation() {
        let engine = raising_engine("A1");
        donate(&engine, "300");
        assert!(matches!(
            engine.issue_loan(loan("0", "L1")),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            engine.issue_loan(loan("10", "")),
            Err(LedgerError::Validation(_))
        ));
        let mut zero_periods = loan("10", "L1");
        zero_periods.total_periods = 0;
        assert!(matches!(
            engine.issue_loan(zero_periods),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn loan_before_raising_is_conflict() {
        let engine = pending_engine("A1");
        let err = engine.issue_loan(loan("10", "L1")).unwrap_err();
        assert!(matches!(err, LedgerError::StateConflict { .. }));
    }

    #[test]
    fn loan_and_donation_records_do_not_collide() {
        let engine = raising_engine("A1");
        donate(&engine, "300");
        engine.issue_loan(loan("200", "L1")).unwrap();
        assert_eq!(engine.get_donation(&id("A1"), 1).unwrap().amount.to_string(), "300");
        assert_eq!(engine.get_loan(&id("A1"), 1).unwrap().amount.to_string(), "200");
    }

    #[test]
    fn receipt_is_confirmed_once() {
        let engine = raising_engine("A1");
        donate(&engine, "300");
        engine.issue_loan(loan("200", "L1")).unwrap();

        engine.confirm_loan_received(receipt("L1", 1)).unwrap();
        let app = engine.get_info(&id("A1")).unwrap();
        assert_eq!(app.total_received.to_string(), "200");
        let record = engine.get_loan(&id("A1"), 1).unwrap();
        assert!(record.funds_received);
        assert_eq!(record.receipt_settlement_ref.as_deref(), Some("recv1"));

        let before = engine.store().snapshot();
        let err = engine.confirm_loan_received(receipt("L1", 1)).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateReceipt { loan_seq: 1, .. }));
        assert_eq!(engine.store().snapshot(), before);
    }

    #[test]
    fn receipt_with_wrong_loan_number_is_integrity_error() {
        let engine = raising_engine("A1");
        donate(&engine, "300");
        engine.issue_loan(loan("200", "L1")).unwrap();
        let err = engine.confirm_loan_received(receipt("L9", 1)).unwrap_err();
        assert!(matches!(err, LedgerError::Integrity(_)));
    }

    #[test]
    fn receipt_for_unknown_loan_is_not_found() {
        let engine = raising_engine("A1");
        let err = engine.confirm_loan_received(receipt("L1", 7)).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn receipt_after_fraud_is_withheld() {
        let engine = raising_engine("A1");
        donate(&engine, "300");
        engine.issue_loan(loan("200", "L1")).unwrap();
        engine.mark_fraud(&id("A1")).unwrap();

        let err = engine.confirm_loan_received(receipt("L1", 1)).unwrap_err();
        assert!(err.to_string().contains("disbursement withheld"));
        assert!(engine.get_info(&id("A1")).unwrap().total_received.is_zero());
    }

    #[test]
    fn loan_issuance_after_fraud_is_blocked_by_raising_precondition() {
        let engine = raising_engine("A1");
        donate(&engine, "300");
        engine.mark_fraud(&id("A1")).unwrap();
        let err = engine.issue_loan(loan("10", "L1")).unwrap_err();
        assert!(err.to_string().contains("not accepting loans"));
    }

    #[derive(Clone, Debug)]
    enum Step {
        Donate(i64),
        Loan(i64),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (1i64..50_000).prop_map(Step::Donate),
            (1i64..80_000).prop_map(Step::Loan),
        ]
    }

    #[test]
    fn concurrent_loans_never_exceed_the_ceiling() {
        let engine = raising_engine("A1");
        donate(&engine, "1000");
        let mut seqs: Vec<u64> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|worker| {
                    let engine = &engine;
                    scope.spawn(move || {
                        (0..10)
                            .filter_map(|n| {
                                match engine.issue_loan(loan("20", &format!("L{worker}-{n}"))) {
                                    Ok(seq) => Some(seq),
                                    Err(LedgerError::CreditCeilingExceeded { .. }) => None,
                                    Err(other) => panic!("unexpected error: {other}"),
                                }
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|worker| worker.join().unwrap())
                .collect()
        });
        seqs.sort_unstable();
        assert_eq!(seqs, (1..=50).collect::<Vec<u64>>());

        let app = engine.get_info(&id("A1")).unwrap();
        assert_eq!(app.loan_counter, 50);
        assert_eq!(app.total_loaned.to_string(), "1000");
        assert!(engine.audit(&id("A1")).unwrap().is_consistent());
    }

    #[test]
    fn fraud_flag_holds_across_later_operations() {
        let engine = raising_engine("A1");
        donate(&engine, "300");
        engine.issue_loan(loan("200", "L1")).unwrap();
        engine.mark_fraud(&id("A1")).unwrap();

        assert_eq!(engine.mark_fraud(&id("A1")).unwrap(), ApplicationState::Fraud);
        let review = engine.hospital_verify(crate::requests::ReviewRequest {
            application_id: id("A1"),
            operator: "op2".into(),
            decision: medfund_gate::ReviewDecision::Approve,
            approved_amount: Amount::parse("3500").unwrap(),
            attachments: Vec::new(),
        });
        assert!(matches!(review, Err(LedgerError::StateConflict { .. })));
        let donation = engine.donate(DonationRequest {
            application_id: id("A1"),
            donor: "d2".into(),
            amount: Amount::parse("50").unwrap(),
            settlement_ref: "s2".into(),
            platform_id: "p1".into(),
        });
        assert!(matches!(donation, Err(LedgerError::StateConflict { .. })));
        assert!(engine.audit(&id("A1")).unwrap().is_consistent());
        assert_eq!(engine.get_info(&id("A1")).unwrap().state, ApplicationState::Fraud);

        let before = engine.store().snapshot();
        assert!(matches!(
            engine.confirm_loan_received(receipt("L1", 1)),
            Err(LedgerError::StateConflict { .. })
        ));
        assert!(matches!(
            engine.recharge(crate::requests::RechargeRequest {
                application_id: id("A1"),
                settlement_ref: "r1".into(),
                amount: Amount::parse("10").unwrap(),
            }),
            Err(LedgerError::StateConflict { .. })
        ));
        assert_eq!(engine.store().snapshot(), before);
    }

    proptest! {
        #[test]
        fn total_loaned_never_exceeds_raised(steps in prop::collection::vec(step(), 1..30)) {
            let engine = raising_engine("A1");
            let mut issued = 0u64;
            for (i, s) in steps.iter().enumerate() {
                match s {
                    Step::Donate(c) => {
                        engine.donate(DonationRequest {
                            application_id: id("A1"),
                            donor: "d".into(),
                            amount: Amount::new(Decimal::new(*c, 2)),
                            settlement_ref: format!("s{i}"),
                            platform_id: "p".into(),
                        }).unwrap();
                    }
                    Step::Loan(c) => {
                        let result = engine.issue_loan(LoanRequest {
                            application_id: id("A1"),
                            amount: Amount::new(Decimal::new(*c, 2)),
                            loan_number: format!("L{i}"),
                            first_repayment: "2020-09".into(),
                            total_periods: 12,
                        });
                        match result {
                            Ok(seq) => {
                                issued += 1;
                                prop_assert_eq!(seq, issued);
                            }
                            Err(LedgerError::CreditCeilingExceeded { .. }) => {}
                            Err(other) => prop_assert!(false, "unexpected error: {other}"),
                        }
                    }
                }
                let app = engine.get_info(&id("A1")).unwrap();
                prop_assert!(app.total_loaned <= app.amount_raised);
                prop_assert_eq!(app.loan_counter, issued);
            }
        }
    }
}
