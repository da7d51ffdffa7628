//! Reconciliation of an application aggregate against its sub-ledgers.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use medfund_store::{LedgerStore, Transaction};
use medfund_types::{Amount, ApplicationId};

use crate::codec::{load_application, load_record, SubLedger, SubLedgerRecord};
use crate::engine::{add, Engine};
use crate::error::LedgerResult;
use crate::records::{Application, Donation, LoanInfo, RechargeHistory};

/// Outcome of [`Engine::audit`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub application_id: ApplicationId,
    pub donations: u64,
    pub loans: u64,
    pub recharges: u64,
    pub donation_sum: Amount,
    pub loan_sum: Amount,
    pub received_sum: Amount,
    pub recharge_sum: Amount,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    /// Returns `true` if every check passed.
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A single discrepancy found by the audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub ledger: Option<SubLedger>,
    pub seq: Option<u64>,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MissingRecord,
    OrphanRecord,
    TotalMismatch,
    CeilingBreach,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingRecord => "missing_record",
            Self::OrphanRecord => "orphan_record",
            Self::TotalMismatch => "total_mismatch",
            Self::CeilingBreach => "ceiling_breach",
        };
        f.write_str(s)
    }
}

impl<S: LedgerStore> Engine<S> {
    /// Walk every sub-ledger of the application and check its aggregates.
    ///
    /// Read-only. Discrepancies are reported, not repaired; only store and
    /// decoding failures surface as errors.
    pub fn audit(&self, id: &ApplicationId) -> LedgerResult<AuditReport> {
        let report = self.read(id, |tx| {
            let application = load_application(tx, id)?;
            Auditor::new(tx, &application).run()
        })?;
        if report.is_consistent() {
            info!(application = %id, "audit passed");
        } else {
            warn!(application = %id, violations = report.violations.len(), "audit found violations");
        }
        Ok(report)
    }
}

struct Auditor<'a, 's, S: LedgerStore + ?Sized> {
    tx: &'a Transaction<'s, S>,
    application: &'a Application,
    violations: Vec<Violation>,
}

impl<'a, 's, S: LedgerStore + ?Sized> Auditor<'a, 's, S> {
    fn new(tx: &'a Transaction<'s, S>, application: &'a Application) -> Self {
        Self {
            tx,
            application,
            violations: Vec::new(),
        }
    }

    fn run(mut self) -> LedgerResult<AuditReport> {
        let app = self.application;

        let donations: Vec<Donation> = self.walk()?;
        let donation_sum = sum(donations.iter().map(|d| d.amount))?;
        self.compare(SubLedger::Donation, "amount raised", app.amount_raised, donation_sum);

        let loans: Vec<LoanInfo> = self.walk()?;
        let loan_sum = sum(loans.iter().map(|l| l.amount))?;
        let received_sum = sum(loans.iter().filter(|l| l.funds_received).map(|l| l.amount))?;
        self.compare(SubLedger::Loan, "total loaned", app.total_loaned, loan_sum);
        self.compare(SubLedger::Loan, "total received", app.total_received, received_sum);

        let recharges: Vec<RechargeHistory> = self.walk()?;
        let recharge_sum = sum(recharges.iter().map(|r| r.amount))?;
        self.compare(SubLedger::Recharge, "recharge total", app.recharge_total, recharge_sum);

        if app.total_loaned > app.amount_raised {
            self.violations.push(Violation {
                ledger: Some(SubLedger::Loan),
                seq: None,
                kind: ViolationKind::CeilingBreach,
                description: format!(
                    "{} loaned exceeds {} raised",
                    app.total_loaned, app.amount_raised
                ),
            });
        }

        Ok(AuditReport {
            application_id: app.application_id.clone(),
            donations: app.donation_counter,
            loans: app.loan_counter,
            recharges: app.recharge_counter,
            donation_sum,
            loan_sum,
            received_sum,
            recharge_sum,
            violations: self.violations,
        })
    }

    /// Load records `1..=counter`, noting gaps and a record past the counter.
    fn walk<T: SubLedgerRecord>(&mut self) -> LedgerResult<Vec<T>> {
        let app = self.application;
        let id = &app.application_id;
        let counter = app.counter(T::LEDGER);
        let mut records = Vec::new();
        for seq in 1..=counter {
            match load_record::<T, S>(self.tx, id, seq)? {
                Some(record) => records.push(record),
                None => self.violations.push(Violation {
                    ledger: Some(T::LEDGER),
                    seq: Some(seq),
                    kind: ViolationKind::MissingRecord,
                    description: format!("{} record {seq} is missing", T::LEDGER),
                }),
            }
        }
        let next = counter + 1;
        if load_record::<T, S>(self.tx, id, next)?.is_some() {
            self.violations.push(Violation {
                ledger: Some(T::LEDGER),
                seq: Some(next),
                kind: ViolationKind::OrphanRecord,
                description: format!("{} record {next} is beyond counter {counter}", T::LEDGER),
            });
        }
        Ok(records)
    }

    fn compare(&mut self, ledger: SubLedger, field: &str, recorded: Amount, computed: Amount) {
        if recorded != computed {
            self.violations.push(Violation {
                ledger: Some(ledger),
                seq: None,
                kind: ViolationKind::TotalMismatch,
                description: format!("{field} is {recorded} but records sum to {computed}"),
            });
        }
    }
}

fn sum(mut amounts: impl Iterator<Item = Amount>) -> LedgerResult<Amount> {
    amounts.try_fold(Amount::ZERO, |total, amount| add(total, amount, "audit sum"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{application_key, encode, record_key};
    use crate::requests::{DonationRequest, LoanReceiptRequest, LoanRequest, RechargeRequest};
    use crate::testing::{id, raising_engine};
    use medfund_store::InMemoryLedgerStore;

    fn populated() -> Engine<InMemoryLedgerStore> {
        let engine = raising_engine("A1");
        for (amount, settlement) in [("300", "s1"), ("0.5", "s2")] {
            engine
                .donate(DonationRequest {
                    application_id: id("A1"),
                    donor: "d1".into(),
                    amount: Amount::parse(amount).unwrap(),
                    settlement_ref: settlement.into(),
                    platform_id: "p1".into(),
                })
                .unwrap();
        }
        engine
            .issue_loan(LoanRequest {
                application_id: id("A1"),
                amount: Amount::parse("200").unwrap(),
                loan_number: "L1".into(),
                first_repayment: "2020-09".into(),
                total_periods: 24,
            })
            .unwrap();
        engine
            .confirm_loan_received(LoanReceiptRequest {
                application_id: id("A1"),
                loan_number: "L1".into(),
                loan_seq: 1,
                settlement_ref: "recv1".into(),
            })
            .unwrap();
        engine
            .recharge(RechargeRequest {
                application_id: id("A1"),
                settlement_ref: "r1".into(),
                amount: Amount::parse("50").unwrap(),
            })
            .unwrap();
        engine
    }

    fn overwrite(engine: &Engine<InMemoryLedgerStore>, edit: impl FnOnce(&mut Application)) {
        let mut app = engine.get_info(&id("A1")).unwrap();
        edit(&mut app);
        let key = application_key(&id("A1"));
        engine.store().put(&key, encode(&key, &app).unwrap()).unwrap();
    }

    #[test]
    fn consistent_application_passes() {
        let engine = populated();
        let report = engine.audit(&id("A1")).unwrap();
        assert!(report.is_consistent(), "{:?}", report.violations);
        assert_eq!(report.donations, 2);
        assert_eq!(report.donation_sum.to_string(), "300.5");
        assert_eq!(report.loan_sum.to_string(), "200");
        assert_eq!(report.received_sum.to_string(), "200");
        assert_eq!(report.recharge_sum.to_string(), "50");
    }

    #[test]
    fn audit_does_not_write() {
        let engine = populated();
        let before = engine.store().snapshot();
        engine.audit(&id("A1")).unwrap();
        assert_eq!(engine.store().snapshot(), before);
    }

    #[test]
    fn tampered_total_is_reported() {
        let engine = populated();
        overwrite(&engine, |app| app.amount_raised = Amount::parse("1000").unwrap());
        let report = engine.audit(&id("A1")).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].kind, ViolationKind::TotalMismatch);
        assert_eq!(report.violations[0].ledger, Some(SubLedger::Donation));
    }

    #[test]
    fn counter_past_last_record_is_missing_record() {
        let engine = populated();
        overwrite(&engine, |app| app.recharge_counter = 2);
        let report = engine.audit(&id("A1")).unwrap();
        let missing: Vec<_> = report
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::MissingRecord)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].seq, Some(2));
    }

    #[test]
    fn record_beyond_counter_is_orphan() {
        let engine = populated();
        let key = record_key(&id("A1"), SubLedger::Donation, 3);
        let stray = Donation {
            donor: "x".into(),
            amount: Amount::parse("1").unwrap(),
            settlement_ref: "sx".into(),
            platform_id: "px".into(),
        };
        engine.store().put(&key, encode(&key, &stray).unwrap()).unwrap();
        let report = engine.audit(&id("A1")).unwrap();
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::OrphanRecord && v.seq == Some(3)));
    }

    #[test]
    fn ceiling_breach_is_reported() {
        let engine = populated();
        overwrite(&engine, |app| {
            app.amount_raised = Amount::parse("100").unwrap();
            app.balance = Amount::parse("100").unwrap();
        });
        let report = engine.audit(&id("A1")).unwrap();
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::CeilingBreach));
    }

    #[test]
    fn audit_unknown_is_not_found() {
        let engine = populated();
        assert!(engine.audit(&id("B2")).is_err());
    }
}
