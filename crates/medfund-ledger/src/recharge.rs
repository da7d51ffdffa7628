//! Recharge ledger: top-ups of the beneficiary's hospital account.

use tracing::{info, warn};

use medfund_store::LedgerStore;
use medfund_types::{ApplicationId, ApplicationState};

use crate::codec::{load_application, load_record, stage_application, stage_record};
use crate::engine::{add, Engine};
use crate::error::{LedgerError, LedgerResult};
use crate::records::RechargeHistory;
use crate::requests::{require_text, RechargeRequest};

impl<S: LedgerStore> Engine<S> {
    /// Record a recharge and return its sequence number.
    ///
    /// Allowed in every state except `Fraud`. Recharges do not draw down
    /// `balance`; they are tracked in `recharge_total` only.
    pub fn recharge(&self, request: RechargeRequest) -> LedgerResult<u64> {
        self.check_positive("recharge amount", request.amount)?;
        require_text("settlement reference", &request.settlement_ref)?;

        let id = request.application_id.clone();
        self.execute(&id, |tx| {
            let mut application = load_application(tx, &id)?;
            if application.state == ApplicationState::Fraud {
                warn!(application = %id, "recharge attempted after fraud flag");
                return Err(LedgerError::conflict(
                    &id,
                    application.state,
                    "fraud, recharge withheld",
                ));
            }

            let seq = application.recharge_counter + 1;
            let record = RechargeHistory {
                amount: request.amount,
                settlement_ref: request.settlement_ref,
            };
            application.recharge_total =
                add(application.recharge_total, record.amount, "recharge total")?;
            application.recharge_counter = seq;

            stage_record(tx, &id, seq, &record)?;
            stage_application(tx, &application)?;
            info!(
                application = %id,
                seq,
                amount = %record.amount,
                total = %application.recharge_total,
                "recharge recorded"
            );
            Ok(seq)
        })
    }

    /// Recharge record `seq` of the application.
    pub fn get_recharge(&self, id: &ApplicationId, seq: u64) -> LedgerResult<RechargeHistory> {
        self.read(id, |tx| {
            load_application(tx, id)?;
            load_record(tx, id, seq)?
                .ok_or_else(|| LedgerError::NotFound(format!("recharge {seq} of {id}")))
        })
    }
}
