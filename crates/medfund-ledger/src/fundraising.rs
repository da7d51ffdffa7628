//! Fundraising ledger: donations and the raised-amount projection.

use tracing::info;

use medfund_store::LedgerStore;
use medfund_types::{Amount, ApplicationId, ApplicationState};

use crate::codec::{load_application, load_record, stage_application, stage_record};
use crate::engine::{add, Engine};
use crate::error::{LedgerError, LedgerResult};
use crate::records::Donation;
use crate::requests::{require_text, DonationRequest};

impl<S: LedgerStore> Engine<S> {
    /// Append a donation and return its sequence number.
    ///
    /// Requires `Raising`. The amount must be strictly greater than zero.
    pub fn donate(&self, request: DonationRequest) -> LedgerResult<u64> {
        self.check_positive("donation amount", request.amount)?;
        require_text("settlement reference", &request.settlement_ref)?;

        let id = request.application_id.clone();
        self.execute(&id, |tx| {
            let mut application = load_application(tx, &id)?;
            if application.state != ApplicationState::Raising {
                return Err(LedgerError::conflict(
                    &id,
                    application.state,
                    "not accepting donations",
                ));
            }

            let seq = application.donation_counter + 1;
            let donation = Donation {
                donor: request.donor,
                amount: request.amount,
                settlement_ref: request.settlement_ref,
                platform_id: request.platform_id,
            };
            application.amount_raised = add(application.amount_raised, donation.amount, "amount raised")?;
            application.balance = add(application.balance, donation.amount, "balance")?;
            application.donation_counter = seq;

            stage_record(tx, &id, seq, &donation)?;
            stage_application(tx, &application)?;
            info!(
                application = %id,
                seq,
                amount = %donation.amount,
                raised = %application.amount_raised,
                "donation recorded"
            );
            Ok(seq)
        })
    }

    /// Total raised so far. Its `Display` form is the canonical decimal text.
    pub fn get_raised(&self, id: &ApplicationId) -> LedgerResult<Amount> {
        self.read(id, |tx| Ok(load_application(tx, id)?.amount_raised))
    }

    /// Donation record `seq` of the application.
    pub fn get_donation(&self, id: &ApplicationId, seq: u64) -> LedgerResult<Donation> {
        self.read(id, |tx| {
            load_application(tx, id)?;
            load_record(tx, id, seq)?
                .ok_or_else(|| LedgerError::NotFound(format!("donation {seq} of {id}")))
        })
    }
}
