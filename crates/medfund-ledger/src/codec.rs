//! Key layout and value encoding.
//!
//! | Key                         | Value             |
//! |-----------------------------|-------------------|
//! | `{id}`                      | [`Application`]   |
//! | `{id},{seq}`                | [`Donation`]      |
//! | `{id}#loan,{seq}`           | [`LoanInfo`]      |
//! | `{id}#recharge,{seq}`       | [`RechargeHistory`] |
//!
//! Sequence numbers are decimal and start at 1. Values are JSON; amounts are
//! canonical decimal strings. Application ids cannot contain `,` or `#`, so
//! no two keys in this table can collide.
//!
//! Only donations use the plain `{id},{seq}` composite. Ledgers written with
//! that layout for loans and recharges as well are not key-compatible with
//! this one: their loan and recharge records share the donation namespace and
//! will not be found under the `#loan` and `#recharge` keys. Migrating such a
//! ledger means rewriting those records.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use medfund_store::{LedgerStore, Transaction};
use medfund_types::ApplicationId;

use crate::error::{LedgerError, LedgerResult};
use crate::records::{Application, Donation, LoanInfo, RechargeHistory};

/// The three append-only sub-ledgers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubLedger {
    Donation,
    Loan,
    Recharge,
}

impl SubLedger {
    /// Namespace suffix appended to the application id.
    fn qualifier(&self) -> &'static str {
        match self {
            Self::Donation => "",
            Self::Loan => "#loan",
            Self::Recharge => "#recharge",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donation => "donation",
            Self::Loan => "loan",
            Self::Recharge => "recharge",
        }
    }
}

impl fmt::Display for SubLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type stored in one of the sub-ledgers.
pub trait SubLedgerRecord: Serialize + DeserializeOwned {
    const LEDGER: SubLedger;
}

impl SubLedgerRecord for Donation {
    const LEDGER: SubLedger = SubLedger::Donation;
}

impl SubLedgerRecord for LoanInfo {
    const LEDGER: SubLedger = SubLedger::Loan;
}

impl SubLedgerRecord for RechargeHistory {
    const LEDGER: SubLedger = SubLedger::Recharge;
}

/// Key of the application aggregate.
pub fn application_key(id: &ApplicationId) -> String {
    id.as_str().to_string()
}

/// Composite key `applicationId + "," + seq` of a sub-ledger record.
pub fn record_key(id: &ApplicationId, ledger: SubLedger, seq: u64) -> String {
    format!("{id}{},{seq}", ledger.qualifier())
}

pub fn encode<T: Serialize>(key: &str, value: &T) -> LedgerResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| LedgerError::Codec {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> LedgerResult<T> {
    serde_json::from_slice(bytes).map_err(|e| LedgerError::Codec {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Load an application, failing with `NotFound` if the key is absent.
pub fn load_application<S: LedgerStore + ?Sized>(
    tx: &Transaction<'_, S>,
    id: &ApplicationId,
) -> LedgerResult<Application> {
    let key = application_key(id);
    let bytes = tx
        .get(&key)?
        .ok_or_else(|| LedgerError::NotFound(format!("application {id}")))?;
    let application: Application = decode(&key, &bytes)?;
    if &application.application_id != id {
        return Err(LedgerError::Integrity(format!(
            "key {key} holds application {}",
            application.application_id
        )));
    }
    debug!(application = %id, state = %application.state, "loaded application");
    Ok(application)
}

/// Stage the application aggregate for commit.
pub fn stage_application<S: LedgerStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    application: &Application,
) -> LedgerResult<()> {
    let key = application_key(&application.application_id);
    let bytes = encode(&key, application)?;
    tx.put(key, bytes)?;
    Ok(())
}

/// Load a sub-ledger record, or `None` if it was never written.
pub fn load_record<T: SubLedgerRecord, S: LedgerStore + ?Sized>(
    tx: &Transaction<'_, S>,
    id: &ApplicationId,
    seq: u64,
) -> LedgerResult<Option<T>> {
    let key = record_key(id, T::LEDGER, seq);
    tx.get(&key)?
        .map(|bytes| decode(&key, &bytes))
        .transpose()
}

/// Stage a sub-ledger record for commit.
pub fn stage_record<T: SubLedgerRecord, S: LedgerStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    id: &ApplicationId,
    seq: u64,
    record: &T,
) -> LedgerResult<()> {
    let key = record_key(id, T::LEDGER, seq);
    let bytes = encode(&key, record)?;
    tx.put(key, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use medfund_store::InMemoryLedgerStore;
    use medfund_types::Amount;

    fn id(s: &str) -> ApplicationId {
        ApplicationId::new(s).unwrap()
    }

    #[test]
    fn donation_keys_use_plain_composite() {
        assert_eq!(record_key(&id("A1"), SubLedger::Donation, 1), "A1,1");
        assert_eq!(record_key(&id("A1"), SubLedger::Donation, 12), "A1,12");
    }

    #[test]
    fn sub_ledgers_do_not_share_keys() {
        let a = id("A1");
        let keys = [
            application_key(&a),
            record_key(&a, SubLedger::Donation, 1),
            record_key(&a, SubLedger::Loan, 1),
            record_key(&a, SubLedger::Recharge, 1),
        ];
        for (i, k) in keys.iter().enumerate() {
            for other in &keys[i + 1..] {
                assert_ne!(k, other);
            }
        }
        assert_eq!(keys[2], "A1#loan,1");
        assert_eq!(keys[3], "A1#recharge,1");
    }

    #[test]
    fn missing_application_is_not_found() {
        let store = InMemoryLedgerStore::new();
        let tx = Transaction::begin(&store);
        let err = load_application(&tx, &id("nope")).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn garbage_value_is_codec_error() {
        let store = InMemoryLedgerStore::new();
        store.put("A1", b"not json".to_vec()).unwrap();
        let tx = Transaction::begin(&store);
        let err = load_application(&tx, &id("A1")).unwrap_err();
        assert!(matches!(err, LedgerError::Codec { .. }));
    }

    #[test]
    fn record_round_trip_through_store() {
        let store = InMemoryLedgerStore::new();
        let app = id("A1");
        let recharge = RechargeHistory {
            amount: Amount::parse("12.5").unwrap(),
            settlement_ref: "h-001".into(),
        };
        let mut tx = Transaction::begin(&store);
        stage_record(&mut tx, &app, 1, &recharge).unwrap();
        tx.commit().unwrap();

        let tx = Transaction::begin(&store);
        let back: Option<RechargeHistory> = load_record(&tx, &app, 1).unwrap();
        assert_eq!(back, Some(recharge));
        let absent: Option<RechargeHistory> = load_record(&tx, &app, 2).unwrap();
        assert!(absent.is_none());
    }
}
