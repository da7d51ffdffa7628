use medfund_gate::Workflow;
use medfund_store::{LedgerStore, StoreError, Transaction};
use medfund_types::{Amount, ApplicationId};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::locks::KeyedLocks;
use crate::requests::require_positive;

/// The workflow engine.
///
/// Every mutating operation follows the same shape: lock the application,
/// load its aggregate, validate, stage the new aggregate plus at most one
/// sub-ledger record, and commit both in one write set. A failure at any
/// step returns before the commit, leaving the store untouched.
///
/// Operations are grouped by concern in sibling modules: `registry`
/// (intake, reviews, fraud), `fundraising`, `lending`, `recharge`, and
/// `audit`.
///
/// The invariants hold under serializable execution per application. The
/// engine provides that itself with a per-application mutex, which is enough
/// within one process; several processes sharing a store need the host
/// ledger to serialize them.
pub struct Engine<S: LedgerStore> {
    store: S,
    workflow: Workflow,
    config: EngineConfig,
    locks: KeyedLocks,
}

impl<S: LedgerStore> Engine<S> {
    /// Create an engine over `store` with the given configuration.
    pub fn new(store: S, config: EngineConfig) -> LedgerResult<Self> {
        config.validate()?;
        let workflow = Workflow::new(config.workflow.clone())
            .map_err(|e| LedgerError::Validation(e.to_string()))?;
        Ok(Self {
            store,
            workflow,
            config,
            locks: KeyedLocks::default(),
        })
    }

    /// Create an engine with the default single-stage configuration.
    pub fn with_defaults(store: S) -> Self {
        Self {
            store,
            workflow: Workflow::default(),
            config: EngineConfig::default(),
            locks: KeyedLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Run `op` inside a transaction holding the application's lock and
    /// commit whatever it staged.
    pub(crate) fn execute<T>(
        &self,
        id: &ApplicationId,
        op: impl FnOnce(&mut Transaction<'_, S>) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let handle = self.locks.handle(id)?;
        let _guard = handle.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut tx = Transaction::begin(&self.store);
        let value = op(&mut tx)?;
        let written = tx.commit()?;
        debug!(application = %id, written, "committed");
        Ok(value)
    }

    /// Run a read-only `op` against a consistent view of the application.
    pub(crate) fn read<T>(
        &self,
        id: &ApplicationId,
        op: impl FnOnce(&Transaction<'_, S>) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let handle = self.locks.handle(id)?;
        let _guard = handle.lock().map_err(|_| StoreError::LockPoisoned)?;
        let tx = Transaction::begin(&self.store);
        op(&tx)
    }

    /// Check an amount argument against the configured precision.
    pub(crate) fn check_precision(&self, field: &str, amount: Amount) -> LedgerResult<()> {
        let scale = amount.as_decimal().scale();
        if scale > self.config.max_fraction_digits {
            return Err(LedgerError::Validation(format!(
                "{field} {amount} has more than {} fractional digits",
                self.config.max_fraction_digits
            )));
        }
        Ok(())
    }

    /// Check that an amount is positive and within the configured precision.
    pub(crate) fn check_positive(&self, field: &str, amount: Amount) -> LedgerResult<()> {
        require_positive(field, amount)?;
        self.check_precision(field, amount)
    }
}

/// Add to a running total, rejecting overflow as a validation failure.
pub(crate) fn add(total: Amount, amount: Amount, field: &str) -> LedgerResult<Amount> {
    total
        .checked_add(amount)
        .ok_or_else(|| LedgerError::Validation(format!("{field} would overflow")))
}

impl<S: LedgerStore> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("stages", &self.workflow.stages())
            .field("max_fraction_digits", &self.config.max_fraction_digits)
            .finish()
    }
}
