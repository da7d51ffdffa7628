use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use medfund_store::StoreError;
use medfund_types::ApplicationId;

/// One mutex per application id.
///
/// Operations on the same application are serialized so that counter
/// assignment and the credit-ceiling check always see the latest committed
/// aggregate. Different applications never contend.
///
/// The map only holds weak references. A lock lives while some operation
/// holds its handle; dead entries are pruned when a new lock is created, so
/// reads of unknown ids leave nothing behind.
#[derive(Default)]
pub(crate) struct KeyedLocks {
    locks: Mutex<HashMap<ApplicationId, Weak<Mutex<()>>>>,
}

impl KeyedLocks {
    /// The lock guarding `id`, shared with every other live handle for it.
    pub(crate) fn handle(&self, id: &ApplicationId) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut map = self.locks.lock().map_err(|_| StoreError::LockPoisoned)?;
        if let Some(live) = map.get(id).and_then(Weak::upgrade) {
            return Ok(live);
        }
        map.retain(|_, entry| entry.strong_count() > 0);
        let handle = Arc::new(Mutex::new(()));
        map.insert(id.clone(), Arc::downgrade(&handle));
        Ok(handle)
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.locks.lock().expect("lock poisoned").len()
    }
}
