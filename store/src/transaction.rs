//! Transactional scoping across all registry stores.

use crate::{FraudStore, ReferralStore, RequestStore, StoreError};

/// Body of a transaction. Returning `Err` rolls every write back.
pub type TxFn<'a> = dyn FnMut(&dyn RegistryStore) -> Result<(), StoreError> + 'a;

/// Everything the registration workflow needs from storage.
pub trait RegistryStore: RequestStore + ReferralStore + FraudStore {
    /// Run `f` against a transactional view of the store.
    ///
    /// Writes made through the view become visible to other readers only
    /// when `f` returns `Ok`; concurrent transactions on the same data are
    /// serialized by the backend.
    fn in_tx(&self, f: &mut TxFn<'_>) -> Result<(), StoreError>;
}

/// Run `f` in a transaction and hand its value (or its own error type) back.
///
/// An `Err` from `f` aborts the transaction and is returned unchanged; a
/// failure of the transaction itself is converted into `E`.
pub fn with_tx<T, E, F>(store: &dyn RegistryStore, mut f: F) -> Result<T, E>
where
    E: From<StoreError>,
    F: FnMut(&dyn RegistryStore) -> Result<T, E>,
{
    let mut outcome: Option<Result<T, E>> = None;
    let committed = store.in_tx(&mut |tx: &dyn RegistryStore| match f(tx) {
        Ok(value) => {
            outcome = Some(Ok(value));
            Ok(())
        }
        Err(e) => {
            outcome = Some(Err(e));
            Err(StoreError::Aborted)
        }
    });
    match (committed, outcome) {
        (_, Some(Err(e))) => Err(e),
        (Err(e), _) => Err(e.into()),
        (Ok(()), Some(Ok(value))) => Ok(value),
        (Ok(()), None) => Err(StoreError::Backend("transaction body did not run".into()).into()),
    }
}
