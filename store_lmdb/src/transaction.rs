//! Transactional view over the environment.

use std::cell::RefCell;

use heed::{RoTxn, RwTxn};

use vulcan_store::{RegistryStore, StoreError, TxFn};

use crate::environment::Databases;
use crate::LmdbError;

/// All stores, read and written through one open LMDB write transaction.
///
/// Created by [`LmdbEnvironment::in_tx`](crate::LmdbEnvironment); nothing is
/// visible to other readers until the transaction commits.
pub struct LmdbTxn<'e> {
    dbs: Databases,
    txn: RefCell<RwTxn<'e>>,
}

impl<'e> LmdbTxn<'e> {
    pub(crate) fn new(dbs: Databases, txn: RwTxn<'e>) -> Self {
        Self {
            dbs,
            txn: RefCell::new(txn),
        }
    }

    pub(crate) fn commit(self) -> Result<(), StoreError> {
        self.txn.into_inner().commit().map_err(LmdbError::from)?;
        Ok(())
    }

    pub(crate) fn read<T>(
        &self,
        f: impl FnOnce(&Databases, &RoTxn<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let txn = self.txn.borrow();
        f(&self.dbs, &txn)
    }

    pub(crate) fn write<T>(
        &self,
        f: impl FnOnce(&Databases, &mut RwTxn<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut txn = self.txn.borrow_mut();
        f(&self.dbs, &mut txn)
    }
}

crate::access::impl_registry_store!(LmdbTxn<'_>);

impl RegistryStore for LmdbTxn<'_> {
    /// Already inside a transaction: run `f` on the same view.
    fn in_tx(&self, f: &mut TxFn<'_>) -> Result<(), StoreError> {
        f(self)
    }
}
