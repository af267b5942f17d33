use heed::{RoTxn, RwTxn};

use vulcan_store::StoreError;

use crate::environment::Databases;
use crate::LmdbError;

fn domain_key(domain: &str) -> Vec<u8> {
    domain.trim().trim_end_matches('.').to_ascii_lowercase().into_bytes()
}

pub(crate) fn contains(dbs: &Databases, txn: &RoTxn<'_>, domain: &str) -> Result<bool, StoreError> {
    Ok(dbs
        .fraud_domains
        .get(txn, &domain_key(domain))
        .map_err(LmdbError::from)?
        .is_some())
}

pub(crate) fn put(dbs: &Databases, txn: &mut RwTxn<'_>, domain: &str) -> Result<(), StoreError> {
    dbs.fraud_domains
        .put(txn, &domain_key(domain), &[])
        .map_err(LmdbError::from)?;
    Ok(())
}
