//! Request records and their address / referral-code indexes.

use heed::{RoTxn, RwTxn};
use tracing::trace;

use vulcan_store::{Request, StoreError};
use vulcan_types::{Owner, Timestamp, WalletAddress};

use crate::access::{decode, encode};
use crate::environment::Databases;
use crate::LmdbError;

fn owner_from_key(bytes: &[u8]) -> Result<Owner, StoreError> {
    let hex = std::str::from_utf8(bytes)
        .map_err(|e| LmdbError::Serialization(format!("owner key: {e}")))?;
    Ok(Owner::from_hex_unchecked(hex.to_string()))
}

pub(crate) fn get(dbs: &Databases, txn: &RoTxn<'_>, owner: &Owner) -> Result<Request, StoreError> {
    let bytes = dbs
        .requests
        .get(txn, owner.as_str().as_bytes())
        .map_err(LmdbError::from)?
        .ok_or_else(|| StoreError::NotFound(format!("request of {owner}")))?;
    Ok(decode(bytes)?)
}

pub(crate) fn put(
    dbs: &Databases,
    txn: &mut RwTxn<'_>,
    request: &Request,
) -> Result<(), StoreError> {
    let owner_key = request.owner.as_str().as_bytes();
    let code_key = request.own_referral_code.as_bytes();

    if let Some(holder) = dbs.referral_codes.get(txn, code_key).map_err(LmdbError::from)? {
        if holder != owner_key {
            return Err(StoreError::Duplicate(format!(
                "referral code {}",
                request.own_referral_code
            )));
        }
    }

    let previous = match get(dbs, txn, &request.owner) {
        Ok(previous) => Some(previous),
        Err(StoreError::NotFound(_)) => None,
        Err(e) => return Err(e),
    };
    if let Some(previous) = previous {
        if previous.own_referral_code != request.own_referral_code {
            dbs.referral_codes
                .delete(txn, previous.own_referral_code.as_bytes())
                .map_err(LmdbError::from)?;
        }
    }

    dbs.referral_codes
        .put(txn, code_key, owner_key)
        .map_err(LmdbError::from)?;
    if request.is_confirmed() {
        dbs.addresses
            .put(txn, request.address.as_str().as_bytes(), owner_key)
            .map_err(LmdbError::from)?;
    }
    dbs.requests
        .put(txn, owner_key, &encode(request)?)
        .map_err(LmdbError::from)?;

    trace!(owner = %request.owner, "stored request");
    Ok(())
}

pub(crate) fn set_confirmed(
    dbs: &Databases,
    txn: &mut RwTxn<'_>,
    owner: &Owner,
    at: Timestamp,
) -> Result<(), StoreError> {
    let mut request = get(dbs, txn, owner)?;
    if request.is_confirmed() {
        return Err(StoreError::Conflict(format!("request of {owner} already confirmed")));
    }
    request.confirmed_at = Some(at);
    put(dbs, txn, &request)
}

pub(crate) fn create_confirmed(
    dbs: &Databases,
    txn: &mut RwTxn<'_>,
    request: &Request,
) -> Result<(), StoreError> {
    if !request.is_confirmed() {
        return Err(StoreError::Conflict(format!(
            "request of {} is not confirmed",
            request.owner
        )));
    }
    if dbs
        .requests
        .get(txn, request.owner.as_str().as_bytes())
        .map_err(LmdbError::from)?
        .is_some()
    {
        return Err(StoreError::Duplicate(format!("request of {}", request.owner)));
    }
    if dbs
        .addresses
        .get(txn, request.address.as_str().as_bytes())
        .map_err(LmdbError::from)?
        .is_some()
    {
        return Err(StoreError::Duplicate(format!("address {}", request.address)));
    }
    put(dbs, txn, request)
}

pub(crate) fn get_confirmed_by_address(
    dbs: &Databases,
    txn: &RoTxn<'_>,
    address: &WalletAddress,
) -> Result<Request, StoreError> {
    let owner_bytes = dbs
        .addresses
        .get(txn, address.as_str().as_bytes())
        .map_err(LmdbError::from)?
        .ok_or_else(|| StoreError::NotFound(format!("address {address}")))?;
    get(dbs, txn, &owner_from_key(owner_bytes)?)
}

pub(crate) fn get_by_own_referral_code(
    dbs: &Databases,
    txn: &RoTxn<'_>,
    code: &str,
) -> Result<Request, StoreError> {
    let owner_bytes = dbs
        .referral_codes
        .get(txn, code.as_bytes())
        .map_err(LmdbError::from)?
        .ok_or_else(|| StoreError::NotFound(format!("referral code {code}")))?;
    get(dbs, txn, &owner_from_key(owner_bytes)?)
}

pub(crate) fn iter_confirmed(dbs: &Databases, txn: &RoTxn<'_>) -> Result<Vec<Request>, StoreError> {
    let mut confirmed = Vec::new();
    for entry in dbs.requests.iter(txn).map_err(LmdbError::from)? {
        let (_owner, bytes) = entry.map_err(LmdbError::from)?;
        let request: Request = decode(bytes)?;
        if request.is_confirmed() {
            confirmed.push(request);
        }
    }
    Ok(confirmed)
}
