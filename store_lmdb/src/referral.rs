//! Referral tracking rows and the per-sender index.

use heed::{RoTxn, RwTxn};
use tracing::trace;

use vulcan_store::{ReferralTracking, StoreError};
use vulcan_types::{Owner, ReferralStatus, Timestamp};

use crate::access::{decode, encode};
use crate::environment::Databases;
use crate::LmdbError;

fn sender_key(sender: &Owner, receiver: &Owner) -> Vec<u8> {
    let mut key = Vec::with_capacity(Owner::HEX_LEN * 2);
    key.extend_from_slice(sender.as_str().as_bytes());
    key.extend_from_slice(receiver.as_str().as_bytes());
    key
}

pub(crate) fn get(
    dbs: &Databases,
    txn: &RoTxn<'_>,
    receiver: &Owner,
) -> Result<ReferralTracking, StoreError> {
    let bytes = dbs
        .referrals
        .get(txn, receiver.as_str().as_bytes())
        .map_err(LmdbError::from)?
        .ok_or_else(|| StoreError::NotFound(format!("referral of {receiver}")))?;
    Ok(decode(bytes)?)
}

pub(crate) fn create(
    dbs: &Databases,
    txn: &mut RwTxn<'_>,
    sender: &Owner,
    receiver: &Owner,
    at: Timestamp,
) -> Result<(), StoreError> {
    let receiver_key = receiver.as_str().as_bytes();
    if dbs
        .referrals
        .get(txn, receiver_key)
        .map_err(LmdbError::from)?
        .is_some()
    {
        return Err(StoreError::Duplicate(format!("referral of {receiver}")));
    }

    let tracking = ReferralTracking::new(sender.clone(), receiver.clone(), at);
    dbs.referrals
        .put(txn, receiver_key, &encode(&tracking)?)
        .map_err(LmdbError::from)?;
    dbs.referrals_by_sender
        .put(txn, &sender_key(sender, receiver), &[])
        .map_err(LmdbError::from)?;

    trace!(%sender, %receiver, "created referral tracking");
    Ok(())
}

/// Load the receiver's row, apply `change`, and write it back.
///
/// Nothing is written when `change` fails.
pub(crate) fn update(
    dbs: &Databases,
    txn: &mut RwTxn<'_>,
    receiver: &Owner,
    change: impl FnOnce(&mut ReferralTracking) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    let mut tracking = get(dbs, txn, receiver)?;
    change(&mut tracking)?;
    dbs.referrals
        .put(txn, receiver.as_str().as_bytes(), &encode(&tracking)?)
        .map_err(LmdbError::from)?;
    trace!(%receiver, status = %tracking.status, "referral status changed");
    Ok(())
}

pub(crate) fn by_sender(
    dbs: &Databases,
    txn: &RoTxn<'_>,
    sender: &Owner,
) -> Result<Vec<ReferralTracking>, StoreError> {
    let mut receivers = Vec::new();
    let iter = dbs
        .referrals_by_sender
        .prefix_iter(txn, sender.as_str().as_bytes())
        .map_err(LmdbError::from)?;
    for entry in iter {
        let (key, _) = entry.map_err(LmdbError::from)?;
        let receiver = std::str::from_utf8(&key[Owner::HEX_LEN..])
            .map_err(|e| LmdbError::Serialization(format!("referral index key: {e}")))?;
        receivers.push(Owner::from_hex_unchecked(receiver.to_string()));
    }
    receivers.iter().map(|r| get(dbs, txn, r)).collect()
}

pub(crate) fn installed_before(
    dbs: &Databases,
    txn: &RoTxn<'_>,
    cutoff: Timestamp,
) -> Result<Vec<ReferralTracking>, StoreError> {
    let mut stale = Vec::new();
    for entry in dbs.referrals.iter(txn).map_err(LmdbError::from)? {
        let (_, bytes) = entry.map_err(LmdbError::from)?;
        let tracking: ReferralTracking = decode(bytes)?;
        if tracking.status == ReferralStatus::Installed
            && tracking.installed_at.is_some_and(|at| at < cutoff)
        {
            stale.push(tracking);
        }
    }
    Ok(stale)
}
