//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use tracing::{debug, info};

use vulcan_store::{RegistryStore, StoreError, TxFn};

use crate::transaction::LmdbTxn;
use crate::LmdbError;

/// On-disk layout version written into the `meta` database.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
const MAX_DBS: u32 = 8;

/// Default map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Handles of every database in the environment.
#[derive(Clone, Copy)]
pub(crate) struct Databases {
    /// owner → bincode(Request)
    pub requests: Database<Bytes, Bytes>,
    /// address → owner, written when a request is confirmed
    pub addresses: Database<Bytes, Bytes>,
    /// own referral code → owner
    pub referral_codes: Database<Bytes, Bytes>,
    /// receiver → bincode(ReferralTracking)
    pub referrals: Database<Bytes, Bytes>,
    /// sender ++ receiver → ()
    pub referrals_by_sender: Database<Bytes, Bytes>,
    /// lowercased domain → ()
    pub fraud_domains: Database<Bytes, Bytes>,
    pub meta: Database<Bytes, Bytes>,
}

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Env,
    dbs: Databases,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment in the directory `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process and its files are
        // not modified by other programs while it is open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let dbs = Databases {
            requests: env.create_database(&mut wtxn, Some("requests"))?,
            addresses: env.create_database(&mut wtxn, Some("addresses"))?,
            referral_codes: env.create_database(&mut wtxn, Some("referral_codes"))?,
            referrals: env.create_database(&mut wtxn, Some("referrals"))?,
            referrals_by_sender: env.create_database(&mut wtxn, Some("referrals_by_sender"))?,
            fraud_domains: env.create_database(&mut wtxn, Some("fraud_domains"))?,
            meta: env.create_database(&mut wtxn, Some("meta"))?,
        };
        check_schema_version(&dbs, &mut wtxn)?;
        wtxn.commit()?;

        info!(path = %path.display(), "opened LMDB environment");
        Ok(Self { env, dbs })
    }

    pub(crate) fn read<T>(
        &self,
        f: impl FnOnce(&Databases, &RoTxn<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        f(&self.dbs, &rtxn)
    }

    pub(crate) fn write<T>(
        &self,
        f: impl FnOnce(&Databases, &mut RwTxn<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let value = f(&self.dbs, &mut wtxn)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(value)
    }
}

fn check_schema_version(dbs: &Databases, wtxn: &mut RwTxn<'_>) -> Result<(), LmdbError> {
    match dbs.meta.get(wtxn, SCHEMA_VERSION_KEY)? {
        Some(bytes) => {
            let found = <[u8; 4]>::try_from(bytes)
                .map(u32::from_le_bytes)
                .map_err(|_| {
                    LmdbError::Serialization("schema_version has unexpected length".into())
                })?;
            if found != SCHEMA_VERSION {
                return Err(LmdbError::SchemaMismatch {
                    found,
                    expected: SCHEMA_VERSION,
                });
            }
        }
        None => {
            debug!(version = SCHEMA_VERSION, "initializing schema version");
            dbs.meta
                .put(wtxn, SCHEMA_VERSION_KEY, &SCHEMA_VERSION.to_le_bytes())?;
        }
    }
    Ok(())
}

crate::access::impl_registry_store!(LmdbEnvironment);

impl RegistryStore for LmdbEnvironment {
    fn in_tx(&self, f: &mut TxFn<'_>) -> Result<(), StoreError> {
        let wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let tx = LmdbTxn::new(self.dbs, wtxn);
        // Dropping `tx` on error aborts the LMDB transaction.
        f(&tx)?;
        tx.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vulcan_store::{with_tx, FraudStore, ReferralStore, Request, RequestStore};
    use vulcan_types::{Owner, ReferralStatus, Timestamp, TokenAmount, WalletAddress};

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).expect("failed to open env");
        (dir, env)
    }

    fn owner(c: char) -> Owner {
        Owner::from_hex_unchecked(std::iter::repeat(c).take(32).collect())
    }

    fn request(c: char, code: &str) -> Request {
        Request {
            owner: owner(c),
            email: format!("{c}@example.com"),
            address: WalletAddress::new("decentr1vg085ra5hw8mx5rrheqf8fruks0xv4urqkuqga"),
            code: "0".repeat(32),
            created_at: Timestamp::new(100),
            confirmed_at: None,
            own_referral_code: code.to_string(),
            referral_code: None,
        }
    }

    #[test]
    fn request_upsert_and_lookup() {
        let (_dir, env) = temp_env();
        let req = request('a', "aaaa0001");
        env.set_request(&req).unwrap();

        assert_eq!(env.get_request(&owner('a')).unwrap(), req);
        assert_eq!(env.get_request_by_own_referral_code("aaaa0001").unwrap(), req);
        assert!(env.get_request(&owner('b')).unwrap_err().is_not_found());
        assert!(env
            .get_confirmed_request_by_address(&req.address)
            .unwrap_err()
            .is_not_found());

        let mut updated = req.clone();
        updated.own_referral_code = "aaaa0002".into();
        env.set_request(&updated).unwrap();
        assert!(env.get_request_by_own_referral_code("aaaa0001").is_err());
        assert_eq!(env.get_request_by_own_referral_code("aaaa0002").unwrap(), updated);
    }

    #[test]
    fn testnet_request_is_created_confirmed_and_never_twice() {
        let (_dir, env) = temp_env();
        let mut grant = request('a', "aaaa0001");
        assert!(matches!(
            env.create_testnet_confirmed_request(&grant).unwrap_err(),
            StoreError::Conflict(_)
        ));

        grant.confirmed_at = Some(Timestamp::new(100));
        env.create_testnet_confirmed_request(&grant).unwrap();
        assert_eq!(env.get_confirmed_request_by_address(&grant.address).unwrap(), grant);
        assert_eq!(env.confirmed_registrations_total().unwrap(), 1);

        let err = env.create_testnet_confirmed_request(&grant).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let mut same_address = request('b', "bbbb0001");
        same_address.confirmed_at = Some(Timestamp::new(200));
        let err = env.create_testnet_confirmed_request(&same_address).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert!(env.get_request(&owner('b')).unwrap_err().is_not_found());
    }

    #[test]
    fn own_referral_code_is_unique() {
        let (_dir, env) = temp_env();
        env.set_request(&request('a', "cafe0001")).unwrap();
        let err = env.set_request(&request('b', "cafe0001")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[test]
    fn confirmation_binds_address_once() {
        let (_dir, env) = temp_env();
        let req = request('a', "aaaa0001");
        env.set_request(&req).unwrap();

        env.set_confirmed(&owner('a'), Timestamp::new(200)).unwrap();
        let bound = env.get_confirmed_request_by_address(&req.address).unwrap();
        assert_eq!(bound.owner, owner('a'));
        assert_eq!(bound.confirmed_at, Some(Timestamp::new(200)));

        let err = env.set_confirmed(&owner('a'), Timestamp::new(300)).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(env.set_confirmed(&owner('b'), Timestamp::new(300)).unwrap_err().is_not_found());

        assert_eq!(env.confirmed_registrations_total().unwrap(), 1);
    }

    #[test]
    fn referral_lifecycle_and_index() {
        let (_dir, env) = temp_env();
        env.create_referral_tracking(&owner('a'), &owner('b'), Timestamp::new(10))
            .unwrap();
        env.create_referral_tracking(&owner('a'), &owner('c'), Timestamp::new(11))
            .unwrap();
        env.create_referral_tracking(&owner('d'), &owner('e'), Timestamp::new(12))
            .unwrap();
        assert!(matches!(
            env.create_referral_tracking(&owner('d'), &owner('b'), Timestamp::new(13)),
            Err(StoreError::Duplicate(_))
        ));

        assert!(matches!(
            env.transition_referral_tracking_to_confirmed(
                &owner('b'),
                TokenAmount::new(1),
                TokenAmount::new(1),
                Timestamp::new(20)
            ),
            Err(StoreError::Conflict(_))
        ));
        env.transition_referral_tracking_to_installed(&owner('b'), Timestamp::new(20))
            .unwrap();
        env.transition_referral_tracking_to_installed(&owner('c'), Timestamp::new(40))
            .unwrap();

        let stale = env.installed_referrals_before(Timestamp::new(30)).unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].receiver, owner('b'));

        env.transition_referral_tracking_to_confirmed(
            &owner('b'),
            TokenAmount::new(7),
            TokenAmount::new(3),
            Timestamp::new(50),
        )
        .unwrap();

        let tracked = env.get_referral_tracking_by_receiver(&owner('b')).unwrap();
        assert_eq!(tracked.status, ReferralStatus::Confirmed);

        let sent = env.referrals_by_sender(&owner('a')).unwrap();
        assert_eq!(sent.len(), 2);
        let stats = env.referral_stats(&owner('a')).unwrap();
        assert_eq!((stats.registered, stats.installed, stats.confirmed), (0, 1, 1));
        assert_eq!(stats.reward, TokenAmount::new(7));
        assert_eq!(env.confirmed_referral_count(&owner('d')).unwrap(), 0);
    }

    #[test]
    fn fraud_domains_are_case_insensitive() {
        let (_dir, env) = temp_env();
        env.put_fraud_domain("Spam.Example").unwrap();
        assert!(env.is_fraud_domain("spam.example").unwrap());
        assert!(env.does_email_have_fraud_domain("x@mail.SPAM.example").unwrap());
        assert!(!env.does_email_have_fraud_domain("x@example.com").unwrap());
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let (_dir, env) = temp_env();
        let result = with_tx(&env, |tx| -> Result<(), StoreError> {
            tx.set_request(&request('a', "aaaa0001"))?;
            tx.create_referral_tracking(&owner('f'), &owner('a'), Timestamp::new(1))?;
            Err(StoreError::Conflict("stop".into()))
        });
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert!(env.get_request(&owner('a')).unwrap_err().is_not_found());
        assert!(env
            .get_referral_tracking_by_receiver(&owner('a'))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn committed_transaction_sees_its_own_writes() {
        let (_dir, env) = temp_env();
        let found = with_tx(&env, |tx| -> Result<bool, StoreError> {
            tx.set_request(&request('a', "aaaa0001"))?;
            Ok(tx.get_request_by_own_referral_code("aaaa0001").is_ok())
        })
        .unwrap();
        assert!(found);
        assert!(env.get_request(&owner('a')).is_ok());
    }

    #[test]
    fn reopen_keeps_data_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
            env.put_fraud_domain("spam.example").unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        assert!(env.is_fraud_domain("spam.example").unwrap());
    }
}
