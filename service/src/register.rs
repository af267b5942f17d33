//! Register: create or refresh the unconfirmed request for an email.

use tracing::{info, warn};

use vulcan_crypto::{new_code, new_referral_code, owner_from_email, validate_address};
use vulcan_store::{with_tx, RegistryStore, Request, StoreError};
use vulcan_types::{Owner, Timestamp, WalletAddress};

use crate::{RegistrationService, ServiceError};

/// Fresh own referral codes tried before giving up on a collision streak.
const REFERRAL_CODE_ATTEMPTS: usize = 8;

impl RegistrationService {
    /// Start (or restart) registration of `email` for `address`.
    ///
    /// `email` must already be normalized. On success the verification code
    /// is queued for mailing and the owner derived from the email returned.
    ///
    /// A resend outside the throttle window mails the same code again. A
    /// referral code on a resend is attached if the request has none yet;
    /// a code different from the one already attached is `AlreadyExists`.
    pub async fn register(
        &self,
        email: &str,
        address: &WalletAddress,
        referral_code: Option<&str>,
    ) -> Result<Owner, ServiceError> {
        validate_address(address.as_str(), &self.config.address_prefix)
            .map_err(|e| ServiceError::InvalidAddress(e.to_string()))?;

        if self.store.does_email_have_fraud_domain(email)? {
            warn!(%address, "registration from fraud domain rejected");
            return Err(ServiceError::FraudDomain);
        }

        let owner = owner_from_email(email);
        let now = self.clock.now();
        let throttle_secs = self.config.throttle_secs;

        let request = with_tx(self.store.as_ref(), |tx| {
            register_in_tx(tx, &owner, email, address, referral_code, now, throttle_secs)
        })?;

        self.mailer
            .send_verification_email_async(&request.email, &request.code);
        info!(%owner, %address, referred = request.referral_code.is_some(), "verification code sent");
        Ok(owner)
    }

    /// Attach an inviter's referral code to an existing, unconfirmed request.
    pub async fn track_referral(
        &self,
        receiver: &Owner,
        referral_code: &str,
    ) -> Result<(), ServiceError> {
        let now = self.clock.now();
        with_tx(self.store.as_ref(), |tx| -> Result<(), ServiceError> {
            let mut request = match tx.get_request(receiver) {
                Ok(request) => request,
                Err(e) if e.is_not_found() => return Err(ServiceError::NotFound),
                Err(e) => return Err(e.into()),
            };
            if request.is_confirmed() || request.referral_code.is_some() {
                return Err(ServiceError::AlreadyExists);
            }
            attach_referral(tx, receiver, referral_code, now)?;
            request.referral_code = Some(referral_code.to_string());
            tx.set_request(&request)?;
            Ok(())
        })?;
        info!(%receiver, "referral tracked");
        Ok(())
    }
}

fn register_in_tx(
    tx: &dyn RegistryStore,
    owner: &Owner,
    email: &str,
    address: &WalletAddress,
    referral_code: Option<&str>,
    now: Timestamp,
    throttle_secs: u64,
) -> Result<Request, ServiceError> {
    match tx.get_request(owner) {
        Ok(existing) if existing.is_confirmed() => Err(ServiceError::AlreadyExists),
        Ok(existing) if existing.created_at.elapsed_since(now) < throttle_secs => {
            Err(ServiceError::TooManyAttempts)
        }
        Ok(mut existing) => {
            // Resend: the code already in the user's inbox stays valid and the
            // throttle window restarts.
            match (existing.referral_code.as_deref(), referral_code) {
                (_, None) => {}
                (Some(stored), Some(given)) if stored == given => {}
                (Some(_), Some(_)) => return Err(ServiceError::AlreadyExists),
                (None, Some(given)) => {
                    attach_referral(tx, owner, given, now)?;
                    existing.referral_code = Some(given.to_string());
                }
            }
            existing.created_at = now;
            tx.set_request(&existing)?;
            Ok(existing)
        }
        Err(e) if e.is_not_found() => {
            match tx.get_confirmed_request_by_address(address) {
                Ok(bound) if &bound.owner != owner => return Err(ServiceError::AlreadyExists),
                Ok(_) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }

            let request = Request {
                owner: owner.clone(),
                email: email.to_string(),
                address: address.clone(),
                code: new_code()?,
                created_at: now,
                confirmed_at: None,
                own_referral_code: unused_referral_code(tx)?,
                referral_code: referral_code.map(str::to_string),
            };
            tx.set_request(&request)?;
            if let Some(code) = referral_code {
                attach_referral(tx, owner, code, now)?;
            }
            Ok(request)
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve `referral_code` to its sender and start tracking `receiver`.
fn attach_referral(
    tx: &dyn RegistryStore,
    receiver: &Owner,
    referral_code: &str,
    now: Timestamp,
) -> Result<(), ServiceError> {
    let sender = match tx.get_request_by_own_referral_code(referral_code) {
        Ok(sender) => sender,
        Err(e) if e.is_not_found() => return Err(ServiceError::InvalidReferralCode),
        Err(e) => return Err(e.into()),
    };
    if &sender.owner == receiver {
        return Err(ServiceError::InvalidReferralCode);
    }
    match tx.create_referral_tracking(&sender.owner, receiver, now) {
        Ok(()) => Ok(()),
        Err(StoreError::Duplicate(_)) => Err(ServiceError::AlreadyExists),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn unused_referral_code(tx: &dyn RegistryStore) -> Result<String, ServiceError> {
    for _ in 0..REFERRAL_CODE_ATTEMPTS {
        let code = new_referral_code()?;
        match tx.get_request_by_own_referral_code(&code) {
            Err(e) if e.is_not_found() => return Ok(code),
            Err(e) => return Err(e.into()),
            Ok(_) => continue,
        }
    }
    Err(StoreError::Duplicate("no free referral code".into()).into())
}
