//! Fraud-domain denylist trait.

use crate::StoreError;

/// Domain part of an email address (after the last `@`), lowercased.
pub fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.rsplit_once('@')?;
    let domain = domain.trim().trim_end_matches('.');
    if domain.is_empty() {
        return None;
    }
    Some(domain.to_ascii_lowercase())
}

/// Trait for the denylist of email domains known to be used for abuse.
pub trait FraudStore {
    fn is_fraud_domain(&self, domain: &str) -> Result<bool, StoreError>;

    fn put_fraud_domain(&self, domain: &str) -> Result<(), StoreError>;

    /// Whether the email's domain, or any parent domain, is on the denylist.
    ///
    /// `mx.spam.example` matches a listed `spam.example`.
    fn does_email_have_fraud_domain(&self, email: &str) -> Result<bool, StoreError> {
        let Some(domain) = email_domain(email) else {
            return Ok(false);
        };
        let mut candidate = domain.as_str();
        loop {
            if self.is_fraud_domain(candidate)? {
                return Ok(true);
            }
            match candidate.split_once('.') {
                Some((_, parent)) if parent.contains('.') => candidate = parent,
                _ => return Ok(false),
            }
        }
    }
}
