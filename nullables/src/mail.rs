//! Nullable mailer: records instead of sending.

use std::sync::Mutex;

use vulcan_mail::Sender;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SentMail {
    Verification { email: String, code: String },
    Welcome { email: String },
}

#[derive(Default)]
pub struct NullMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl NullMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything "sent" so far, oldest first.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Codes of all verification emails, oldest first.
    pub fn verification_codes(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                SentMail::Verification { code, .. } => Some(code),
                SentMail::Welcome { .. } => None,
            })
            .collect()
    }

    pub fn welcome_count(&self) -> usize {
        self.sent()
            .iter()
            .filter(|m| matches!(m, SentMail::Welcome { .. }))
            .count()
    }
}

impl Sender for NullMailer {
    fn send_verification_email_async(&self, email: &str, code: &str) {
        self.sent.lock().unwrap().push(SentMail::Verification {
            email: email.to_string(),
            code: code.to_string(),
        });
    }

    fn send_welcome_email_async(&self, email: &str) {
        self.sent.lock().unwrap().push(SentMail::Welcome {
            email: email.to_string(),
        });
    }
}
