//! Rendered messages and the templates that produce them.

use serde::{Deserialize, Serialize};

/// A fully rendered email.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Subjects and bodies of the two messages the service sends.
///
/// Bodies may reference `{code}` and `{email}`; each occurrence is replaced
/// when a message is rendered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailTemplates {
    pub from: String,
    pub verification_subject: String,
    pub verification_body: String,
    pub welcome_subject: String,
    pub welcome_body: String,
}

impl Default for MailTemplates {
    fn default() -> Self {
        Self {
            from: "Decentr <noreply@decentr.net>".to_string(),
            verification_subject: "Confirm your Decentr registration".to_string(),
            verification_body: "Your verification code is {code}.".to_string(),
            welcome_subject: "Welcome to Decentr".to_string(),
            welcome_body: "Your wallet is ready. Welcome aboard, {email}!".to_string(),
        }
    }
}

impl MailTemplates {
    pub fn verification(&self, email: &str, code: &str) -> MailMessage {
        MailMessage {
            from: self.from.clone(),
            to: email.to_string(),
            subject: self.verification_subject.clone(),
            text: render(&self.verification_body, email, code),
        }
    }

    pub fn welcome(&self, email: &str) -> MailMessage {
        MailMessage {
            from: self.from.clone(),
            to: email.to_string(),
            subject: self.welcome_subject.clone(),
            text: render(&self.welcome_body, email, ""),
        }
    }
}

fn render(template: &str, email: &str, code: &str) -> String {
    template.replace("{code}", code).replace("{email}", email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_carries_code() {
        let msg = MailTemplates::default().verification("a@x.com", "c0ffee");
        assert_eq!(msg.to, "a@x.com");
        assert!(msg.text.contains("c0ffee"));
        assert!(!msg.text.contains("{code}"));
    }

    #[test]
    fn custom_template_substitutes_every_placeholder() {
        let templates = MailTemplates {
            verification_body: "{email}: {code} / {code}".into(),
            ..Default::default()
        };
        let msg = templates.verification("a@x.com", "42");
        assert_eq!(msg.text, "a@x.com: 42 / 42");
    }

    #[test]
    fn welcome_addresses_recipient() {
        let msg = MailTemplates::default().welcome("b@y.org");
        assert_eq!(msg.subject, "Welcome to Decentr");
        assert!(msg.text.contains("b@y.org"));
    }
}
