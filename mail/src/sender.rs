/// Non-blocking email notifications used by the registration workflow.
///
/// Both calls return immediately and report nothing back. Delivery is best
/// effort.
pub trait Sender: Send + Sync {
    /// Mail the verification `code` to `email`.
    fn send_verification_email_async(&self, email: &str, code: &str);

    /// Mail the welcome message sent after a confirmed registration.
    fn send_welcome_email_async(&self, email: &str);
}
