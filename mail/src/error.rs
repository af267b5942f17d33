use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP request to mail API failed: {0}")]
    RequestFailed(String),

    #[error("mail API unreachable: {0}")]
    Unreachable(String),

    #[error("mail API rejected message: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for MailError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MailError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            MailError::Unreachable(format!("connection failed: {e}"))
        } else {
            MailError::RequestFailed(e.to_string())
        }
    }
}
