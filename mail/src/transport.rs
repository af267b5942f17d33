//! Delivery of rendered messages.

use std::time::Duration;

use async_trait::async_trait;

use crate::{MailError, MailMessage};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can deliver a rendered message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Posts messages as JSON to an HTTP mail API.
///
/// `POST {endpoint}` with `Authorization: Bearer {api_key}` and a
/// [`MailMessage`] body. Any 2xx status counts as accepted.
pub struct HttpMailTransport {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpMailTransport {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn deliver(&self, message: &MailMessage) -> Result<(), MailError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected(format!("HTTP status {status}: {body}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/send")
    }

    fn message() -> MailMessage {
        MailMessage {
            from: "noreply@decentr.net".into(),
            to: "a@x.com".into(),
            subject: "hi".into(),
            text: "code 1234".into(),
        }
    }

    #[tokio::test]
    async fn delivers_with_bearer_token() {
        let app = Router::new().route(
            "/send",
            post(|headers: HeaderMap, Json(msg): Json<MailMessage>| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer secret");
                if authorized && msg.to == "a@x.com" {
                    StatusCode::OK
                } else {
                    StatusCode::UNAUTHORIZED
                }
            }),
        );
        let url = serve(app).await;
        HttpMailTransport::new(url, "secret")
            .deliver(&message())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_rejection() {
        let app = Router::new().route(
            "/send",
            post(|| async { (StatusCode::BAD_REQUEST, "unknown recipient") }),
        );
        let url = serve(app).await;
        let err = HttpMailTransport::new(url, "k")
            .deliver(&message())
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::Rejected(body) if body.contains("unknown recipient")));
    }
}
