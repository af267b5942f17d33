//! Queue-backed [`Sender`].
//!
//! Rendering and queueing happen on the caller's task; delivery happens on a
//! worker task spawned by [`MailDispatcher::spawn`]. When the queue is full
//! the message is dropped and a warning logged, so a slow mail API never
//! backs up registration.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{MailMessage, MailTemplates, MailTransport, Sender};

/// Default number of messages that may wait for delivery.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct MailDispatcher {
    templates: Arc<MailTemplates>,
    outbound_tx: mpsc::Sender<MailMessage>,
}

impl MailDispatcher {
    /// Start the delivery worker and return a dispatcher feeding it.
    ///
    /// The worker exits once every clone of the dispatcher has been dropped
    /// and the queue is drained; await the returned handle to flush pending
    /// mail on shutdown.
    pub fn spawn(
        transport: Arc<dyn MailTransport>,
        templates: MailTemplates,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<MailMessage>(capacity.max(1));
        let worker = tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                match transport.deliver(&message).await {
                    Ok(()) => debug!(to = %message.to, subject = %message.subject, "mail delivered"),
                    Err(e) => warn!(to = %message.to, error = %e, "mail delivery failed"),
                }
            }
            debug!("mail worker stopped");
        });
        let dispatcher = Self {
            templates: Arc::new(templates),
            outbound_tx,
        };
        (dispatcher, worker)
    }

    fn enqueue(&self, message: MailMessage) {
        if let Err(e) = self.outbound_tx.try_send(message) {
            let (reason, message) = match e {
                mpsc::error::TrySendError::Full(m) => ("queue full", m),
                mpsc::error::TrySendError::Closed(m) => ("worker stopped", m),
            };
            warn!(to = %message.to, reason, "mail dropped");
        }
    }
}

impl Sender for MailDispatcher {
    fn send_verification_email_async(&self, email: &str, code: &str) {
        self.enqueue(self.templates.verification(email, code));
    }

    fn send_welcome_email_async(&self, email: &str) {
        self.enqueue(self.templates.welcome(email));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MailError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        delivered: Mutex<Vec<MailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl MailTransport for Recording {
        async fn deliver(&self, message: &MailMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Rejected("nope".into()));
            }
            self.delivered.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn queued_mail_is_delivered_in_order() {
        let transport = Arc::new(Recording::default());
        let (dispatcher, worker) =
            MailDispatcher::spawn(transport.clone(), MailTemplates::default(), 16);

        dispatcher.send_verification_email_async("a@x.com", "abcd");
        dispatcher.send_welcome_email_async("a@x.com");
        drop(dispatcher);
        worker.await.unwrap();

        let delivered = transport.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        assert!(delivered[0].text.contains("abcd"));
        assert_eq!(delivered[1].subject, MailTemplates::default().welcome_subject);
    }

    #[tokio::test]
    async fn delivery_failure_does_not_stop_worker() {
        let transport = Arc::new(Recording {
            fail: true,
            ..Default::default()
        });
        let (dispatcher, worker) =
            MailDispatcher::spawn(transport.clone(), MailTemplates::default(), 4);
        dispatcher.send_welcome_email_async("a@x.com");
        dispatcher.send_welcome_email_async("b@x.com");
        drop(dispatcher);
        worker.await.unwrap();
        assert!(transport.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn full_queue_drops_without_blocking() {
        let transport = Arc::new(Recording::default());
        let (dispatcher, worker) =
            MailDispatcher::spawn(transport.clone(), MailTemplates::default(), 1);

        // The worker cannot run until this task yields, so only the first
        // message fits in the queue.
        dispatcher.send_welcome_email_async("a@x.com");
        dispatcher.send_welcome_email_async("b@x.com");
        dispatcher.send_welcome_email_async("c@x.com");
        drop(dispatcher);
        worker.await.unwrap();

        let delivered = transport.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].to, "a@x.com");
    }
}
