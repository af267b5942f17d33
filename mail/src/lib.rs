//! Mail collaborator for the Vulcan registration service.
//!
//! The workflow hands emails to a [`Sender`] and moves on; it never learns
//! whether delivery worked. [`MailDispatcher`] renders the message, puts it
//! on a bounded queue and returns. A worker task drains the queue into a
//! [`MailTransport`], logging failures.

pub mod dispatcher;
pub mod error;
pub mod message;
pub mod sender;
pub mod transport;

pub use dispatcher::{MailDispatcher, DEFAULT_QUEUE_CAPACITY};
pub use error::MailError;
pub use message::{MailMessage, MailTemplates};
pub use sender::Sender;
pub use transport::{HttpMailTransport, MailTransport};
