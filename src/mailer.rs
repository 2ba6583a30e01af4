//! Outgoing email.
//!
//! Naranjo does not deliver mail itself. [`LogMailer`] writes the message to
//! the log; [`MemoryMailer`] keeps messages in memory for inspection.

use std::sync::Mutex;

use crate::Result;

/// An email ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

impl OutgoingMail {
    /// Build the verification email for `username`.
    pub fn verification(to: &str, username: &str, link: &str, ttl_hours: i64) -> Self {
        Self {
            to: to.to_string(),
            subject: "Verify your email".to_string(),
            body: format!(
                "Hi {username},\n\nConfirm your email address by opening this link:\n{link}\n\n\
                 The link expires in {ttl_hours} hours."
            ),
        }
    }
}

/// Something that can send email.
pub trait Mailer: Send + Sync {
    /// Send a message.
    fn send(&self, mail: OutgoingMail) -> Result<()>;
}

/// Mailer that only logs what it would have sent.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: OutgoingMail) -> Result<()> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "Email not delivered (log mailer)");
        tracing::info!("{}", mail.body);
        Ok(())
    }
}

/// Mailer that stores every message.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl MemoryMailer {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<OutgoingMail> {
        self.sent().pop()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, mail: OutgoingMail) -> Result<()> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(mail);
        Ok(())
    }
}

/// Extract the `token` query value from a verification link.
pub fn token_from_link(link_or_body: &str) -> Option<String> {
    let start = link_or_body.find("token=")? + "token=".len();
    let token: String = link_or_body[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    (!token.is_empty()).then_some(token)
}
