//! Wall service.

use super::message::{Message, MAX_MESSAGE_LENGTH};
use super::repository::MessageRepository;
use crate::db::User;
use crate::listing::MESSAGE_LIMIT;
use crate::text::trimmed_within;
use crate::{Database, Result};

/// Service for the public message wall.
pub struct WallService<'a> {
    db: &'a Database,
}

impl<'a> WallService<'a> {
    /// Create a new WallService.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Newest messages first. `limit` defaults to 50 and is capped at 100.
    pub async fn list_messages(&self, limit: Option<i64>) -> Result<Vec<Message>> {
        let limit = MESSAGE_LIMIT.resolve(limit);
        MessageRepository::new(self.db.pool()).list_recent(limit).await
    }

    /// Post a message as `author`.
    pub async fn post_message(&self, author: &User, content: &str) -> Result<Message> {
        let content = trimmed_within("content", content, 1, MAX_MESSAGE_LENGTH)?;
        let message = MessageRepository::new(self.db.pool())
            .create(author.id, content)
            .await?;
        tracing::debug!(message_id = message.id, user_id = author.id, "Message posted");
        Ok(message)
    }
}
