//! Wall message model.

use crate::db::Author;

/// Maximum message length (in characters).
pub const MAX_MESSAGE_LENGTH: usize = 280;

/// A wall message together with its author.
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique message ID.
    pub id: i64,
    /// Message text.
    pub content: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Who wrote it.
    pub author: Author,
}
