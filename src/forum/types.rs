//! Forum, thread and post models.

use crate::db::Author;

/// Forum title bounds (characters, after trimming).
pub const FORUM_TITLE_LENGTH: (usize, usize) = (3, 40);
/// Maximum forum description length.
pub const MAX_FORUM_DESCRIPTION_LENGTH: usize = 140;
/// Thread title bounds.
pub const THREAD_TITLE_LENGTH: (usize, usize) = (3, 80);
/// Maximum post length.
pub const MAX_POST_LENGTH: usize = 2000;

/// A top-level forum.
#[derive(Debug, Clone)]
pub struct Forum {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub created_by: i64,
    pub created_at: String,
}

impl Forum {
    /// Short reference used when embedding the forum in thread views.
    pub fn to_ref(&self) -> ForumRef {
        ForumRef {
            id: self.id,
            slug: self.slug.clone(),
            title: self.title.clone(),
        }
    }
}

/// Minimal forum projection: id, slug and title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumRef {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

/// Data for a new forum.
#[derive(Debug, Clone)]
pub struct NewForum {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub created_by: i64,
}

/// A thread joined with its author.
#[derive(Debug, Clone)]
pub struct Thread {
    pub id: i64,
    pub forum_id: i64,
    pub title: String,
    pub created_at: String,
    /// Timestamp of the newest post; never earlier than `created_at`.
    pub last_post_at: Option<String>,
    pub author: Author,
}

/// A thread together with the forum it belongs to.
#[derive(Debug, Clone)]
pub struct ThreadWithForum {
    pub thread: Thread,
    pub forum: ForumRef,
}

/// A post joined with its author.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub thread_id: i64,
    pub content: String,
    pub created_at: String,
    pub author: Author,
}
