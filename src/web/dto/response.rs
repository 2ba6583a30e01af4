//! Response DTOs for Web API.
//!
//! Successful responses carry `"ok": true` next to their payload.

use serde::Serialize;

use crate::db::{Author, User};
use crate::forum::{Forum, ForumRef, Post, Thread, ThreadWithForum};
use crate::wall::Message;

// ============================================================================
// Projections
// ============================================================================

/// The caller's own account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub role: String,
    pub email_verified: bool,
}

impl From<&User> for AccountInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            role: user.role.to_string(),
            email_verified: user.email_verified,
        }
    }
}

/// Public view of another user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInfo {
    pub id: i64,
    pub username: String,
    pub avatar_url: String,
}

impl From<&Author> for AuthorInfo {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id,
            username: author.username.clone(),
            avatar_url: author.avatar_url.clone(),
        }
    }
}

/// Wall message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageInfo {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub user: AuthorInfo,
}

impl From<&Message> for MessageInfo {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            content: message.content.clone(),
            created_at: message.created_at.clone(),
            user: AuthorInfo::from(&message.author),
        }
    }
}

/// Forum.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumInfo {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

impl From<&Forum> for ForumInfo {
    fn from(forum: &Forum) -> Self {
        Self {
            id: forum.id,
            slug: forum.slug.clone(),
            title: forum.title.clone(),
            description: forum.description.clone(),
            created_at: forum.created_at.clone(),
        }
    }
}

/// Forum reference embedded in thread views.
#[derive(Debug, Serialize)]
pub struct ForumRefInfo {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

impl From<&ForumRef> for ForumRefInfo {
    fn from(forum: &ForumRef) -> Self {
        Self {
            id: forum.id,
            slug: forum.slug.clone(),
            title: forum.title.clone(),
        }
    }
}

/// Thread.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadInfo {
    pub id: i64,
    pub title: String,
    pub created_at: String,
    pub last_post_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum: Option<ForumRefInfo>,
    pub author: AuthorInfo,
}

impl From<&Thread> for ThreadInfo {
    fn from(thread: &Thread) -> Self {
        Self {
            id: thread.id,
            title: thread.title.clone(),
            created_at: thread.created_at.clone(),
            last_post_at: thread.last_post_at.clone(),
            forum: None,
            author: AuthorInfo::from(&thread.author),
        }
    }
}

impl From<&ThreadWithForum> for ThreadInfo {
    fn from(view: &ThreadWithForum) -> Self {
        Self {
            forum: Some(ForumRefInfo::from(&view.forum)),
            ..ThreadInfo::from(&view.thread)
        }
    }
}

/// Post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInfo {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub author: AuthorInfo,
}

impl From<&Post> for PostInfo {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            content: post.content.clone(),
            created_at: post.created_at.clone(),
            author: AuthorInfo::from(&post.author),
        }
    }
}

// ============================================================================
// Envelopes
// ============================================================================

/// Bare acknowledgement.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Acknowledgement with a human-readable note.
#[derive(Debug, Serialize)]
pub struct NoticeResponse {
    pub ok: bool,
    pub message: String,
}

impl NoticeResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }
}

/// Account payload, optionally with a note (registration).
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub ok: bool,
    pub user: AccountInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AccountResponse {
    pub fn new(user: &User) -> Self {
        Self {
            ok: true,
            user: AccountInfo::from(user),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// `GET /api/me`: `{ok:false}` for anonymous callers.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountInfo>,
}

impl MeResponse {
    pub fn anonymous() -> Self {
        Self { ok: false, user: None }
    }

    pub fn user(user: &User) -> Self {
        Self {
            ok: true,
            user: Some(AccountInfo::from(user)),
        }
    }
}

/// Liveness probe.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub status: &'static str,
    pub time: String,
}

/// Wall listing.
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub ok: bool,
    pub messages: Vec<MessageInfo>,
}

/// Newly posted wall message.
#[derive(Debug, Serialize)]
pub struct MessageCreatedResponse {
    pub ok: bool,
    pub message: MessageInfo,
}

/// Forum listing.
#[derive(Debug, Serialize)]
pub struct ForumsResponse {
    pub ok: bool,
    pub forums: Vec<ForumInfo>,
}

/// Newly created forum.
#[derive(Debug, Serialize)]
pub struct ForumCreatedResponse {
    pub ok: bool,
    pub forum: ForumInfo,
}

/// Threads of a forum.
#[derive(Debug, Serialize)]
pub struct ThreadsResponse {
    pub ok: bool,
    pub forum: ForumRefInfo,
    pub threads: Vec<ThreadInfo>,
}

/// Newly created thread and its first post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadCreatedResponse {
    pub ok: bool,
    pub thread: ThreadInfo,
    pub first_post: PostInfo,
}

/// Single thread.
#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub ok: bool,
    pub thread: ThreadInfo,
}

/// Posts of a thread.
#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub ok: bool,
    pub posts: Vec<PostInfo>,
}

/// Newly created post.
#[derive(Debug, Serialize)]
pub struct PostCreatedResponse {
    pub ok: bool,
    pub post: PostInfo,
}
