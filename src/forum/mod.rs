//! Forums, threads and posts.
//!
//! Forums are created by admins and addressed by slug. Every thread is
//! created together with its first post, and each reply bumps the thread's
//! `last_post_at` so listings surface active threads first.

mod post_repository;
mod repository;
mod service;
mod slug;
mod thread_repository;
mod types;

pub use post_repository::PostRepository;
pub use repository::ForumRepository;
pub use service::ForumService;
pub use slug::{slugify, MAX_SLUG_LENGTH};
pub use thread_repository::ThreadRepository;
pub use types::{
    Forum, ForumRef, NewForum, Post, Thread, ThreadWithForum, FORUM_TITLE_LENGTH,
    MAX_FORUM_DESCRIPTION_LENGTH, MAX_POST_LENGTH, THREAD_TITLE_LENGTH,
};
