//! Public message wall: short, flat messages unrelated to forums.

mod message;
mod repository;
mod service;

pub use message::{Message, MAX_MESSAGE_LENGTH};
pub use repository::MessageRepository;
pub use service::WallService;
