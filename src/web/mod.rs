//! JSON Web API for Naranjo.
//!
//! All endpoints live under `/api`. Authentication is a signed session
//! cookie; see [`middleware::session`] for the extractors that enforce it.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
pub use state::AppState;
