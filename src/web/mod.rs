//! HTTP front door for filedrop.
//!
//! Routes `/upload` and `/view` to their handlers and serves static assets
//! for every other path.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
