//! filedrop - a minimal file drop server.
//!
//! Accepts multipart uploads over HTTP, writes them into a storage directory
//! under their original names and lists stored files as JSON.

pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{FiledropError, Result};
pub use file::FileStorage;
pub use web::WebServer;
