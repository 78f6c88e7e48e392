//! Request handlers for the upload and listing endpoints.

pub mod upload;
pub mod view;

pub use upload::*;
pub use view::*;

use crate::file::FileStorage;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Storage directory uploads go to.
    pub storage: FileStorage,
    /// Reject filenames that could escape the storage directory.
    pub reject_unsafe_filenames: bool,
}

impl AppState {
    /// Create a new application state that stores client filenames verbatim.
    pub fn new(storage: FileStorage) -> Self {
        Self {
            storage,
            reject_unsafe_filenames: false,
        }
    }

    /// Enable or disable rejection of unsafe client filenames.
    pub fn with_unsafe_filename_rejection(mut self, reject: bool) -> Self {
        self.reject_unsafe_filenames = reject;
        self
    }
}
