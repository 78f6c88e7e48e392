//! File management module for filedrop.
//!
//! Uploads are written into a single storage directory under the
//! client-supplied name, and listings enumerate that directory.

mod storage;

pub use storage::{validate_filename, FileStorage, StoredFile};
