//! Media Module
//!
//! Image and audio uploads. Files land in a filesystem object store and are
//! served back under `/media` with public URLs that messages reference.

/// Filesystem object store
pub mod storage;

/// Upload handler
pub mod handlers;

pub use storage::{MediaStore, StoredObject};
