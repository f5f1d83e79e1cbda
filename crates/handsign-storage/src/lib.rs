//! Local image storage.
//!
//! This crate provides:
//! - Directory setup for uploads and processed images
//! - Filename sanitization
//! - Writes of raw uploads and annotated copies
//!
//! Files are keyed by the client filename, so a second upload with the same
//! name replaces the first.

pub mod error;
pub mod local;

pub use error::{StorageError, StorageResult};
pub use local::{sanitize_filename, LocalStorage, StoredFile, PROCESSED_PREFIX};
