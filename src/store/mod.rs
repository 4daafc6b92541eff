//! Document store capability.
//!
//! Documents are JSON objects addressed by slash-separated paths such as
//! `/users/alice`: collection and document ids alternate, so a document path
//! always has an even number of segments. `set` replaces whatever is stored
//! at the path.

pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use self::firestore::Firestore;
pub use self::memory::MemoryStore;

pub type Document = Map<String, Value>;

pub const CODE_INVALID_ARGUMENT: &str = "invalid-argument";

#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct StoreError {
    pub code: String,
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Split a document path into its collection and document ids.
///
/// # Errors
/// `invalid-argument` if a segment is empty, `.` or `..`, or if the path
/// names a collection instead of a document.
pub fn document_segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let segments: Vec<&str> = path.strip_prefix('/').unwrap_or(path).split('/').collect();

    if let Some(segment) = segments
        .iter()
        .find(|segment| matches!(**segment, "" | "." | ".."))
    {
        return Err(StoreError::new(
            CODE_INVALID_ARGUMENT,
            format!("invalid path segment {segment:?} in {path}"),
        ));
    }

    if segments.len() % 2 != 0 {
        return Err(StoreError::new(
            CODE_INVALID_ARGUMENT,
            format!("{path} is not a document path"),
        ));
    }

    Ok(segments)
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document at `path`, `None` if nothing is stored there.
    ///
    /// # Errors
    /// Returns a [`StoreError`] if the store cannot be reached or refuses the read.
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError>;

    /// Write `value` at `path`, replacing any existing document.
    ///
    /// # Errors
    /// Returns a [`StoreError`] if the store cannot be reached or refuses the write.
    async fn set(&self, path: &str, value: Document) -> Result<(), StoreError>;
}
