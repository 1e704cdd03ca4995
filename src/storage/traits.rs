//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and
//! associated error types.

use crate::site::Letter;
use crate::storage::Record;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot open {path} for append: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record for letter {found} handed to store for letter {expected}")]
    LetterMismatch { expected: Letter, found: Letter },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record store implementations
///
/// Each call is independent: a batch is durable once `append` returns, and
/// nothing ever rewrites rows from an earlier call.
pub trait RecordStore {
    /// Appends a batch of records to the letter's store, creating it if absent
    ///
    /// # Returns
    ///
    /// The number of rows written
    fn append(&mut self, letter: Letter, batch: &[Record]) -> StorageResult<usize>;
}
