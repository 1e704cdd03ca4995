//! Storage module for persisting harvested records
//!
//! This module handles writing record batches to disk, including:
//! - One `character_<L>` directory per letter, created on first use
//! - Append-only CSV files (`urban_data_<L>.csv`) with no header row
//! - Flushing each batch to disk before the append call returns

mod csv_store;
mod traits;

pub use csv_store::CsvStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::site::Letter;

/// One harvested dictionary entry
///
/// Columns are written in field order: letter, source listing URL, detail URL,
/// word, definition, example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub letter: Letter,
    pub source_listing_url: String,
    pub detail_url: String,
    pub word: String,
    pub definition: String,
    pub example: String,
}

impl Record {
    /// The record as a CSV row
    pub fn to_row(&self) -> [String; 6] {
        [
            self.letter.to_string(),
            self.source_listing_url.clone(),
            self.detail_url.clone(),
            self.word.clone(),
            self.definition.clone(),
            self.example.clone(),
        ]
    }
}
