//! Append-only CSV record store

use crate::site::Letter;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::Record;
use std::fs::OpenOptions;
use std::path::PathBuf;

/// Writes each letter's records to `<root>/character_<L>/urban_data_<L>.csv`
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding a letter's data file
    pub fn letter_dir(&self, letter: Letter) -> PathBuf {
        self.root.join(format!("character_{}", letter))
    }

    /// Path of a letter's CSV file
    pub fn data_file(&self, letter: Letter) -> PathBuf {
        self.letter_dir(letter).join(format!("urban_data_{}.csv", letter))
    }
}

impl RecordStore for CsvStore {
    fn append(&mut self, letter: Letter, batch: &[Record]) -> StorageResult<usize> {
        if let Some(stray) = batch.iter().find(|r| r.letter != letter) {
            return Err(StorageError::LetterMismatch {
                expected: letter,
                found: stray.letter,
            });
        }

        let dir = self.letter_dir(letter);
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let path = self.data_file(letter);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StorageError::Open {
                path: path.clone(),
                source,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        for record in batch {
            writer.write_record(record.to_row())?;
        }

        let file = writer
            .into_inner()
            .map_err(|e| StorageError::Io(e.into_error()))?;
        file.sync_all()?;

        tracing::debug!("Appended {} rows to {}", batch.len(), path.display());
        Ok(batch.len())
    }
}
