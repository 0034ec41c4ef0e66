//! Persistence of extracted records.
//!
//! The extraction pipeline never touches storage. Callers open a store
//! explicitly and hand it whatever the pipeline returned.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;
use crate::models::care::{CareRecord, StoredRecord};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A sink for care records that assigns each one an identifier.
pub trait RecordStore {
    /// Persist `records` in order and return their identifiers.
    fn append(&mut self, records: &[CareRecord]) -> Result<Vec<u64>>;

    /// All stored records, in insertion order.
    fn load(&self) -> Result<Vec<StoredRecord>>;
}

/// Append-only store with one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    next_id: u64,
}

impl JsonLinesStore {
    /// Open the store at `path`, creating it on first append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let next_id = read_rows(&path)?
            .iter()
            .map(|row| row.id)
            .max()
            .map_or(1, |id| id + 1);

        debug!("Opened record store {} (next id {})", path.display(), next_id);
        Ok(Self { path, next_id })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonLinesStore {
    fn append(&mut self, records: &[CareRecord]) -> Result<Vec<u64>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut ids = Vec::with_capacity(records.len());

        for record in records {
            let row = StoredRecord {
                id: self.next_id,
                record: record.clone(),
            };
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            ids.push(row.id);
            self.next_id += 1;
        }
        writer.flush()?;

        debug!("Stored {} records in {}", ids.len(), self.path.display());
        Ok(ids)
    }

    fn load(&self) -> Result<Vec<StoredRecord>> {
        read_rows(&self.path)
    }
}

fn read_rows(path: &Path) -> Result<Vec<StoredRecord>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut rows = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|e| StoreError::Corrupt {
            line: i + 1,
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}
