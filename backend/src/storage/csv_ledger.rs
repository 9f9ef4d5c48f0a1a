use std::fs::{self, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Ledger, StorageError, StorageResult};

/// Ledger backed by a CSV file
///
/// The header row is derived from the row type's field names and written
/// with the first batch appended to an empty file.
pub struct CsvLedger<R> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _row: PhantomData<fn() -> R>,
}

impl<R> CsvLedger<R> {
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            _row: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(fs::metadata(&self.path)?.len() == 0)
    }
}

impl<R> Ledger<R> for CsvLedger<R>
where
    R: Serialize + DeserializeOwned,
{
    fn append(&self, rows: &[R]) -> StorageResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        let write_headers = self.is_empty()?;
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_headers)
            .from_writer(file);

        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        tracing::debug!(path = %self.path.display(), rows = rows.len(), "Appended ledger rows");
        Ok(())
    }

    fn read_all(&self) -> StorageResult<Vec<R>> {
        if self.is_empty()? {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader.deserialize().collect::<Result<Vec<R>, _>>()?;
        Ok(rows)
    }
}
