use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Ledger, StorageError, StorageResult};

/// Ledger kept in process memory
pub struct MemoryLedger<R> {
    rows: Mutex<Vec<R>>,
}

impl<R> Default for MemoryLedger<R> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }
}

impl<R> Ledger<R> for MemoryLedger<R>
where
    R: Serialize + DeserializeOwned + Clone + Send,
{
    fn append(&self, rows: &[R]) -> StorageResult<()> {
        let mut guard = self.rows.lock().map_err(|_| StorageError::Poisoned)?;
        guard.extend_from_slice(rows);
        Ok(())
    }

    fn read_all(&self) -> StorageResult<Vec<R>> {
        let guard = self.rows.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }
}
