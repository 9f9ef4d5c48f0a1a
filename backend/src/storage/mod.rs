//! Append-only ledgers for measurements, decisions, settings and plant heights
//!
//! Rows are only ever appended; nothing is updated or deleted. The decision
//! log doubles as the source of each plot's carried deficit.

mod csv_ledger;
mod memory;

use std::path::Path;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{DecisionRow, MeasurementRow, PlantHeightRow, SettingRow};

pub use csv_ledger::CsvLedger;
pub use memory::MemoryLedger;

/// Storage errors surfaced unchanged to the caller
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Ledger lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// An append-only table with a fixed column order
pub trait Ledger<R>: Send + Sync
where
    R: Serialize + DeserializeOwned,
{
    fn append(&self, rows: &[R]) -> StorageResult<()>;

    fn read_all(&self) -> StorageResult<Vec<R>>;
}

/// The four ledgers the service writes to
pub struct Ledgers {
    pub measurements: Box<dyn Ledger<MeasurementRow>>,
    pub decisions: Box<dyn Ledger<DecisionRow>>,
    pub settings: Box<dyn Ledger<SettingRow>>,
    pub plant_heights: Box<dyn Ledger<PlantHeightRow>>,
    /// Held across a daily run's read of carried deficits and its appends
    pub(crate) run_lock: Mutex<()>,
}

impl Ledgers {
    /// CSV ledgers under `data_dir`, one file per table
    pub fn csv(data_dir: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            measurements: Box::new(CsvLedger::open(data_dir.join("daily_inputs.csv"))?),
            decisions: Box::new(CsvLedger::open(data_dir.join("decisions.csv"))?),
            settings: Box::new(CsvLedger::open(data_dir.join("metadata.csv"))?),
            plant_heights: Box::new(CsvLedger::open(data_dir.join("plant_heights.csv"))?),
            run_lock: Mutex::new(()),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            measurements: Box::new(MemoryLedger::default()),
            decisions: Box::new(MemoryLedger::default()),
            settings: Box::new(MemoryLedger::default()),
            plant_heights: Box::new(MemoryLedger::default()),
            run_lock: Mutex::new(()),
        }
    }
}
