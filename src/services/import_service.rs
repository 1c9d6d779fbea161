use crate::models::Record;
use crate::services::record_store::{RecordStore, StoreError};
use crate::services::sheet_reader::{self, SheetError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Read(#[from] SheetError),

    /// `row` is the 1-based position among data rows, header excluded
    #[error("insert failed on record {row}: {source}")]
    Store {
        row: usize,
        #[source]
        source: StoreError,
    },

    #[error("spreadsheet decoding task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct ImportService {
    store: Arc<dyn RecordStore>,
}

impl ImportService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Reads the first sheet of the workbook at `path` and inserts one row per
    /// record. Stops at the first failing insert; earlier rows stay inserted.
    /// Returns the number of inserted rows.
    pub async fn import(&self, path: &Path) -> Result<usize, ImportError> {
        let owned: PathBuf = path.to_path_buf();
        let sheet = tokio::task::spawn_blocking(move || sheet_reader::read_first_sheet(&owned))
            .await?
            .inspect_err(|e| error!("❌ Failed to read {}: {}", path.display(), e))?;

        info!(
            "📄 Parsed sheet '{}' of {}: {} record(s)",
            sheet.sheet_name,
            path.display(),
            sheet.records.len()
        );

        let inserted = self.insert_records(&sheet.records).await?;

        info!("✅ Imported {} record(s) from {}", inserted, path.display());
        Ok(inserted)
    }

    /// Inserts records one at a time, awaiting each before issuing the next.
    pub async fn insert_records(&self, records: &[Record]) -> Result<usize, ImportError> {
        for (index, record) in records.iter().enumerate() {
            if let Err(source) = self.store.insert(record).await {
                error!(
                    "❌ Insert of record {}/{} failed, aborting import: {}",
                    index + 1,
                    records.len(),
                    source
                );
                return Err(ImportError::Store {
                    row: index + 1,
                    source,
                });
            }
        }
        Ok(records.len())
    }
}
