use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{error, info};

use crate::error::DataUnavailable;
use crate::ingest;
use crate::observability::metrics;
use crate::pipeline::{normalize_with_report, LocationTable, NormalizationReport};
use crate::types::{AlumniRecord, RawRow};

/// The immutable clean record set plus where it came from
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<AlumniRecord>,
    report: NormalizationReport,
    source: String,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    pub fn from_rows(rows: &[RawRow], locations: &LocationTable, source: impl Into<String>) -> Self {
        let (records, report) = normalize_with_report(rows, locations);
        Self {
            records,
            report,
            source: source.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn load(path: impl AsRef<Path>, locations: &LocationTable) -> Result<Self, DataUnavailable> {
        let path = path.as_ref();
        let rows = ingest::load_rows(path)?;
        Ok(Self::from_rows(&rows, locations, path.display().to_string()))
    }

    pub fn records(&self) -> &[AlumniRecord] {
        &self.records
    }

    pub fn report(&self) -> &NormalizationReport {
        &self.report
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

type LoadOutcome = Result<Arc<Dataset>, DataUnavailable>;

/// Lazily loads the dataset on first access and keeps the outcome, success
/// or failure, until [`DatasetCache::reload`] is called.
pub struct DatasetCache {
    path: PathBuf,
    locations: LocationTable,
    slot: RwLock<Option<LoadOutcome>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, locations: LocationTable) -> Self {
        Self {
            path: path.into(),
            locations,
            slot: RwLock::new(None),
        }
    }

    /// A cache that already holds `dataset`, for callers that built it
    /// themselves.
    pub fn preloaded(dataset: Dataset) -> Self {
        Self {
            path: PathBuf::from(dataset.source()),
            locations: LocationTable::default(),
            slot: RwLock::new(Some(Ok(Arc::new(dataset)))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> LoadOutcome {
        if let Ok(slot) = self.slot.read() {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
        }

        match self.slot.write() {
            Ok(mut slot) => {
                // another caller may have loaded while we waited for the lock
                if let Some(outcome) = slot.as_ref() {
                    return outcome.clone();
                }
                let outcome = self.build();
                *slot = Some(outcome.clone());
                outcome
            }
            Err(poisoned) => Err(self.unavailable(format!("dataset cache poisoned: {}", poisoned))),
        }
    }

    /// Rebuild from the source file and replace the cached outcome.
    pub fn reload(&self) -> LoadOutcome {
        let outcome = self.build();
        match self.slot.write() {
            Ok(mut slot) => {
                *slot = Some(outcome.clone());
                outcome
            }
            Err(poisoned) => Err(self.unavailable(format!("dataset cache poisoned: {}", poisoned))),
        }
    }

    fn build(&self) -> LoadOutcome {
        match Dataset::load(&self.path, &self.locations) {
            Ok(dataset) => {
                info!(
                    records = dataset.len(),
                    source = %dataset.source(),
                    "Dataset ready"
                );
                metrics::dataset::load_succeeded();
                Ok(Arc::new(dataset))
            }
            Err(e) => {
                error!("Dataset load failed: {}", e);
                metrics::dataset::load_failed();
                Err(e)
            }
        }
    }

    fn unavailable(&self, reason: String) -> DataUnavailable {
        DataUnavailable {
            path: self.path.display().to_string(),
            reason,
        }
    }
}

static GLOBAL: OnceCell<Arc<DatasetCache>> = OnceCell::new();

/// Install the process-wide cache. Later calls keep the first cache.
pub fn init_global(cache: DatasetCache) -> Arc<DatasetCache> {
    GLOBAL.get_or_init(|| Arc::new(cache)).clone()
}

pub fn global() -> Option<Arc<DatasetCache>> {
    GLOBAL.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", body).unwrap();
        file
    }

    #[test]
    fn test_cache_loads_once_until_reload() {
        let file = write_csv("First Name,Preferred Email\nAnn,ann@example.com\n");
        let cache = DatasetCache::new(file.path(), LocationTable::default());

        let first = cache.get().unwrap();
        assert_eq!(first.len(), 1);

        std::fs::write(
            file.path(),
            "First Name,Preferred Email\nAnn,ann@example.com\nBob,bob@example.com\n",
        )
        .unwrap();
        let cached = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        let reloaded = cache.reload().unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(cache.get().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_load_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        let cache = DatasetCache::new(&path, LocationTable::default());

        assert!(cache.get().is_err());
        std::fs::write(&path, "First Name\nAnn\n").unwrap();
        // no implicit retry
        assert!(cache.get().is_err());
        assert_eq!(cache.reload().unwrap().len(), 1);
    }

    #[test]
    fn test_preloaded_cache() {
        let rows = vec![RawRow::from_pairs([("First Name", "Ann")])];
        let dataset = Dataset::from_rows(&rows, LocationTable::builtin(), "inline");
        let cache = DatasetCache::preloaded(dataset);
        let dataset = cache.get().unwrap();
        assert_eq!(dataset.source(), "inline");
        assert_eq!(dataset.report().output_records, 1);
    }
}
