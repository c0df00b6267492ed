use std::sync::{Arc, OnceLock};

use super::DataUnavailable;
use super::model::VideoTable;

/// Memo for the one expensive step: loading the dataset.
///
/// The first successful load is kept for the lifetime of the value. Failures
/// are not stored, so the next call runs the loader again.
pub struct DatasetCache {
    table: OnceLock<Arc<VideoTable>>,
}

impl DatasetCache {
    pub const fn new() -> Self {
        DatasetCache {
            table: OnceLock::new(),
        }
    }

    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<VideoTable>, DataUnavailable>
    where
        F: FnOnce() -> Result<VideoTable, DataUnavailable>,
    {
        if let Some(table) = self.table.get() {
            log::debug!("Dataset cache hit ({} videos)", table.len());
            return Ok(Arc::clone(table));
        }
        let loaded = Arc::new(load()?);
        Ok(Arc::clone(self.table.get_or_init(|| loaded)))
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }
}

/// The process-wide dataset cache.
pub fn shared() -> &'static DatasetCache {
    static CACHE: DatasetCache = DatasetCache::new();
    &CACHE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LoadStage;
    use crate::data::model::video;
    use std::cell::Cell;

    #[test]
    fn loader_runs_once_after_success() {
        let cache = DatasetCache::new();
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok(VideoTable::from_records(vec![video("a", "Music", 1.0, 1.0)]))
        };

        let first = cache.get_or_load(load).unwrap();
        let second = cache.get_or_load(load).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.is_loaded());
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = DatasetCache::new();
        let err = cache
            .get_or_load(|| {
                Err(DataUnavailable::new(
                    LoadStage::Acquire,
                    anyhow::anyhow!("network down"),
                ))
            })
            .unwrap_err();
        assert_eq!(err.stage, LoadStage::Acquire);
        assert!(!cache.is_loaded());

        let table = cache.get_or_load(|| Ok(VideoTable::default())).unwrap();
        assert!(table.is_empty());
        assert!(cache.is_loaded());
    }
}
