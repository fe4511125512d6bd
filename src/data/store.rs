use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};

use super::error::{LoadError, QueryError};
use super::loader;
use super::snapshot::Snapshot;

/// Default dataset file, relative to the working directory.
pub const DEFAULT_SOURCE: &str = "antibiotic_data.json";

// ---------------------------------------------------------------------------
// MatrixStore – the shared, swappable handle
// ---------------------------------------------------------------------------

/// Owns the configured dataset source and the currently published
/// [`Snapshot`].
///
/// Readers take an `Arc<Snapshot>` and keep using it for the whole request;
/// a reload builds a complete new snapshot and swaps it in with a single
/// store, so nobody observes a dataset paired with a stale index. A failed
/// load publishes nothing.
pub struct MatrixStore {
    source: ArcSwap<PathBuf>,
    current: ArcSwapOption<Snapshot>,
}

impl Default for MatrixStore {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

impl MatrixStore {
    /// Store configured for `source`, not yet loaded.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: ArcSwap::from_pointee(source.into()),
            current: ArcSwapOption::empty(),
        }
    }

    /// Store publishing an already built snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let source = snapshot
            .source()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE));
        let store = Self::new(source);
        store.current.store(Some(Arc::new(snapshot)));
        store
    }

    /// The configured source path.
    pub fn source(&self) -> PathBuf {
        PathBuf::clone(&self.source.load())
    }

    /// (Re)load from the configured source.
    pub fn load(&self) -> Result<Arc<Snapshot>, LoadError> {
        let source = self.source.load_full();
        self.publish_from(&source)
    }

    /// Load from `path` and, on success, make it the configured source.
    /// On failure both the source and the published snapshot are kept.
    pub fn load_from(&self, path: impl AsRef<Path>) -> Result<Arc<Snapshot>, LoadError> {
        let path = path.as_ref();
        let snapshot = self.publish_from(path)?;
        self.source.store(Arc::new(path.to_path_buf()));
        Ok(snapshot)
    }

    fn publish_from(&self, path: &Path) -> Result<Arc<Snapshot>, LoadError> {
        let dataset = match loader::load_file(path) {
            Ok(ds) => ds,
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                return Err(e);
            }
        };

        let snapshot = Arc::new(Snapshot::new(dataset).with_source(path));
        log::info!(
            "Loaded {} organisms and {} drugs from {}",
            snapshot.dataset().len(),
            snapshot.index().len(),
            path.display()
        );
        self.current.store(Some(Arc::clone(&snapshot)));
        Ok(snapshot)
    }

    /// The published snapshot, without attempting a load.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// The published snapshot; on a cold miss, one load attempt is made
    /// from the configured source first.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>, QueryError> {
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }
        log::warn!(
            "Dataset not loaded, retrying {}",
            self.source.load().display()
        );
        self.load().map_err(|e| QueryError::DataNotLoaded {
            cause: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use tempfile::tempdir;

    use super::*;
    use crate::data::model::{Dataset, Record};

    const MATRIX: &str = r#"{"drug_list": ["Ampicillin"],
        "data": [{"bacteria": "Escherichia coli", "antibiotics": {"Ampicillin": "R"}}]}"#;

    #[test]
    fn cold_store_reports_not_loaded() {
        let dir = tempdir().unwrap();
        let store = MatrixStore::new(dir.path().join("absent.json"));
        assert!(!store.is_loaded());
        let err = store.snapshot().unwrap_err();
        assert_eq!(err.reason(), "data_not_loaded");
        assert!(matches!(
            err,
            QueryError::DataNotLoaded { cause: Some(ref c) } if matches!(**c, LoadError::NotFound { .. })
        ));
        assert!(!store.is_loaded());
    }

    #[test]
    fn cold_miss_retries_the_configured_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix.json");
        let store = MatrixStore::new(&path);
        assert!(store.snapshot().is_err());

        std::fs::write(&path, MATRIX).unwrap();
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.dataset().len(), 1);
        assert_eq!(snap.source(), Some(path.as_path()));
        assert!(store.is_loaded());
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix.json");
        std::fs::write(&path, MATRIX).unwrap();
        let store = MatrixStore::new(&path);
        let first = store.load().unwrap();

        std::fs::write(&path, "{ broken").unwrap();
        assert!(matches!(store.load(), Err(LoadError::Parse { .. })));
        let still = store.snapshot().unwrap();
        assert!(Arc::ptr_eq(&first, &still));

        let bad = dir.path().join("other.csv");
        assert!(store.load_from(&bad).is_err());
        assert_eq!(store.source(), path);
        assert!(Arc::ptr_eq(&first, &store.current().unwrap()));
    }

    #[test]
    fn load_from_switches_source() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("matrix.csv");
        std::fs::write(&csv, "organism,Ampicillin,Gentamicin\nKlebsiella,R,S\n").unwrap();

        let store = MatrixStore::default();
        let snap = store.load_from(&csv).unwrap();
        assert_eq!(snap.index().len(), 2);
        assert_eq!(store.source(), csv);
    }

    #[test]
    fn concurrent_readers_share_the_snapshot() {
        let store = Arc::new(MatrixStore::with_snapshot(Snapshot::new(
            Dataset::from_records(vec![Record::new("Escherichia coli", [("Ampicillin", "R")])]),
        )));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let snap = store.snapshot().unwrap();
                    let results = snap.find_drug("Ampicillin").unwrap();
                    assert_eq!(results.len(), snap.dataset().len());
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
