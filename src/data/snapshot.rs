use std::path::{Path, PathBuf};

use super::index::DrugIndex;
use super::model::Dataset;

/// An immutable dataset together with the index derived from it.
///
/// Both halves are built in [`Snapshot::new`] and never change afterwards;
/// a reload produces a whole new snapshot.
#[derive(Debug)]
pub struct Snapshot {
    dataset: Dataset,
    index: DrugIndex,
    source: Option<PathBuf>,
}

impl Snapshot {
    pub fn new(dataset: Dataset) -> Self {
        let index = DrugIndex::build(&dataset);
        Self {
            dataset,
            index,
            source: None,
        }
    }

    /// Remember the file this snapshot was loaded from.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn index(&self) -> &DrugIndex {
        &self.index
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
