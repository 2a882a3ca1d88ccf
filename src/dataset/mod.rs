//! Dataset trait: unified interface for indexable record collections.

mod config;
mod ptbxl;
mod subset;

pub use config::{DatasetOptions, PtbXlConfig, SamplingFrequency};
pub use ptbxl::{EcgSample, PtbXlDataset};
pub use subset::Subset;

use crate::error::Result;

/// A dataset is a fixed-length, randomly indexable collection.
///
/// Implementations must be `Send + Sync` so loaders can read from several
/// threads; `get` takes `&self` and must not rely on interior mutation.
pub trait Dataset: Send + Sync {
    type Item;

    /// Total number of items.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load the item at position `index`.
    ///
    /// Fails with `IndexOutOfRange` for `index >= self.len()`.
    fn get(&self, index: usize) -> Result<Self::Item>;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }

    /// Iterate over all items in order. Each item is loaded on demand.
    fn iter(&self) -> DatasetIter<'_, Self>
    where
        Self: Sized,
    {
        DatasetIter {
            dataset: self,
            next: 0,
        }
    }
}

/// Sequential iterator over a [`Dataset`], yielding one `Result` per position.
pub struct DatasetIter<'a, D: Dataset> {
    dataset: &'a D,
    next: usize,
}

impl<D: Dataset> Iterator for DatasetIter<'_, D> {
    type Item = Result<D::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.dataset.len() {
            return None;
        }
        let item = self.dataset.get(self.next);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.dataset.len().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl<D: Dataset> ExactSizeIterator for DatasetIter<'_, D> {}
