use crate::error::{DatasetError, Result};

use super::Dataset;

/// A dataset that exposes only the items at the given positions.
///
/// Used for train/validation/test splits, e.g. by PTB-XL's `strat_fold`.
pub struct Subset<D: Dataset> {
    inner: D,
    indices: Vec<usize>,
}

impl<D: Dataset> Subset<D> {
    /// Positions out of range for `inner` surface as errors from `get`.
    pub fn new(inner: D, indices: Vec<usize>) -> Self {
        Self { inner, indices }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Positions in the inner dataset, in subset order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl<D: Dataset> Dataset for Subset<D> {
    type Item = D::Item;

    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<D::Item> {
        let inner = *self
            .indices
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.indices.len(),
            })?;
        self.inner.get(inner)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
