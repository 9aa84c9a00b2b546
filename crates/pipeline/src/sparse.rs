//! Sparse feature vectors

use ndarray::{Array1, Array2};

/// One sparse row: sorted, unique `(index, value)` pairs over `dim` features
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from entries sorted by index, each index `< dim`
    pub fn new(dim: usize, entries: Vec<(usize, f64)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(entries.last().map_or(true, |(idx, _)| *idx < dim));
        Self { dim, entries }
    }

    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Horizontal concatenation: `other`'s indices are shifted by `self.dim()`
    pub fn hstack(mut self, other: &SparseVector) -> SparseVector {
        let offset = self.dim;
        self.entries
            .extend(other.entries.iter().map(|(idx, v)| (idx + offset, *v)));
        self.dim += other.dim;
        self
    }

    /// `weights · self` for every row of `weights` (rows × dim)
    pub fn dot_rows(&self, weights: &Array2<f64>) -> Array1<f64> {
        let mut scores = Array1::zeros(weights.nrows());
        for (idx, value) in self.iter() {
            scores.scaled_add(value, &weights.column(idx));
        }
        scores
    }

    pub fn to_dense(&self) -> Array1<f64> {
        let mut dense = Array1::zeros(self.dim);
        for (idx, value) in self.iter() {
            dense[idx] = value;
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_hstack_offsets_indices() {
        let word = SparseVector::new(3, vec![(0, 0.5), (2, 1.0)]);
        let chars = SparseVector::new(4, vec![(1, 2.0)]);
        let joined = word.hstack(&chars);

        assert_eq!(joined.dim(), 7);
        assert_eq!(
            joined.iter().collect::<Vec<_>>(),
            vec![(0, 0.5), (2, 1.0), (4, 2.0)]
        );
    }

    #[test]
    fn test_dot_rows() {
        let x = SparseVector::new(3, vec![(0, 1.0), (2, 2.0)]);
        let weights = array![[1.0, 5.0, 3.0], [-1.0, 0.0, 0.5]];
        assert_eq!(x.dot_rows(&weights), array![7.0, 0.0]);
    }

    #[test]
    fn test_zero_vector() {
        let x = SparseVector::zeros(4);
        assert!(x.is_empty());
        assert_eq!(x.to_dense(), Array1::<f64>::zeros(4));
        assert_eq!(x.dot_rows(&Array2::ones((2, 4))), array![0.0, 0.0]);
    }
}
