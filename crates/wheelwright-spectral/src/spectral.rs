//! Degree, Laplacian, eigendecomposition, and n-hop connectivity.

use crate::adjacency::AdjacencyView;
use crate::error::SpectralError;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Relative tolerance for deciding that an eigenvalue is real.
const SPECTRUM_TOLERANCE: f64 = 1e-9;

/// Spectral quantities derived from an adjacency matrix.
#[derive(Debug, Clone)]
pub struct SpectralView {
    adj: DMatrix<f64>,
}

impl SpectralView {
    /// Build a view over an explicit adjacency matrix.
    #[must_use]
    pub const fn new(adj: DMatrix<f64>) -> Self {
        Self { adj }
    }

    /// Build a view over a projected graph.
    #[must_use]
    pub fn from_view(view: &AdjacencyView) -> Self {
        Self::new(view.matrix().clone())
    }

    /// The adjacency matrix.
    #[must_use]
    pub const fn adjacency(&self) -> &DMatrix<f64> {
        &self.adj
    }

    /// The degree matrix: a diagonal of column sums, counting how many
    /// refs depend directly on each vertex.
    #[must_use]
    pub fn degree_matrix(&self) -> DMatrix<f64> {
        let n = self.adj.ncols();
        let degrees = DVector::from_iterator(n, (0..n).map(|j| self.adj.column(j).sum()));
        DMatrix::from_diagonal(&degrees)
    }

    /// The Laplacian `L = D - A`.
    #[must_use]
    pub fn laplacian(&self) -> DMatrix<f64> {
        self.degree_matrix() - &self.adj
    }

    /// Eigendecomposition of the Laplacian, sorted by ascending eigenvalue.
    ///
    /// Eigenvalues come from the Schur form; each eigenvector is recovered
    /// as the null-space direction of `L - lambda*I` via SVD. Eigenvector
    /// signs are normalized so the first non-zero component is positive.
    ///
    /// # Errors
    /// `EmptyMatrix` for a zero-vertex view; `ComplexSpectrum` when the
    /// Laplacian has a genuinely complex eigenvalue (possible for directed
    /// cycles), since this facility only exposes real decompositions.
    pub fn eigendecomposition(&self) -> Result<Eigendecomposition, SpectralError> {
        let laplacian = self.laplacian();
        let n = laplacian.nrows();
        if n == 0 {
            return Err(SpectralError::EmptyMatrix);
        }

        let tolerance = SPECTRUM_TOLERANCE * laplacian.norm().max(1.0);
        let complex = laplacian.clone().complex_eigenvalues();
        let mut values = Vec::with_capacity(n);
        for (index, eigenvalue) in complex.iter().enumerate() {
            if eigenvalue.im.abs() > tolerance {
                return Err(SpectralError::ComplexSpectrum {
                    index,
                    imaginary: eigenvalue.im,
                });
            }
            values.push(eigenvalue.re);
        }

        let mut permutation: Vec<usize> = (0..n).collect();
        permutation.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let sorted_values = DVector::from_iterator(n, permutation.iter().map(|&i| values[i]));

        let identity = DMatrix::<f64>::identity(n, n);
        let mut vectors = DMatrix::<f64>::zeros(n, n);
        for (column, &original) in permutation.iter().enumerate() {
            let shifted = &laplacian - &identity * values[original];
            let svd = shifted.svd(false, true);
            let v_t = svd.v_t.ok_or_else(|| SpectralError::DecompositionFailed {
                message: "SVD produced no right singular vectors".into(),
            })?;
            // The null-space direction is the right singular vector of the
            // smallest singular value.
            let smallest = svd
                .singular_values
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    a.1.partial_cmp(b.1)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map_or(n - 1, |(row, _)| row);
            let mut vector = v_t.row(smallest).transpose();
            if let Some(first) = vector.iter().find(|x| x.abs() > tolerance)
                && *first < 0.0
            {
                vector.neg_mut();
            }
            vectors.set_column(column, &vector);
        }

        debug!(vertices = n, "laplacian decomposed");
        Ok(Eigendecomposition {
            values: sorted_values,
            vectors,
            permutation,
        })
    }

    /// Accumulated n-hop connectivity matrices.
    ///
    /// Yields `A`, then `A + A^2`, then `A + A^2 + A^3`, and so on,
    /// terminating once the next power of `A` is the zero matrix. On a
    /// cyclic graph the powers never vanish, so take only as many hops as
    /// needed.
    #[must_use]
    pub fn hop_connectivity(&self) -> HopConnectivity {
        HopConnectivity {
            base: self.adj.clone(),
            power: self.adj.clone(),
            accumulated: self.adj.clone(),
            yielded_base: false,
        }
    }
}

/// Sorted eigendecomposition of a Laplacian.
#[derive(Debug, Clone)]
pub struct Eigendecomposition {
    /// Eigenvalues, ascending.
    pub values: DVector<f64>,
    /// Eigenvectors, one column per eigenvalue, in the same order.
    pub vectors: DMatrix<f64>,
    /// Permutation mapping sorted positions to unsorted eigenvalue indices.
    pub permutation: Vec<usize>,
}

/// Iterator over accumulated hop-connectivity matrices.
#[derive(Debug, Clone)]
pub struct HopConnectivity {
    base: DMatrix<f64>,
    power: DMatrix<f64>,
    accumulated: DMatrix<f64>,
    yielded_base: bool,
}

impl Iterator for HopConnectivity {
    type Item = DMatrix<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.yielded_base {
            self.yielded_base = true;
            return Some(self.base.clone());
        }

        self.power = &self.power * &self.base;
        if self.power.iter().all(|&x| x.abs() < f64::EPSILON) {
            return None;
        }
        self.accumulated += &self.power;
        Some(self.accumulated.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matrix(rows: usize, data: &[f64]) -> DMatrix<f64> {
        DMatrix::from_row_slice(rows, rows, data)
    }

    /// a -> b -> c chain.
    fn chain() -> SpectralView {
        SpectralView::new(matrix(
            3,
            &[
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.0, 0.0,
            ],
        ))
    }

    /// a <-> b mutual pair.
    fn pair() -> SpectralView {
        SpectralView::new(matrix(2, &[0.0, 1.0, 1.0, 0.0]))
    }

    #[test]
    fn degree_counts_dependents() {
        let degree = chain().degree_matrix();
        assert_eq!(degree, matrix(3, &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn laplacian_columns_sum_to_zero() {
        let laplacian = chain().laplacian();
        for j in 0..laplacian.ncols() {
            assert!(laplacian.column(j).sum().abs() < 1e-12);
        }
    }

    #[test]
    fn symmetric_laplacian_rows_sum_to_zero() {
        let laplacian = pair().laplacian();
        for i in 0..laplacian.nrows() {
            assert!(laplacian.row(i).sum().abs() < 1e-12);
        }
    }

    #[test]
    fn eigendecomposition_of_symmetric_pair() {
        let eigen = pair().eigendecomposition().unwrap();

        assert!((eigen.values[0] - 0.0).abs() < 1e-9);
        assert!((eigen.values[1] - 2.0).abs() < 1e-9);
        assert_eq!(eigen.permutation.len(), 2);

        // Each column solves L v = lambda v.
        let laplacian = pair().laplacian();
        for k in 0..2 {
            let vector = eigen.vectors.column(k).into_owned();
            let residual = &laplacian * &vector - &vector * eigen.values[k];
            assert!(residual.norm() < 1e-8);
            assert!((vector.norm() - 1.0).abs() < 1e-8);
        }
    }

    #[test]
    fn eigendecomposition_of_triangular_chain() {
        let view = chain();
        let eigen = view.eigendecomposition().unwrap();

        let values: Vec<f64> = eigen.values.iter().copied().collect();
        assert!((values[0] - 0.0).abs() < 1e-9);
        assert!((values[1] - 1.0).abs() < 1e-9);
        assert!((values[2] - 1.0).abs() < 1e-9);
        assert!(values.windows(2).all(|w| w[0] <= w[1] + 1e-12));
    }

    #[test]
    fn complex_spectrum_is_reported() {
        // Directed 3-cycle: the Laplacian picks up complex eigenvalues.
        let view = SpectralView::new(matrix(
            3,
            &[
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0, //
                1.0, 0.0, 0.0,
            ],
        ));
        let err = view.eigendecomposition().unwrap_err();
        assert!(matches!(err, SpectralError::ComplexSpectrum { .. }));
    }

    #[test]
    fn empty_matrix_is_an_error() {
        let view = SpectralView::new(DMatrix::zeros(0, 0));
        assert!(matches!(
            view.eigendecomposition(),
            Err(SpectralError::EmptyMatrix)
        ));
    }

    #[test]
    fn hop_connectivity_terminates_on_a_dag() {
        let hops: Vec<DMatrix<f64>> = chain().hop_connectivity().collect();

        // A, then A + A^2; A^3 is zero.
        assert_eq!(hops.len(), 2);
        assert!((hops[0][(0, 1)] - 1.0).abs() < f64::EPSILON);
        assert!(hops[0][(0, 2)].abs() < f64::EPSILON);
        assert!((hops[1][(0, 2)] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hop_connectivity_is_monotone() {
        let hops: Vec<DMatrix<f64>> = pair().hop_connectivity().take(5).collect();
        assert_eq!(hops.len(), 5);

        for window in hops.windows(2) {
            for (previous, current) in window[0].iter().zip(window[1].iter()) {
                assert!(current >= previous);
            }
        }
    }
}
