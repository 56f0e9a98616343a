use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use super::DesignMatrix;

/// Dense `n x p` design matrix, assumed already centered/scaled by the
/// caller's standardization pass (the sparse-standardization correction in
/// §4.4 does not apply here).
#[derive(Debug, Clone)]
pub struct DenseMatrix {
    data: DMatrix<f64>,
}

impl DenseMatrix {
    pub fn new(data: DMatrix<f64>) -> Self {
        Self { data }
    }

    pub fn as_nalgebra(&self) -> &DMatrix<f64> {
        &self.data
    }
}

impl DesignMatrix for DenseMatrix {
    fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    fn n_cols(&self) -> usize {
        self.data.ncols()
    }

    fn mul(&self, beta: &DMatrix<f64>) -> DMatrix<f64> {
        &self.data * beta
    }

    fn tmul(&self, v: &DMatrix<f64>) -> DMatrix<f64> {
        self.data.transpose() * v
    }

    fn column_subset(&self, indices: &[usize]) -> Self {
        // `select_columns` materializes a fresh matrix; column-parallel
        // gather keeps this cheap even for wide active sets.
        let cols: Vec<DVector<f64>> = indices
            .par_iter()
            .map(|&j| self.data.column(j).clone_owned())
            .collect();
        let mut out = DMatrix::<f64>::zeros(self.n_rows(), indices.len());
        for (k, col) in cols.into_iter().enumerate() {
            out.set_column(k, &col);
        }
        Self { data: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_and_tmul_round_trip_identity() {
        let x = DenseMatrix::new(DMatrix::identity(3, 3));
        let beta = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let eta = x.mul(&beta);
        assert_eq!(eta.as_slice(), beta.as_slice());
        let g = x.tmul(&eta);
        assert_eq!(g.as_slice(), beta.as_slice());
    }

    #[test]
    fn column_subset_selects_requested_columns_in_order() {
        let x = DenseMatrix::new(DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        let sub = x.column_subset(&[2, 0]);
        assert_eq!(sub.n_cols(), 2);
        assert_eq!(sub.as_nalgebra().column(0).as_slice(), [3.0, 6.0]);
        assert_eq!(sub.as_nalgebra().column(1).as_slice(), [1.0, 4.0]);
    }
}
