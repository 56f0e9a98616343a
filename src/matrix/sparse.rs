use nalgebra::DMatrix;
use sprs::{CsMat, TriMat};

use super::DesignMatrix;

/// Column-sparse (CSC) design matrix.
///
/// When the caller standardizes `X` "logically" (keeping the sparse storage
/// untouched and instead carrying `x_center`/`x_scale` vectors, so that
/// explicit centering never destroys sparsity), those vectors are stored
/// here and exposed through [`DesignMatrix::column_center_scale`] so the
/// FISTA solver can apply the §4.4 gradient correction.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    data: CsMat<f64>,
    x_center: Option<Vec<f64>>,
    x_scale: Option<Vec<f64>>,
}

impl SparseMatrix {
    pub fn new(data: CsMat<f64>) -> Self {
        assert!(data.is_csc(), "SparseMatrix requires CSC storage");
        Self {
            data,
            x_center: None,
            x_scale: None,
        }
    }

    pub fn with_logical_standardization(data: CsMat<f64>, x_center: Vec<f64>, x_scale: Vec<f64>) -> Self {
        assert_eq!(x_center.len(), data.cols());
        assert_eq!(x_scale.len(), data.cols());
        Self {
            data,
            x_center: Some(x_center),
            x_scale: Some(x_scale),
        }
    }

    pub fn as_sprs(&self) -> &CsMat<f64> {
        &self.data
    }
}

impl DesignMatrix for SparseMatrix {
    fn n_rows(&self) -> usize {
        self.data.rows()
    }

    fn n_cols(&self) -> usize {
        self.data.cols()
    }

    fn mul(&self, beta: &DMatrix<f64>) -> DMatrix<f64> {
        let n = self.n_rows();
        let m = beta.ncols();
        let mut out = DMatrix::<f64>::zeros(n, m);
        for j in 0..self.n_cols() {
            let Some(col) = self.data.outer_view(j) else {
                continue;
            };
            for (row, &val) in col.iter() {
                for c in 0..m {
                    out[(row, c)] += val * beta[(j, c)];
                }
            }
        }
        out
    }

    fn tmul(&self, v: &DMatrix<f64>) -> DMatrix<f64> {
        let p = self.n_cols();
        let m = v.ncols();
        let mut out = DMatrix::<f64>::zeros(p, m);
        for j in 0..p {
            let Some(col) = self.data.outer_view(j) else {
                continue;
            };
            for (row, &val) in col.iter() {
                for c in 0..m {
                    out[(j, c)] += val * v[(row, c)];
                }
            }
        }
        out
    }

    fn column_subset(&self, indices: &[usize]) -> Self {
        let mut tri = TriMat::new((self.n_rows(), indices.len()));
        for (new_j, &old_j) in indices.iter().enumerate() {
            if let Some(col) = self.data.outer_view(old_j) {
                for (row, &val) in col.iter() {
                    tri.add_triplet(row, new_j, val);
                }
            }
        }
        let data = tri.to_csc();

        let x_center = self
            .x_center
            .as_ref()
            .map(|c| indices.iter().map(|&j| c[j]).collect());
        let x_scale = self
            .x_scale
            .as_ref()
            .map(|s| indices.iter().map(|&j| s[j]).collect());

        Self {
            data,
            x_center,
            x_scale,
        }
    }

    fn column_center_scale(&self) -> Option<(&[f64], &[f64])> {
        match (&self.x_center, &self.x_scale) {
            (Some(c), Some(s)) => Some((c.as_slice(), s.as_slice())),
            _ => None,
        }
    }
}
