//! Sparse matrix utilities for the global system matrices
//!
//! Assembled stiffness and mass matrices of the benchmark mesh are banded
//! and mostly empty; COO assembly plus a skyline Cholesky solve keeps the
//! static solution cheap even for fine meshes.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::elements::Mat6;

/// Sparse matrix builder using COO format.
/// More efficient for incremental assembly.
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new sparse matrix builder
    pub fn new(size: usize) -> Self {
        // Pre-allocate for typical frame connectivity:
        // 3 DOFs per node, two elements per interior node
        let estimated_nnz = size * 12;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value.abs() > 1e-15 {
            self.entries.push((row, col, value));
        }
    }

    /// Add a 6x6 element matrix at the given global DOF indices
    pub fn add_element_matrix(&mut self, dofs: &[usize; 6], elem: &Mat6) {
        for (i, &di) in dofs.iter().enumerate() {
            for (j, &dj) in dofs.iter().enumerate() {
                self.add(di, dj, elem[(i, j)]);
            }
        }
    }

    /// Iterate over the raw (row, col, value) entries
    pub fn iter(&self) -> impl Iterator<Item = &(usize, usize, f64)> {
        self.entries.iter()
    }

    /// Convert to CSR format for efficient solves
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Convert to dense matrix (for comparison/debugging)
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Matrix dimension
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get estimated non-zero count
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Sparse Cholesky solver for symmetric positive definite matrices.
///
/// Skyline storage: the stiffness partition of a line mesh has a narrow,
/// monotone profile, so for each row only the band from the first non-zero
/// to the diagonal is stored and factorized in place.
pub struct SparseCholeskySolver {
    size: usize,
    // Skyline storage: for each row, from first non-zero up to the diagonal
    skyline: Vec<Vec<f64>>,
    // Row heights (distance from diagonal to first non-zero)
    heights: Vec<usize>,
}

impl SparseCholeskySolver {
    /// Create solver from CSR matrix
    pub fn new(csr: &CsrMatrix<f64>) -> Self {
        let size = csr.nrows();

        // Compute row heights (skyline profile)
        let mut heights = vec![0usize; size];
        for (row, col, _val) in csr.triplet_iter() {
            if col < row {
                let height = row - col;
                if height > heights[row] {
                    heights[row] = height;
                }
            }
        }

        // Allocate skyline storage
        let mut skyline: Vec<Vec<f64>> = Vec::with_capacity(size);
        for &h in &heights {
            skyline.push(vec![0.0; h + 1]);
        }

        // Copy the lower triangle into skyline storage
        for (row, col, &val) in csr.triplet_iter() {
            if col >= row - heights[row] && col <= row {
                let idx = col - (row - heights[row]);
                skyline[row][idx] += val;
            }
        }

        Self {
            size,
            skyline,
            heights,
        }
    }

    /// Factorize the matrix in place (Cholesky on the skyline)
    pub fn factorize(&mut self) -> Result<(), &'static str> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;

            // Compute L[i,j] for j < i
            for j in start_i..i {
                let hj = self.heights[j];
                let start_j = j - hj;

                let start = start_i.max(start_j);
                let mut sum = 0.0;

                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let diag_j = self.skyline[j][hj];
                if diag_j.abs() < 1e-15 {
                    return Err("Zero pivot in Cholesky factorization");
                }

                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / diag_j;
            }

            // Compute L[i,i] (diagonal)
            let mut sum = 0.0;
            for j in start_i..i {
                let val = self.get(i, j);
                sum += val * val;
            }

            let diag = self.skyline[i][hi] - sum;
            if diag <= 0.0 {
                return Err("Matrix not positive definite");
            }
            self.skyline[i][hi] = diag.sqrt();
        }

        Ok(())
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        if col > row {
            return self.get(col, row); // Symmetric
        }
        let h = self.heights[row];
        let start = row - h;
        if col < start {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Solve L * L^T * x = b
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();

        // Forward substitution: L * y = b
        for i in 0..self.size {
            let hi = self.heights[i];
            let start = i - hi;

            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }

            x[i] = (x[i] - sum) / self.get(i, i);
        }

        // Backward substitution: L^T * x = y
        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);

            let hi = self.heights[i];
            let start = i - hi;

            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_builder_accumulates() {
        let mut builder = SparseMatrixBuilder::new(3);
        builder.add(0, 0, 2.0);
        builder.add(0, 0, 2.0);
        builder.add(1, 2, 1.0);

        let dense = builder.to_dense();
        assert!((dense[(0, 0)] - 4.0).abs() < 1e-10);
        assert!((dense[(1, 2)] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_skyline_cholesky_solve() {
        // Simple SPD system with a known solution
        let mut builder = SparseMatrixBuilder::new(3);
        builder.add(0, 0, 4.0);
        builder.add(0, 1, -1.0);
        builder.add(1, 0, -1.0);
        builder.add(1, 1, 4.0);
        builder.add(1, 2, -1.0);
        builder.add(2, 1, -1.0);
        builder.add(2, 2, 4.0);

        let csr = builder.to_csr();
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        let mut solver = SparseCholeskySolver::new(&csr);
        solver.factorize().unwrap();
        let x = solver.solve(&b);

        // Verify A * x = b against the dense matrix
        let dense = builder.to_dense();
        let residual = (&dense * &x - &b).norm();
        assert!(residual < 1e-10, "residual: {}", residual);
    }

    #[test]
    fn test_skyline_rejects_indefinite() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 1.0);
        builder.add(1, 1, -1.0);

        let mut solver = SparseCholeskySolver::new(&builder.to_csr());
        assert!(solver.factorize().is_err());
    }
}
