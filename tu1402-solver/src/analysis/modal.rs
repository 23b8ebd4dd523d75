//! Modal (eigenvalue) analysis
//!
//! Extracts natural frequencies and mode shapes of the undamped system from
//! the generalized problem `Kff * phi = lambda * Mff * phi`.

use std::collections::HashMap;

use nalgebra::linalg::SymmetricEigen;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::assembly::{Partition, System};
use crate::error::{SolverError, SolverResult};
use crate::model::Model;
use crate::results::ModalResults;

/// Mode shape normalization method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Scale each shape so that phi' * M * phi = 1
    Mass,
    /// Scale each shape to a unit maximum component
    Displacement,
}

impl Default for Normalization {
    fn default() -> Self {
        Self::Mass
    }
}

/// Modal analysis settings and entry point.
///
/// Defaults match the original backend: a single mode, no shift,
/// mass-normalized shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalAnalysis {
    /// Number of eigenvalues to extract
    pub n_modes: usize,
    /// Shift: keep the eigenvalues nearest this value (in rad²/s² units)
    pub sigma: Option<f64>,
    /// Requested relative accuracy; the dense eigensolver always computes to
    /// machine precision, the field is kept for configuration compatibility
    pub tolerance: f64,
    /// Mode shape normalization method
    pub normalization: Normalization,
    /// Whether mode shapes are extracted in addition to frequencies
    pub return_shapes: bool,
}

impl Default for ModalAnalysis {
    fn default() -> Self {
        Self {
            n_modes: 1,
            sigma: None,
            tolerance: 0.0,
            normalization: Normalization::Mass,
            return_shapes: true,
        }
    }
}

impl ModalAnalysis {
    /// Create an analysis with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of eigenvalues to extract
    pub fn with_modes(mut self, n_modes: usize) -> Self {
        self.n_modes = n_modes;
        self
    }

    /// Set the shift near which eigenvalues are extracted
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    /// Set the requested relative accuracy
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the mode shape normalization method
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Skip mode shape extraction, returning frequencies only
    pub fn without_shapes(mut self) -> Self {
        self.return_shapes = false;
        self
    }

    /// Run the analysis on a model
    pub fn run(&self, model: &Model) -> SolverResult<ModalResults> {
        self.validate()?;

        let system = System::assemble(model)?;
        let dof_map = system.dof_map();
        let n_free = dof_map.free().len();

        if n_free == 0 {
            return Err(SolverError::NoFreeDofs);
        }
        if self.n_modes > n_free {
            return Err(SolverError::InvalidInput(format!(
                "requested {} modes but the model has only {} free DOFs",
                self.n_modes, n_free
            )));
        }

        let kff = system.stiffness_partition(Partition::Free, Partition::Free);
        let mff = system.mass_partition(Partition::Free, Partition::Free);

        // Reduce to a standard symmetric problem via M = L * L'
        let l = Self::mass_cholesky(&mff)?;
        let l_inv = l.try_inverse().ok_or(SolverError::IndefiniteMass)?;

        let k_tilde = &l_inv * &kff * l_inv.transpose();
        let k_tilde_sym = (&k_tilde + k_tilde.transpose()) * 0.5;

        let eig = SymmetricEigen::new(k_tilde_sym);

        // Sort ascending and drop negative eigenvalues
        let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| {
            eig.eigenvalues[a]
                .partial_cmp(&eig.eigenvalues[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let negative = order
            .iter()
            .filter(|&&i| eig.eigenvalues[i] < 0.0)
            .count();
        if negative > 0 {
            log::warn!("{} negative eigenvalues discarded", negative);
            order.retain(|&i| eig.eigenvalues[i] >= 0.0);
        }
        if order.is_empty() {
            return Err(SolverError::AnalysisFailed(
                "no non-negative eigenvalues found".to_string(),
            ));
        }

        // Keep the requested modes: nearest the shift when one is set,
        // the lowest otherwise
        let n_keep = self.n_modes.min(order.len());
        if n_keep < self.n_modes {
            log::warn!(
                "only {} of {} requested modes available",
                n_keep,
                self.n_modes
            );
        }
        let mut kept: Vec<usize> = if let Some(sigma) = self.sigma {
            let mut by_distance = order.clone();
            by_distance.sort_by(|&a, &b| {
                let da = (eig.eigenvalues[a] - sigma).abs();
                let db = (eig.eigenvalues[b] - sigma).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
            by_distance.truncate(n_keep);
            by_distance
        } else {
            order[..n_keep].to_vec()
        };
        kept.sort_by(|&a, &b| {
            eig.eigenvalues[a]
                .partial_cmp(&eig.eigenvalues[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let frequencies: Vec<f64> = kept
            .iter()
            .map(|&i| eig.eigenvalues[i].sqrt() / (2.0 * std::f64::consts::PI))
            .collect();

        let shapes = if self.return_shapes {
            let mut full = DMatrix::zeros(dof_map.ndofs(), kept.len());

            for (col, &idx) in kept.iter().enumerate() {
                // Back-transform to the generalized eigenvector
                let y = eig.eigenvectors.column(idx).clone_owned();
                let mut phi: DVector<f64> = l_inv.transpose() * y;

                match self.normalization {
                    Normalization::Mass => {
                        let scaling = phi.dot(&(&mff * &phi)).sqrt();
                        phi /= scaling;
                    }
                    Normalization::Displacement => {
                        let scaling = phi.amax();
                        phi /= scaling;
                    }
                }

                // Expand to all DOFs; restrained rows stay zero
                for (pos, &dof) in dof_map.free().iter().enumerate() {
                    full[(dof, col)] = phi[pos];
                }
            }

            Some(full)
        } else {
            None
        };

        let mut node_dofs = HashMap::new();
        for name in model.node_order() {
            if let Some(dofs) = dof_map.node_dofs(name) {
                node_dofs.insert(name.clone(), dofs);
            }
        }

        Ok(ModalResults::new(
            frequencies,
            shapes,
            self.normalization,
            node_dofs,
        ))
    }

    fn validate(&self) -> SolverResult<()> {
        if self.n_modes == 0 {
            return Err(SolverError::InvalidInput(
                "number of eigenvalues must be positive".to_string(),
            ));
        }
        if let Some(sigma) = self.sigma {
            if sigma <= 0.0 {
                return Err(SolverError::InvalidInput(
                    "sigma must be positive and non-zero".to_string(),
                ));
            }
        }
        if self.tolerance < 0.0 {
            return Err(SolverError::InvalidInput(
                "tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Cholesky factor of the mass partition, with a small regularization
    /// retry for meshes whose consistent mass is borderline
    fn mass_cholesky(mff: &DMatrix<f64>) -> SolverResult<DMatrix<f64>> {
        let n = mff.nrows();

        let mut m_reg = mff.clone();
        for i in 0..n {
            m_reg[(i, i)] += 1e-12 * mff[(i, i)].abs().max(1e-20);
        }

        if let Some(chol) = m_reg.clone().cholesky() {
            return Ok(chol.l());
        }

        for i in 0..n {
            m_reg[(i, i)] += 1e-8;
        }
        m_reg
            .cholesky()
            .map(|chol| chol.l())
            .ok_or(SolverError::IndefiniteMass)
    }
}
