//! Result types for the benchmark analyses

use std::collections::HashMap;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::analysis::Normalization;
use crate::model::Dof;

/// Results of a linear static analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticResults {
    /// Displacements per node, ordered (ux, uy, rz)
    displacements: HashMap<String, [f64; 3]>,
    /// Reactions per supported node, ordered (fx, fy, mz)
    reactions: HashMap<String, [f64; 3]>,
}

impl StaticResults {
    pub(crate) fn new(
        displacements: HashMap<String, [f64; 3]>,
        reactions: HashMap<String, [f64; 3]>,
    ) -> Self {
        Self {
            displacements,
            reactions,
        }
    }

    /// Get the displacement of a node (ux, uy, rz)
    pub fn displacement(&self, node: &str) -> Option<[f64; 3]> {
        self.displacements.get(node).copied()
    }

    /// Get the reaction at a supported node (fx, fy, mz)
    pub fn reaction(&self, node: &str) -> Option<[f64; 3]> {
        self.reactions.get(node).copied()
    }

    /// Nodes carrying reactions
    pub fn supported_nodes(&self) -> impl Iterator<Item = &str> {
        self.reactions.keys().map(|s| s.as_str())
    }

    /// Largest translation magnitude over all nodes
    pub fn max_translation(&self) -> f64 {
        self.displacements
            .values()
            .map(|d| (d[0] * d[0] + d[1] * d[1]).sqrt())
            .fold(0.0, f64::max)
    }
}

/// Results of a modal analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalResults {
    /// Natural frequencies in Hz, ascending
    pub frequencies: Vec<f64>,
    /// Mode shapes expanded to all DOFs (ndof x n_modes), restrained rows zero
    shapes: Option<DMatrix<f64>>,
    /// Normalization applied to the shapes
    pub normalization: Normalization,
    node_dofs: HashMap<String, [usize; 3]>,
}

impl ModalResults {
    pub(crate) fn new(
        frequencies: Vec<f64>,
        shapes: Option<DMatrix<f64>>,
        normalization: Normalization,
        node_dofs: HashMap<String, [usize; 3]>,
    ) -> Self {
        Self {
            frequencies,
            shapes,
            normalization,
            node_dofs,
        }
    }

    /// Number of extracted modes
    pub fn n_modes(&self) -> usize {
        self.frequencies.len()
    }

    /// Natural frequency of a mode in Hz
    pub fn frequency(&self, mode: usize) -> Option<f64> {
        self.frequencies.get(mode).copied()
    }

    /// The full mode shape matrix, if shapes were requested
    pub fn shapes(&self) -> Option<&DMatrix<f64>> {
        self.shapes.as_ref()
    }

    /// Mode shape components at a node (ux, uy, rz)
    pub fn shape_at(&self, mode: usize, node: &str) -> Option<[f64; 3]> {
        let shapes = self.shapes.as_ref()?;
        if mode >= shapes.ncols() {
            return None;
        }
        let dofs = self.node_dofs.get(node)?;
        Some([
            shapes[(dofs[0], mode)],
            shapes[(dofs[1], mode)],
            shapes[(dofs[2], mode)],
        ])
    }
}

/// Results of a modal-superposition dynamic analysis.
///
/// Histories are stored in modal coordinates; physical responses are
/// recovered on demand as `u(t) = phi * q(t)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicResults {
    /// Solution time grid
    pub time: Vec<f64>,
    /// Natural frequencies (Hz) of the modes carried in the superposition
    pub frequencies: Vec<f64>,
    /// Modal displacement history (n_modes x n_steps)
    modal_displacement: DMatrix<f64>,
    /// Modal velocity history
    modal_velocity: DMatrix<f64>,
    /// Modal acceleration history
    modal_acceleration: DMatrix<f64>,
    /// Mass-normalized mode shapes (ndof x n_modes)
    shapes: DMatrix<f64>,
    node_dofs: HashMap<String, [usize; 3]>,
}

impl DynamicResults {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        time: Vec<f64>,
        frequencies: Vec<f64>,
        modal_displacement: DMatrix<f64>,
        modal_velocity: DMatrix<f64>,
        modal_acceleration: DMatrix<f64>,
        shapes: DMatrix<f64>,
        node_dofs: HashMap<String, [usize; 3]>,
    ) -> Self {
        Self {
            time,
            frequencies,
            modal_displacement,
            modal_velocity,
            modal_acceleration,
            shapes,
            node_dofs,
        }
    }

    /// Number of time steps in the solution
    pub fn n_steps(&self) -> usize {
        self.time.len()
    }

    /// Modal displacement history (n_modes x n_steps)
    pub fn modal_displacement(&self) -> &DMatrix<f64> {
        &self.modal_displacement
    }

    /// Modal velocity history
    pub fn modal_velocity(&self) -> &DMatrix<f64> {
        &self.modal_velocity
    }

    /// Modal acceleration history
    pub fn modal_acceleration(&self) -> &DMatrix<f64> {
        &self.modal_acceleration
    }

    /// Physical displacement history at a nodal DOF
    pub fn displacement_history(&self, node: &str, dof: Dof) -> Option<Vec<f64>> {
        self.recover(&self.modal_displacement, node, dof)
    }

    /// Physical velocity history at a nodal DOF
    pub fn velocity_history(&self, node: &str, dof: Dof) -> Option<Vec<f64>> {
        self.recover(&self.modal_velocity, node, dof)
    }

    /// Physical acceleration history at a nodal DOF
    pub fn acceleration_history(&self, node: &str, dof: Dof) -> Option<Vec<f64>> {
        self.recover(&self.modal_acceleration, node, dof)
    }

    fn recover(&self, modal: &DMatrix<f64>, node: &str, dof: Dof) -> Option<Vec<f64>> {
        let dofs = self.node_dofs.get(node)?;
        let row = dofs[dof.index()];
        let n_modes = modal.nrows();

        Some(
            (0..modal.ncols())
                .map(|t| {
                    (0..n_modes)
                        .map(|m| self.shapes[(row, m)] * modal[(m, t)])
                        .sum()
                })
                .collect(),
        )
    }
}
