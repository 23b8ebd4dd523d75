//! Model - benchmark structure container

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::elements::{BeamElement, Material, Node, Section, SpringSupport, Support};
use crate::error::{SolverError, SolverResult};

/// Number of degrees of freedom per node (ux, uy, rz)
pub const DOFS_PER_NODE: usize = 3;

/// Nodal degree of freedom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dof {
    /// Horizontal translation
    Ux,
    /// Vertical translation
    Uy,
    /// In-plane rotation
    Rz,
}

impl Dof {
    /// Offset of this DOF within a node's block
    pub fn index(&self) -> usize {
        match self {
            Dof::Ux => 0,
            Dof::Uy => 1,
            Dof::Rz => 2,
        }
    }
}

/// A sampled load time history.
///
/// `time` must be strictly increasing; a single sample describes a constant
/// load. Static analysis uses the value at t = 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadHistory {
    pub time: Vec<f64>,
    pub value: Vec<f64>,
}

impl LoadHistory {
    /// Create a history from matching time and value samples
    pub fn new(time: Vec<f64>, value: Vec<f64>) -> SolverResult<Self> {
        if time.is_empty() || time.len() != value.len() {
            return Err(SolverError::InvalidInput(
                "load history needs matching, non-empty time and value samples".to_string(),
            ));
        }
        if time.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SolverError::InvalidInput(
                "load history time samples must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { time, value })
    }

    /// Constant-amplitude history
    pub fn constant(value: f64) -> Self {
        Self {
            time: vec![0.0],
            value: vec![value],
        }
    }

    /// Amplitude at t = 0 (start of the history)
    pub fn initial_value(&self) -> f64 {
        self.value[0]
    }

    /// Linearly interpolate the history onto a time grid.
    ///
    /// Outside the sampled range the first/last value is held constant.
    pub fn interpolate(&self, grid: &[f64]) -> Vec<f64> {
        grid.iter().map(|&t| self.value_at(t)).collect()
    }

    fn value_at(&self, t: f64) -> f64 {
        let (time, value) = (&self.time, &self.value);
        if t <= time[0] {
            return value[0];
        }
        if t >= time[time.len() - 1] {
            return value[value.len() - 1];
        }
        // time is strictly increasing, so a matching segment exists
        let k = time.partition_point(|&s| s <= t);
        let (t0, t1) = (time[k - 1], time[k]);
        let (v0, v1) = (value[k - 1], value[k]);
        v0 + (v1 - v0) * (t - t0) / (t1 - t0)
    }
}

/// A nodal load with a time history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Load {
    /// Node the load acts on
    pub node: String,
    /// Loaded degree of freedom
    pub dof: Dof,
    /// Load amplitude history
    pub history: LoadHistory,
}

impl Load {
    /// Create a load from a node, DOF and history
    pub fn new(node: &str, dof: Dof, history: LoadHistory) -> Self {
        Self {
            node: node.to_string(),
            dof,
            history,
        }
    }

    /// Create a constant load
    pub fn constant(node: &str, dof: Dof, value: f64) -> Self {
        Self::new(node, dof, LoadHistory::constant(value))
    }
}

/// A lumped mass attached to a node (sensor or auxiliary hardware).
///
/// Acts on the translational DOFs only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointMass {
    /// Mass in kg
    pub mass: f64,
}

impl PointMass {
    pub fn new(mass: f64) -> Self {
        Self { mass }
    }
}

/// The benchmark finite element model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Nodes in the model
    pub nodes: HashMap<String, Node>,
    /// Materials in the model
    pub materials: HashMap<String, Material>,
    /// Sections in the model
    pub sections: HashMap<String, Section>,
    /// Beam elements in the model
    pub elements: HashMap<String, BeamElement>,
    /// Rigid support conditions at nodes
    pub supports: HashMap<String, Support>,
    /// Elastic boundary springs at nodes
    pub springs: HashMap<String, SpringSupport>,
    /// Lumped masses at nodes
    pub masses: HashMap<String, PointMass>,
    /// Nodal loads
    pub loads: Vec<Load>,

    /// Ambient temperature in °C for thermal stiffness scaling
    pub temperature: f64,
    /// Rayleigh damping mass coefficient
    pub alpha: f64,
    /// Rayleigh damping stiffness coefficient
    pub beta: f64,

    /// Node insertion order, fixes the global DOF numbering
    node_order: Vec<String>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            materials: HashMap::new(),
            sections: HashMap::new(),
            elements: HashMap::new(),
            supports: HashMap::new(),
            springs: HashMap::new(),
            masses: HashMap::new(),
            loads: Vec::new(),
            temperature: 20.0,
            alpha: 0.0,
            beta: 0.0,
            node_order: Vec::new(),
        }
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node to the model
    pub fn add_node(&mut self, name: &str, node: Node) -> SolverResult<()> {
        if self.nodes.contains_key(name) {
            return Err(SolverError::DuplicateName(name.to_string()));
        }
        self.nodes.insert(name.to_string(), node);
        self.node_order.push(name.to_string());
        Ok(())
    }

    /// Add a material to the model
    pub fn add_material(&mut self, name: &str, material: Material) -> SolverResult<()> {
        if self.materials.contains_key(name) {
            return Err(SolverError::DuplicateName(name.to_string()));
        }
        self.materials.insert(name.to_string(), material);
        Ok(())
    }

    /// Add a section to the model
    pub fn add_section(&mut self, name: &str, section: Section) -> SolverResult<()> {
        if self.sections.contains_key(name) {
            return Err(SolverError::DuplicateName(name.to_string()));
        }
        self.sections.insert(name.to_string(), section);
        Ok(())
    }

    /// Add a beam element to the model
    pub fn add_element(&mut self, name: &str, element: BeamElement) -> SolverResult<()> {
        if !self.nodes.contains_key(&element.i_node) {
            return Err(SolverError::NodeNotFound(element.i_node.clone()));
        }
        if !self.nodes.contains_key(&element.j_node) {
            return Err(SolverError::NodeNotFound(element.j_node.clone()));
        }
        if !self.materials.contains_key(&element.material) {
            return Err(SolverError::MaterialNotFound(element.material.clone()));
        }
        if !self.sections.contains_key(&element.section) {
            return Err(SolverError::SectionNotFound(element.section.clone()));
        }
        if self.elements.contains_key(name) {
            return Err(SolverError::DuplicateName(name.to_string()));
        }
        if element.stiffness_scale <= 0.0 {
            return Err(SolverError::InvalidInput(format!(
                "stiffness scale of element '{}' must be positive",
                name
            )));
        }

        self.elements.insert(name.to_string(), element);
        Ok(())
    }

    /// Add a rigid support condition
    pub fn add_support(&mut self, node_name: &str, support: Support) -> SolverResult<()> {
        if !self.nodes.contains_key(node_name) {
            return Err(SolverError::NodeNotFound(node_name.to_string()));
        }
        self.supports.insert(node_name.to_string(), support);
        Ok(())
    }

    /// Add an elastic boundary spring
    pub fn add_spring(&mut self, node_name: &str, spring: SpringSupport) -> SolverResult<()> {
        if !self.nodes.contains_key(node_name) {
            return Err(SolverError::NodeNotFound(node_name.to_string()));
        }
        self.springs.insert(node_name.to_string(), spring);
        Ok(())
    }

    /// Attach a lumped mass to a node
    pub fn add_mass(&mut self, node_name: &str, mass: PointMass) -> SolverResult<()> {
        if !self.nodes.contains_key(node_name) {
            return Err(SolverError::NodeNotFound(node_name.to_string()));
        }
        self.masses.insert(node_name.to_string(), mass);
        Ok(())
    }

    /// Add a nodal load
    pub fn add_load(&mut self, load: Load) -> SolverResult<()> {
        if !self.nodes.contains_key(&load.node) {
            return Err(SolverError::NodeNotFound(load.node.clone()));
        }
        self.loads.push(load);
        Ok(())
    }

    /// Set the Rayleigh damping coefficients
    pub fn set_rayleigh_damping(&mut self, alpha: f64, beta: f64) {
        self.alpha = alpha;
        self.beta = beta;
    }

    /// Nodes in DOF numbering order
    pub fn node_order(&self) -> &[String] {
        &self.node_order
    }

    /// Total number of degrees of freedom
    pub fn ndofs(&self) -> usize {
        self.nodes.len() * DOFS_PER_NODE
    }

    /// Find the node nearest to an x position along the girder
    pub fn nearest_node(&self, x: f64) -> Option<&str> {
        self.node_order
            .iter()
            .min_by(|a, b| {
                let da = (self.nodes[*a].x - x).abs();
                let db = (self.nodes[*b].x - x).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|s| s.as_str())
    }
}

/// Global DOF bookkeeping: numbering and free/restrained partitions.
///
/// Mirrors the original backend's `ndof`/`fdof`/`rdof` maps: every node gets
/// a contiguous 3-DOF block in insertion order, and each global DOF belongs
/// to exactly one of the two partitions.
#[derive(Debug, Clone)]
pub struct DofMap {
    index: HashMap<String, [usize; 3]>,
    free: Vec<usize>,
    restrained: Vec<usize>,
    free_pos: Vec<Option<usize>>,
    restrained_pos: Vec<Option<usize>>,
}

impl DofMap {
    /// Build the DOF map for a prepared model
    pub fn build(model: &Model) -> Self {
        let n = model.ndofs();
        let mut index = HashMap::new();
        let mut free = Vec::new();
        let mut restrained = Vec::new();
        let mut free_pos = vec![None; n];
        let mut restrained_pos = vec![None; n];

        for (node_id, name) in model.node_order().iter().enumerate() {
            let base = node_id * DOFS_PER_NODE;
            index.insert(name.clone(), [base, base + 1, base + 2]);

            let flags = model
                .supports
                .get(name)
                .map(|s| s.as_array())
                .unwrap_or([false; 3]);

            for (k, &is_restrained) in flags.iter().enumerate() {
                let dof = base + k;
                if is_restrained {
                    restrained_pos[dof] = Some(restrained.len());
                    restrained.push(dof);
                } else {
                    free_pos[dof] = Some(free.len());
                    free.push(dof);
                }
            }
        }

        Self {
            index,
            free,
            restrained,
            free_pos,
            restrained_pos,
        }
    }

    /// Global DOF indices of a node (ux, uy, rz)
    pub fn node_dofs(&self, name: &str) -> Option<[usize; 3]> {
        self.index.get(name).copied()
    }

    /// Global index of a specific DOF at a node
    pub fn dof(&self, name: &str, dof: Dof) -> Option<usize> {
        self.node_dofs(name).map(|d| d[dof.index()])
    }

    /// Free DOF indices in global order
    pub fn free(&self) -> &[usize] {
        &self.free
    }

    /// Restrained DOF indices in global order
    pub fn restrained(&self) -> &[usize] {
        &self.restrained
    }

    /// Position of a global DOF within the free partition
    pub fn free_position(&self, dof: usize) -> Option<usize> {
        self.free_pos.get(dof).copied().flatten()
    }

    /// Position of a global DOF within the restrained partition
    pub fn restrained_position(&self, dof: usize) -> Option<usize> {
        self.restrained_pos.get(dof).copied().flatten()
    }

    /// Total number of DOFs
    pub fn ndofs(&self) -> usize {
        self.free.len() + self.restrained.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_element_model() -> Model {
        let mut model = Model::new();
        model.add_material("Steel", Material::steel()).unwrap();
        model
            .add_section("Girder", Section::rectangular(0.1, 0.25))
            .unwrap();
        model.add_node("N0", Node::new(0.0, 0.0)).unwrap();
        model.add_node("N1", Node::new(1.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(2.0, 0.0)).unwrap();
        model
            .add_element("E0", BeamElement::new("N0", "N1", "Steel", "Girder"))
            .unwrap();
        model
            .add_element("E1", BeamElement::new("N1", "N2", "Steel", "Girder"))
            .unwrap();
        model
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut model = Model::new();
        model.add_node("N0", Node::new(0.0, 0.0)).unwrap();
        let err = model.add_node("N0", Node::new(1.0, 0.0)).unwrap_err();
        assert!(matches!(err, SolverError::DuplicateName(_)));
    }

    #[test]
    fn test_element_validates_references() {
        let mut model = Model::new();
        model.add_node("N0", Node::new(0.0, 0.0)).unwrap();
        model.add_node("N1", Node::new(1.0, 0.0)).unwrap();

        let err = model
            .add_element("E0", BeamElement::new("N0", "N1", "Steel", "Girder"))
            .unwrap_err();
        assert!(matches!(err, SolverError::MaterialNotFound(_)));
    }

    #[test]
    fn test_dof_map_partitions() {
        let mut model = two_element_model();
        model.add_support("N0", Support::pinned()).unwrap();
        model.add_support("N2", Support::roller()).unwrap();

        let dof_map = DofMap::build(&model);
        assert_eq!(dof_map.ndofs(), 9);
        assert_eq!(dof_map.restrained().len(), 3);
        assert_eq!(dof_map.free().len(), 6);

        // N0 pinned: ux, uy restrained, rz free
        assert_eq!(dof_map.restrained_position(0), Some(0));
        assert_eq!(dof_map.restrained_position(1), Some(1));
        assert!(dof_map.free_position(2).is_some());

        // N1 fully free
        for dof in 3..6 {
            assert!(dof_map.free_position(dof).is_some());
        }
    }

    #[test]
    fn test_nearest_node_snapping() {
        let model = two_element_model();
        assert_eq!(model.nearest_node(0.1), Some("N0"));
        assert_eq!(model.nearest_node(0.9), Some("N1"));
        assert_eq!(model.nearest_node(55.0), Some("N2"));
    }

    #[test]
    fn test_history_interpolation() {
        let history = LoadHistory::new(vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 0.0]).unwrap();
        assert_eq!(history.value_at(0.5), 5.0);
        assert_eq!(history.value_at(1.5), 5.0);
        // Clamped outside the sampled range
        assert_eq!(history.value_at(-1.0), 0.0);
        assert_eq!(history.value_at(9.0), 0.0);
    }

    #[test]
    fn test_history_rejects_unsorted_time() {
        let err = LoadHistory::new(vec![0.0, 2.0, 1.0], vec![0.0, 1.0, 2.0]).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput(_)));
    }
}
