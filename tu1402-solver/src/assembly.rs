//! Global matrix assembly and free/restrained partitioning

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::elements::{local_mass, local_stiffness, transformation};
use crate::error::{SolverError, SolverResult};
use crate::model::{DofMap, Model};
use crate::sparse::SparseMatrixBuilder;

/// DOF partition selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Free (unknown) DOFs
    Free,
    /// Restrained (supported) DOFs
    Restrained,
}

/// Assembled global system: stiffness and mass in COO form plus the DOF map.
///
/// Partitions are extracted on demand, mirroring the original backend's
/// `getPartitionFF` / `getPartitionFR` / `getPartitionRF` / `getPartitionRR`
/// accessors.
pub struct System {
    dof_map: DofMap,
    k: SparseMatrixBuilder,
    m: SparseMatrixBuilder,
}

impl System {
    /// Assemble the global stiffness and mass matrices for a model
    pub fn assemble(model: &Model) -> SolverResult<Self> {
        let n = model.ndofs();
        if n == 0 {
            return Err(SolverError::InvalidInput(
                "model has no nodes".to_string(),
            ));
        }

        let dof_map = DofMap::build(model);
        let mut k = SparseMatrixBuilder::new(n);
        let mut m = SparseMatrixBuilder::new(n);

        for (name, element) in &model.elements {
            let i_node = model
                .nodes
                .get(&element.i_node)
                .ok_or_else(|| SolverError::NodeNotFound(element.i_node.clone()))?;
            let j_node = model
                .nodes
                .get(&element.j_node)
                .ok_or_else(|| SolverError::NodeNotFound(element.j_node.clone()))?;
            let material = model
                .materials
                .get(&element.material)
                .ok_or_else(|| SolverError::MaterialNotFound(element.material.clone()))?;
            let section = model
                .sections
                .get(&element.section)
                .ok_or_else(|| SolverError::SectionNotFound(element.section.clone()))?;

            let length = i_node.distance_to(j_node);
            if length < 1e-10 {
                return Err(SolverError::InvalidGeometry(format!(
                    "Element '{}' has zero length: i={}, j={}",
                    name, element.i_node, element.j_node
                )));
            }

            // Damage and temperature both act on the elastic stiffness only
            let e = material.e_at(model.temperature) * element.stiffness_scale;

            let k_local = local_stiffness(e, section.a, section.i, length);
            let m_local = local_mass(material.rho, section.a, length);
            let t = transformation(&i_node.coords(), &j_node.coords());

            let k_global = t.transpose() * k_local * t;
            let m_global = t.transpose() * m_local * t;

            let di = dof_map
                .node_dofs(&element.i_node)
                .ok_or_else(|| SolverError::NodeNotFound(element.i_node.clone()))?;
            let dj = dof_map
                .node_dofs(&element.j_node)
                .ok_or_else(|| SolverError::NodeNotFound(element.j_node.clone()))?;
            let dofs = [di[0], di[1], di[2], dj[0], dj[1], dj[2]];

            k.add_element_matrix(&dofs, &k_global);
            m.add_element_matrix(&dofs, &m_global);
        }

        // Boundary springs act on free DOFs only
        for (node_name, spring) in &model.springs {
            let dofs = dof_map
                .node_dofs(node_name)
                .ok_or_else(|| SolverError::NodeNotFound(node_name.clone()))?;
            for (i, &stiffness) in spring.as_array().iter().enumerate() {
                let dof = dofs[i];
                if stiffness > 0.0 && dof_map.free_position(dof).is_some() {
                    k.add(dof, dof, stiffness);
                }
            }
        }

        // Lumped masses on the translational DOFs
        for (node_name, point_mass) in &model.masses {
            let dofs = dof_map
                .node_dofs(node_name)
                .ok_or_else(|| SolverError::NodeNotFound(node_name.clone()))?;
            m.add(dofs[0], dofs[0], point_mass.mass);
            m.add(dofs[1], dofs[1], point_mass.mass);
        }

        log::debug!(
            "assembled system: {} DOFs ({} free), K nnz {}, M nnz {}",
            n,
            dof_map.free().len(),
            k.nnz(),
            m.nnz()
        );

        Ok(Self { dof_map, k, m })
    }

    /// The DOF numbering and partitions
    pub fn dof_map(&self) -> &DofMap {
        &self.dof_map
    }

    /// Extract a dense stiffness partition
    pub fn stiffness_partition(&self, rows: Partition, cols: Partition) -> DMatrix<f64> {
        Self::partition(&self.k, &self.dof_map, rows, cols)
    }

    /// Extract a dense mass partition
    pub fn mass_partition(&self, rows: Partition, cols: Partition) -> DMatrix<f64> {
        Self::partition(&self.m, &self.dof_map, rows, cols)
    }

    fn partition(
        builder: &SparseMatrixBuilder,
        dof_map: &DofMap,
        rows: Partition,
        cols: Partition,
    ) -> DMatrix<f64> {
        let position = |part: Partition, dof: usize| match part {
            Partition::Free => dof_map.free_position(dof),
            Partition::Restrained => dof_map.restrained_position(dof),
        };
        let count = |part: Partition| match part {
            Partition::Free => dof_map.free().len(),
            Partition::Restrained => dof_map.restrained().len(),
        };

        let mut out = DMatrix::zeros(count(rows), count(cols));
        for &(r, c, v) in builder.iter() {
            if let (Some(i), Some(j)) = (position(rows, r), position(cols, c)) {
                out[(i, j)] += v;
            }
        }
        out
    }

    /// The free-free stiffness partition in CSR form, for the sparse solver
    pub fn kff_csr(&self) -> CsrMatrix<f64> {
        let nf = self.dof_map.free().len();
        let mut coo = CooMatrix::new(nf, nf);
        for &(r, c, v) in self.k.iter() {
            if let (Some(i), Some(j)) = (
                self.dof_map.free_position(r),
                self.dof_map.free_position(c),
            ) {
                coo.push(i, j, v);
            }
        }
        CsrMatrix::from(&coo)
    }

    /// Full-order load vector using the amplitude of each history at t = 0
    pub fn initial_load_vector(&self, model: &Model) -> SolverResult<DVector<f64>> {
        let mut f = DVector::zeros(self.dof_map.ndofs());
        for load in &model.loads {
            let dof = self
                .dof_map
                .dof(&load.node, load.dof)
                .ok_or_else(|| SolverError::NodeNotFound(load.node.clone()))?;
            f[dof] += load.history.initial_value();
        }
        Ok(f)
    }

    /// Load distribution matrix Sp (ndof x nloads): one unit column per load
    pub fn distribution_matrix(&self, model: &Model) -> SolverResult<DMatrix<f64>> {
        let mut sp = DMatrix::zeros(self.dof_map.ndofs(), model.loads.len());
        for (j, load) in model.loads.iter().enumerate() {
            let dof = self
                .dof_map
                .dof(&load.node, load.dof)
                .ok_or_else(|| SolverError::NodeNotFound(load.node.clone()))?;
            sp[(dof, j)] = 1.0;
        }
        Ok(sp)
    }

    /// Extract the given partition of a full-order vector
    pub fn gather(&self, full: &DVector<f64>, part: Partition) -> DVector<f64> {
        let indices = match part {
            Partition::Free => self.dof_map.free(),
            Partition::Restrained => self.dof_map.restrained(),
        };
        DVector::from_iterator(indices.len(), indices.iter().map(|&d| full[d]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BeamElement, Material, Node, Section, SpringSupport, Support};
    use crate::model::{Dof, Load};
    use approx::assert_relative_eq;

    fn simple_model() -> Model {
        let mut model = Model::new();
        model.add_material("Steel", Material::steel()).unwrap();
        model
            .add_section("Girder", Section::rectangular(0.1, 0.25))
            .unwrap();
        model.add_node("N0", Node::new(0.0, 0.0)).unwrap();
        model.add_node("N1", Node::new(1.5, 0.0)).unwrap();
        model.add_node("N2", Node::new(3.0, 0.0)).unwrap();
        model
            .add_element("E0", BeamElement::new("N0", "N1", "Steel", "Girder"))
            .unwrap();
        model
            .add_element("E1", BeamElement::new("N1", "N2", "Steel", "Girder"))
            .unwrap();
        model.add_support("N0", Support::pinned()).unwrap();
        model.add_support("N2", Support::roller()).unwrap();
        model
    }

    #[test]
    fn test_partition_dimensions() {
        let model = simple_model();
        let system = System::assemble(&model).unwrap();

        let kff = system.stiffness_partition(Partition::Free, Partition::Free);
        let kfr = system.stiffness_partition(Partition::Free, Partition::Restrained);
        let krf = system.stiffness_partition(Partition::Restrained, Partition::Free);
        let krr = system.stiffness_partition(Partition::Restrained, Partition::Restrained);

        assert_eq!(kff.shape(), (6, 6));
        assert_eq!(kfr.shape(), (6, 3));
        assert_eq!(krf.shape(), (3, 6));
        assert_eq!(krr.shape(), (3, 3));
    }

    #[test]
    fn test_partition_symmetry() {
        let model = simple_model();
        let system = System::assemble(&model).unwrap();

        let kff = system.stiffness_partition(Partition::Free, Partition::Free);
        let kfr = system.stiffness_partition(Partition::Free, Partition::Restrained);
        let krf = system.stiffness_partition(Partition::Restrained, Partition::Free);

        for i in 0..6 {
            for j in 0..6 {
                assert_relative_eq!(kff[(i, j)], kff[(j, i)], epsilon = 1e-6);
            }
        }
        for i in 0..6 {
            for j in 0..3 {
                assert_relative_eq!(kfr[(i, j)], krf[(j, i)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_kff_csr_matches_dense_partition() {
        let model = simple_model();
        let system = System::assemble(&model).unwrap();

        let dense = system.stiffness_partition(Partition::Free, Partition::Free);
        let csr = system.kff_csr();

        let mut from_csr = DMatrix::zeros(dense.nrows(), dense.ncols());
        for (r, c, &v) in csr.triplet_iter() {
            from_csr[(r, c)] += v;
        }

        assert_relative_eq!((dense - from_csr).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spring_on_restrained_dof_ignored() {
        let mut restrained = simple_model();
        restrained
            .add_spring("N0", SpringSupport::vertical(1.0e9))
            .unwrap();

        let plain = System::assemble(&simple_model()).unwrap();
        let sprung = System::assemble(&restrained).unwrap();

        // N0 uy is rigidly restrained, the spring must change nothing
        let diff = (plain.stiffness_partition(Partition::Free, Partition::Free)
            - sprung.stiffness_partition(Partition::Free, Partition::Free))
        .norm();
        assert_relative_eq!(diff, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_load_vector_and_distribution() {
        let mut model = simple_model();
        model
            .add_load(Load::constant("N1", Dof::Uy, -1000.0))
            .unwrap();
        let system = System::assemble(&model).unwrap();

        let f = system.initial_load_vector(&model).unwrap();
        assert_eq!(f[4], -1000.0); // N1 uy is global DOF 4
        assert_eq!(f.iter().filter(|&&v| v != 0.0).count(), 1);

        let sp = system.distribution_matrix(&model).unwrap();
        assert_eq!(sp.shape(), (9, 1));
        assert_eq!(sp[(4, 0)], 1.0);
    }

    #[test]
    fn test_temperature_softens_stiffness() {
        let mut model = simple_model();
        model.materials.get_mut("Steel").unwrap().theta = -4.0e-4;
        model.temperature = 40.0;

        let warm = System::assemble(&model).unwrap();
        model.temperature = 20.0;
        let cold = System::assemble(&model).unwrap();

        let k_warm = warm.stiffness_partition(Partition::Free, Partition::Free);
        let k_cold = cold.stiffness_partition(Partition::Free, Partition::Free);
        let ratio = k_warm[(0, 0)] / k_cold[(0, 0)];
        assert_relative_eq!(ratio, 1.0 - 4.0e-4 * 20.0, epsilon = 1e-12);
    }
}
