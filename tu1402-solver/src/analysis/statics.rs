//! Linear static analysis

use std::collections::HashMap;

use nalgebra::DVector;

use crate::assembly::{Partition, System};
use crate::error::{SolverError, SolverResult};
use crate::model::{Model, DOFS_PER_NODE};
use crate::results::StaticResults;
use crate::sparse::SparseCholeskySolver;

/// Linear static analysis.
///
/// Solves `Kff * Uf = Ff - Kfr * Ur` with zero prescribed support
/// displacements and recovers reactions as `R = Krf * Uf - Fr`.
pub struct StaticAnalysis;

impl StaticAnalysis {
    /// Run the analysis on a model
    pub fn run(model: &Model) -> SolverResult<StaticResults> {
        let system = System::assemble(model)?;
        let dof_map = system.dof_map();

        if dof_map.free().is_empty() {
            return Err(SolverError::NoFreeDofs);
        }

        let f = system.initial_load_vector(model)?;
        let ff = system.gather(&f, Partition::Free);
        let fr = system.gather(&f, Partition::Restrained);

        // Prescribed support displacements are zero, so the Kfr * Ur term
        // of the partitioned equations vanishes.
        let uf = Self::solve_free(&system, &ff)?;

        // Scatter into the full-order displacement vector
        let mut u = DVector::zeros(dof_map.ndofs());
        for (pos, &dof) in dof_map.free().iter().enumerate() {
            u[dof] = uf[pos];
        }

        // Reactions at the restrained DOFs
        let krf = system.stiffness_partition(Partition::Restrained, Partition::Free);
        let r = &krf * &uf - &fr;

        let mut displacements = HashMap::new();
        let mut reactions = HashMap::new();

        for name in model.node_order() {
            let dofs = dof_map
                .node_dofs(name)
                .ok_or_else(|| SolverError::NodeNotFound(name.clone()))?;
            displacements.insert(name.clone(), [u[dofs[0]], u[dofs[1]], u[dofs[2]]]);

            if let Some(support) = model.supports.get(name) {
                if support.is_supported() {
                    let mut reaction = [0.0; DOFS_PER_NODE];
                    for (k, &dof) in dofs.iter().enumerate() {
                        if let Some(pos) = dof_map.restrained_position(dof) {
                            reaction[k] = r[pos];
                        }
                    }
                    reactions.insert(name.clone(), reaction);
                }
            }
        }

        Ok(StaticResults::new(displacements, reactions))
    }

    /// Solve the free-free system, preferring the sparse skyline path
    fn solve_free(system: &System, ff: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let csr = system.kff_csr();
        let mut solver = SparseCholeskySolver::new(&csr);

        match solver.factorize() {
            Ok(()) => Ok(solver.solve(ff)),
            Err(reason) => {
                log::debug!("skyline factorization failed ({}), using dense LU", reason);
                let kff = system.stiffness_partition(Partition::Free, Partition::Free);
                kff.lu().solve(ff).ok_or(SolverError::SingularMatrix)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BeamElement, Material, Node, Section, Support};
    use crate::model::{Dof, Load};
    use approx::assert_relative_eq;

    /// Cantilever with a tip load: tip deflection P*L^3 / (3*E*I)
    #[test]
    fn test_cantilever_tip_deflection() {
        let mut model = Model::new();
        model.add_material("Steel", Material::steel()).unwrap();
        model
            .add_section("Girder", Section::rectangular(0.1, 0.25))
            .unwrap();

        let length = 4.0;
        let n_elements = 8;
        for i in 0..=n_elements {
            let x = length * (i as f64) / (n_elements as f64);
            model
                .add_node(&format!("N{}", i), Node::new(x, 0.0))
                .unwrap();
        }
        for i in 0..n_elements {
            model
                .add_element(
                    &format!("E{}", i),
                    BeamElement::new(&format!("N{}", i), &format!("N{}", i + 1), "Steel", "Girder"),
                )
                .unwrap();
        }
        model.add_support("N0", Support::fixed()).unwrap();

        let p = -10_000.0;
        model
            .add_load(Load::constant(&format!("N{}", n_elements), Dof::Uy, p))
            .unwrap();

        let results = StaticAnalysis::run(&model).unwrap();

        let e = Material::steel().e;
        let i = Section::rectangular(0.1, 0.25).i;
        let expected = p * length.powi(3) / (3.0 * e * i);

        let tip = results
            .displacement(&format!("N{}", n_elements))
            .unwrap();
        // Hermitian beam elements are nodally exact for point loads
        assert_relative_eq!(tip[1], expected, max_relative = 1e-9);

        // Reaction balances the applied load
        let reaction = results.reaction("N0").unwrap();
        assert_relative_eq!(reaction[1], -p, max_relative = 1e-9);
    }

    #[test]
    fn test_disconnected_node_fails() {
        let mut model = Model::new();
        model.add_material("Steel", Material::steel()).unwrap();
        model
            .add_section("Girder", Section::rectangular(0.1, 0.25))
            .unwrap();
        model.add_node("N0", Node::new(0.0, 0.0)).unwrap();
        model.add_node("N1", Node::new(1.0, 0.0)).unwrap();
        // Not attached to any element and not supported
        model.add_node("N2", Node::new(2.0, 0.0)).unwrap();
        model
            .add_element("E0", BeamElement::new("N0", "N1", "Steel", "Girder"))
            .unwrap();
        model.add_support("N0", Support::fixed()).unwrap();
        model
            .add_load(Load::constant("N1", Dof::Uy, -100.0))
            .unwrap();

        assert!(matches!(
            StaticAnalysis::run(&model),
            Err(SolverError::SingularMatrix)
        ));
    }
}
