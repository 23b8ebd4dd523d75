//! TU1402 Solver - finite element core for the TU1402 SHM benchmark
//!
//! This library models the TU1402 COST Action case-study structure as a
//! 2D plane frame and provides the three analyses the benchmark backend
//! runs:
//! - Linear static analysis
//! - Modal (eigenvalue) analysis with mass or displacement normalization
//! - Dynamic analysis by modal superposition (Newmark scheme)
//!
//! ## Example
//! ```rust
//! use tu1402_solver::prelude::*;
//!
//! let mut model = Model::new();
//!
//! // Add material and section
//! model.add_material("Steel", Material::steel()).unwrap();
//! model.add_section("Girder", Section::rectangular(0.1, 0.25)).unwrap();
//!
//! // Add nodes
//! model.add_node("N0", Node::new(0.0, 0.0)).unwrap();
//! model.add_node("N1", Node::new(3.0, 0.0)).unwrap();
//! model.add_node("N2", Node::new(6.0, 0.0)).unwrap();
//!
//! // Add elements
//! model.add_element("E0", BeamElement::new("N0", "N1", "Steel", "Girder")).unwrap();
//! model.add_element("E1", BeamElement::new("N1", "N2", "Steel", "Girder")).unwrap();
//!
//! // Supports
//! model.add_support("N0", Support::pinned()).unwrap();
//! model.add_support("N2", Support::roller()).unwrap();
//!
//! // Midspan load
//! model.add_load(Load::constant("N1", Dof::Uy, -1000.0)).unwrap();
//!
//! // Analyze
//! let results = StaticAnalysis::run(&model).unwrap();
//! let midspan = results.displacement("N1").unwrap();
//! assert!(midspan[1] < 0.0);
//! ```

pub mod analysis;
pub mod assembly;
pub mod elements;
pub mod error;
pub mod model;
pub mod results;
pub mod sparse;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{DynamicAnalysis, ModalAnalysis, Normalization, StaticAnalysis};
    pub use crate::elements::{BeamElement, Material, Node, Section, SpringSupport, Support};
    pub use crate::error::{SolverError, SolverResult};
    pub use crate::model::{Dof, Load, LoadHistory, Model, PointMass};
    pub use crate::results::{DynamicResults, ModalResults, StaticResults};
}
