//! Analyses run by the benchmark backend
//!
//! Three analyses mirror the original backend: linear static, eigenvalue
//! extraction and modal-superposition dynamics. Each takes an immutable
//! model and returns a result struct.

mod dynamics;
mod modal;
mod statics;

pub use dynamics::DynamicAnalysis;
pub use modal::{ModalAnalysis, Normalization};
pub use statics::StaticAnalysis;
