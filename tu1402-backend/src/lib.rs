//! TU1402 benchmark backend
//!
//! Reads job files describing a configuration of the benchmark structure,
//! runs the requested analysis through `tu1402-solver` and writes tabular
//! result files prefixed with the job name. The graphical front-end only
//! produces job files; everything below that contract lives here.

pub mod builder;
pub mod executor;
pub mod job;
pub mod output;
