//! Error types for the solver

use thiserror::Error;

/// Main error type for solver operations
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Node '{0}' not found in model")]
    NodeNotFound(String),

    #[error("Element '{0}' not found in model")]
    ElementNotFound(String),

    #[error("Material '{0}' not found in model")]
    MaterialNotFound(String),

    #[error("Section '{0}' not found in model")]
    SectionNotFound(String),

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Model has no free degrees of freedom")]
    NoFreeDofs,

    #[error("Singular stiffness matrix - model may be unstable or have insufficient supports")]
    SingularMatrix,

    #[error("Mass matrix is not positive definite")]
    IndefiniteMass,

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for solver operations
pub type SolverResult<T> = Result<T, SolverError>;
