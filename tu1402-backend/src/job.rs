//! Job configuration
//!
//! A job file is the contract between the front-end and this backend: a
//! JSON document naming the run, parameterizing the benchmark structure and
//! selecting one analysis. Files are hand-editable; every optional field
//! has the benchmark default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use tu1402_solver::analysis::Normalization;
use tu1402_solver::error::SolverError;
use tu1402_solver::model::Dof;

/// Errors raised while reading, validating or running a job
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Job file error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

/// A single benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Job name; all result files are prefixed with it
    pub name: String,
    /// Benchmark structure parameters
    pub structure: StructureConfig,
    /// Nodal loads with time histories
    #[serde(default)]
    pub loads: Vec<LoadConfig>,
    /// The analysis to run
    pub analysis: AnalysisConfig,
    /// Requested result outputs
    #[serde(default)]
    pub outputs: OutputConfig,
    /// Rayleigh damping coefficients
    #[serde(default)]
    pub damping: DampingConfig,
}

impl Job {
    /// Read a job from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, JobError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a job from a JSON string
    pub fn from_json(content: &str) -> Result<Self, JobError> {
        let job: Job = serde_json::from_str(content)?;
        Ok(job)
    }

    /// Check the configuration before building a model from it
    pub fn validate(&self) -> Result<(), JobError> {
        if self.name.is_empty() {
            return Err(JobError::Validation("job name must not be empty".into()));
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(JobError::Validation(format!(
                "job name '{}' may only contain letters, digits, '_' and '-'",
                self.name
            )));
        }

        self.structure.validate()?;

        for (i, load) in self.loads.iter().enumerate() {
            if load.time.is_empty() || load.time.len() != load.value.len() {
                return Err(JobError::Validation(format!(
                    "load {} needs matching, non-empty time and value samples",
                    i
                )));
            }
        }

        match &self.analysis {
            AnalysisConfig::Static => {}
            AnalysisConfig::Modal { n_modes, .. } => {
                if *n_modes == 0 {
                    return Err(JobError::Validation(
                        "modal analysis needs at least one mode".into(),
                    ));
                }
            }
            AnalysisConfig::Dynamics { period, step, modes } => {
                if *period <= 0.0 {
                    return Err(JobError::Validation("time period must be positive".into()));
                }
                if *step <= 0.0 {
                    return Err(JobError::Validation(
                        "increment size must be positive".into(),
                    ));
                }
                if *modes == 0 {
                    return Err(JobError::Validation(
                        "dynamic analysis needs at least one mode".into(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Parameters of the benchmark girder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Span of the girder in m
    pub span: f64,
    /// Number of equal beam elements along the span
    pub elements: usize,
    /// Rectangular cross section
    pub section: SectionConfig,
    /// Material parameters
    pub material: MaterialConfig,
    /// Ambient temperature in °C
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Support conditions along the span
    pub supports: Vec<SupportConfig>,
    /// Damage zones (stiffness reductions)
    #[serde(default)]
    pub damage: Vec<DamageZone>,
    /// Attached lumped masses
    #[serde(default)]
    pub masses: Vec<MassConfig>,
}

impl StructureConfig {
    fn validate(&self) -> Result<(), JobError> {
        if self.span <= 0.0 {
            return Err(JobError::Validation("span must be positive".into()));
        }
        if self.elements == 0 {
            return Err(JobError::Validation(
                "the girder needs at least one element".into(),
            ));
        }
        if self.section.width <= 0.0 || self.section.height <= 0.0 {
            return Err(JobError::Validation(
                "section dimensions must be positive".into(),
            ));
        }
        if self.material.elastic_modulus <= 0.0 || self.material.density <= 0.0 {
            return Err(JobError::Validation(
                "material properties must be positive".into(),
            ));
        }
        if self.supports.is_empty() {
            return Err(JobError::Validation(
                "the structure needs at least one support".into(),
            ));
        }
        for support in &self.supports {
            if support.position < 0.0 || support.position > self.span {
                return Err(JobError::Validation(format!(
                    "support position {} lies outside the span",
                    support.position
                )));
            }
        }
        for zone in &self.damage {
            if zone.start >= zone.end {
                return Err(JobError::Validation(format!(
                    "damage zone [{}, {}] is empty",
                    zone.start, zone.end
                )));
            }
            if zone.reduction <= 0.0 || zone.reduction >= 1.0 {
                return Err(JobError::Validation(format!(
                    "damage reduction {} must lie in (0, 1)",
                    zone.reduction
                )));
            }
        }
        for mass in &self.masses {
            if mass.mass <= 0.0 {
                return Err(JobError::Validation("masses must be positive".into()));
            }
        }
        Ok(())
    }
}

/// Rectangular cross section dimensions in m
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SectionConfig {
    pub width: f64,
    pub height: f64,
}

/// Material parameters of the girder
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MaterialConfig {
    /// Young's modulus in Pa
    pub elastic_modulus: f64,
    /// Density in kg/m³
    pub density: f64,
    /// Relative stiffness change per °C
    #[serde(default)]
    pub thermal_coefficient: f64,
}

/// A support along the span, snapped to the nearest node
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SupportConfig {
    /// Position along the span in m
    pub position: f64,
    /// Kind of support
    pub kind: SupportKind,
}

/// Rigid or elastic support
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SupportKind {
    Pinned,
    Roller,
    Fixed,
    /// Boundary springs; absent stiffnesses leave the DOF free
    Spring {
        #[serde(default)]
        ku: f64,
        #[serde(default)]
        kv: f64,
        #[serde(default)]
        kr: f64,
    },
}

/// A stiffness reduction over a stretch of the girder.
///
/// Elements whose centroid falls inside `[start, end]` lose `reduction`
/// of their elastic stiffness; overlapping zones compound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DamageZone {
    pub start: f64,
    pub end: f64,
    pub reduction: f64,
}

/// A lumped mass at a position along the span
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MassConfig {
    pub position: f64,
    pub mass: f64,
}

/// A nodal load with a sampled time history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Position along the span in m, snapped to the nearest node
    pub position: f64,
    /// Loaded degree of freedom
    #[serde(default = "default_dof")]
    pub dof: Dof,
    /// Time samples in s, strictly increasing
    pub time: Vec<f64>,
    /// Load amplitudes in N (or Nm for rotations)
    pub value: Vec<f64>,
}

/// The analysis a job runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisConfig {
    /// Linear static analysis
    Static,
    /// Eigenvalue extraction
    Modal {
        #[serde(default = "default_one")]
        n_modes: usize,
        #[serde(default)]
        sigma: Option<f64>,
        #[serde(default)]
        tolerance: f64,
        #[serde(default)]
        normalization: Normalization,
        #[serde(default = "default_true")]
        return_shapes: bool,
    },
    /// Modal-superposition time integration
    Dynamics {
        period: f64,
        step: f64,
        #[serde(default = "default_ten")]
        modes: usize,
    },
}

/// Requested result outputs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Sensor positions for time history outputs; midspan when empty
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
    /// Time history quantities to write; all three when empty
    #[serde(default)]
    pub quantities: Vec<Quantity>,
}

/// A response sensor at a position along the span
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorConfig {
    pub position: f64,
    #[serde(default = "default_dof")]
    pub dof: Dof,
}

/// Time history quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Displacement,
    Velocity,
    Acceleration,
}

impl Quantity {
    /// All quantities, the default output request
    pub fn all() -> Vec<Quantity> {
        vec![
            Quantity::Displacement,
            Quantity::Velocity,
            Quantity::Acceleration,
        ]
    }

    /// File name component for this quantity
    pub fn label(&self) -> &'static str {
        match self {
            Quantity::Displacement => "displacement",
            Quantity::Velocity => "velocity",
            Quantity::Acceleration => "acceleration",
        }
    }
}

/// Rayleigh damping coefficients
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DampingConfig {
    #[serde(default)]
    pub alpha: f64,
    #[serde(default)]
    pub beta: f64,
}

fn default_temperature() -> f64 {
    20.0
}

fn default_dof() -> Dof {
    Dof::Uy
}

fn default_one() -> usize {
    1
}

fn default_ten() -> usize {
    10
}

fn default_true() -> bool {
    true
}
