//! Job execution
//!
//! Runs a single job end to end: validate, build the model, run the
//! requested analysis and write the result tables. A failing job is
//! reported, never propagated, so one bad configuration cannot abort a
//! batch.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use tu1402_solver::analysis::{DynamicAnalysis, ModalAnalysis, StaticAnalysis};
use tu1402_solver::model::Model;

use crate::builder;
use crate::job::{AnalysisConfig, Job, JobError, Quantity, SensorConfig};
use crate::output;

/// Outcome of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    Completed,
    Failed,
}

/// Summary of a finished job
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub name: String,
    pub status: JobStatus,
    /// Result files written for this job
    pub files: Vec<PathBuf>,
    pub error: Option<String>,
    pub elapsed_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

/// Runs jobs and writes their result tables into one output directory
#[derive(Debug, Clone)]
pub struct JobExecutor {
    out_dir: PathBuf,
}

impl JobExecutor {
    /// Create an executor writing into the given directory
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// The output directory of this executor
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Execute a job, returning a report instead of an error
    pub fn execute(&self, job: &Job) -> JobReport {
        let started = Instant::now();
        tracing::info!("Starting job '{}'", job.name);

        let (status, files, error) = match self.try_execute(job) {
            Ok(files) => {
                tracing::info!(
                    "Job '{}' completed, {} file(s) written",
                    job.name,
                    files.len()
                );
                (JobStatus::Completed, files, None)
            }
            Err(e) => {
                tracing::error!("Job '{}' failed: {}", job.name, e);
                (JobStatus::Failed, Vec::new(), Some(e.to_string()))
            }
        };

        JobReport {
            name: job.name.clone(),
            status,
            files,
            error,
            elapsed_seconds: started.elapsed().as_secs_f64(),
            timestamp: Utc::now(),
        }
    }

    fn try_execute(&self, job: &Job) -> Result<Vec<PathBuf>, JobError> {
        job.validate()?;
        std::fs::create_dir_all(&self.out_dir)?;

        let model = builder::build_model(job)?;
        tracing::info!(
            "  model: {} nodes, {} elements, {} supports, {} loads",
            model.nodes.len(),
            model.elements.len(),
            model.supports.len() + model.springs.len(),
            model.loads.len()
        );

        match &job.analysis {
            AnalysisConfig::Static => {
                let results = StaticAnalysis::run(&model)?;
                Ok(vec![
                    output::write_static(&self.out_dir, &job.name, &model, &results)?,
                    output::write_reactions(&self.out_dir, &job.name, &model, &results)?,
                ])
            }

            AnalysisConfig::Modal {
                n_modes,
                sigma,
                tolerance,
                normalization,
                return_shapes,
            } => {
                let mut analysis = ModalAnalysis::new()
                    .with_modes(*n_modes)
                    .with_tolerance(*tolerance)
                    .with_normalization(*normalization);
                if let Some(sigma) = sigma {
                    analysis = analysis.with_sigma(*sigma);
                }
                if !return_shapes {
                    analysis = analysis.without_shapes();
                }

                let results = analysis.run(&model)?;
                tracing::info!(
                    "  extracted {} modes, f1 = {:.3} Hz",
                    results.n_modes(),
                    results.frequencies.first().copied().unwrap_or(f64::NAN)
                );

                let mut files =
                    vec![output::write_frequencies(&self.out_dir, &job.name, &results)?];
                if results.shapes().is_some() {
                    files.push(output::write_modes(
                        &self.out_dir,
                        &job.name,
                        &model,
                        &results,
                    )?);
                }
                Ok(files)
            }

            AnalysisConfig::Dynamics { period, step, modes } => {
                let analysis = DynamicAnalysis::new()
                    .with_period(*period)
                    .with_step(*step)
                    .with_modes(*modes);
                let results = analysis.run(&model)?;
                tracing::info!(
                    "  integrated {} steps over {} modes",
                    results.n_steps(),
                    results.frequencies.len()
                );

                let sensors = self.resolve_sensors(job, &model)?;
                let quantities = if job.outputs.quantities.is_empty() {
                    Quantity::all()
                } else {
                    job.outputs.quantities.clone()
                };

                let mut files = Vec::new();
                for quantity in quantities {
                    let mut series = Vec::new();
                    for (node, dof) in &sensors {
                        let history = match quantity {
                            Quantity::Displacement => results.displacement_history(node, *dof),
                            Quantity::Velocity => results.velocity_history(node, *dof),
                            Quantity::Acceleration => results.acceleration_history(node, *dof),
                        }
                        .ok_or_else(|| {
                            JobError::Validation(format!("unknown sensor node {}", node))
                        })?;

                        let label = format!("{}:{}", node, output::dof_label(*dof));
                        series.push((label, history));
                    }

                    files.push(output::write_history(
                        &self.out_dir,
                        &job.name,
                        quantity.label(),
                        &results.time,
                        &series,
                    )?);
                }
                Ok(files)
            }
        }
    }

    /// Snap the requested sensors to mesh nodes; midspan when none are given
    fn resolve_sensors(
        &self,
        job: &Job,
        model: &Model,
    ) -> Result<Vec<(String, tu1402_solver::model::Dof)>, JobError> {
        let requested: Vec<SensorConfig> = if job.outputs.sensors.is_empty() {
            tracing::debug!("no sensors requested, defaulting to midspan");
            vec![SensorConfig {
                position: job.structure.span / 2.0,
                dof: tu1402_solver::model::Dof::Uy,
            }]
        } else {
            job.outputs.sensors.clone()
        };

        requested
            .iter()
            .map(|s| Ok((builder::snap(model, s.position)?, s.dof)))
            .collect()
    }
}
