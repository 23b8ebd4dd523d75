//! Dynamic analysis by modal superposition
//!
//! Integrates the modal equations of motion with the Newmark scheme
//! (beta = 1/6, gamma = 1/2) under Rayleigh-damped modal coordinates.

use std::collections::HashMap;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::analysis::ModalAnalysis;
use crate::assembly::System;
use crate::error::{SolverError, SolverResult};
use crate::model::Model;
use crate::results::DynamicResults;

const NEWMARK_BETA: f64 = 1.0 / 6.0;
const NEWMARK_GAMMA: f64 = 0.5;

/// Dynamic analysis settings and entry point.
///
/// Defaults match the original backend: one second of response at a 0.1 s
/// increment, superposing ten modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicAnalysis {
    /// Simulation time period in seconds
    pub period: f64,
    /// Solution time increment in seconds
    pub step: f64,
    /// Number of modes carried in the superposition
    pub modes: usize,
}

impl Default for DynamicAnalysis {
    fn default() -> Self {
        Self {
            period: 1.0,
            step: 0.1,
            modes: 10,
        }
    }
}

impl DynamicAnalysis {
    /// Create an analysis with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the simulation time period
    pub fn with_period(mut self, period: f64) -> Self {
        self.period = period;
        self
    }

    /// Set the solution time increment
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Set the number of superposed modes
    pub fn with_modes(mut self, modes: usize) -> Self {
        self.modes = modes;
        self
    }

    /// Run the analysis on a model
    pub fn run(&self, model: &Model) -> SolverResult<DynamicResults> {
        if self.period <= 0.0 {
            return Err(SolverError::InvalidInput(
                "time period must be positive".to_string(),
            ));
        }
        if self.step <= 0.0 {
            return Err(SolverError::InvalidInput(
                "increment size must be positive".to_string(),
            ));
        }

        // Mass-normalized modes turn the modal mass matrix into the identity
        let modal = ModalAnalysis::new().with_modes(self.modes).run(model)?;
        let shapes = modal
            .shapes()
            .ok_or_else(|| {
                SolverError::AnalysisFailed("modal analysis returned no shapes".to_string())
            })?
            .clone();
        let frequencies = modal.frequencies.clone();
        let n_modes = frequencies.len();

        let f_max = *frequencies
            .last()
            .ok_or_else(|| SolverError::AnalysisFailed("no modes extracted".to_string()))?;

        // Resolve the shortest carried period with at least ten increments
        let mut h = self.step;
        let limit = 0.1 * (1.0 / f_max);
        if h > limit {
            log::debug!(
                "increment {} too coarse for mode at {:.3} Hz, clamped to {}",
                self.step,
                f_max,
                limit
            );
            h = limit;
        }

        let n_steps = (self.period / h).ceil() as usize;
        let time: Vec<f64> = (0..=n_steps).map(|i| i as f64 * h).collect();
        let nt = time.len();

        // Interpolate the load histories onto the solution grid
        let mut load_matrix = DMatrix::zeros(model.loads.len(), nt);
        for (i, load) in model.loads.iter().enumerate() {
            for (j, value) in load.history.interpolate(&time).into_iter().enumerate() {
                load_matrix[(i, j)] = value;
            }
        }

        // Modal force vector: phi' * Sp * L(t)
        let system = System::assemble(model)?;
        let sp = system.distribution_matrix(model)?;
        let frc = shapes.transpose() * &sp * &load_matrix;

        // Modal system with Rayleigh damping ratios
        let omegas: Vec<f64> = frequencies
            .iter()
            .map(|f| 2.0 * std::f64::consts::PI * f)
            .collect();
        let damping: Vec<f64> = frequencies
            .iter()
            .map(|f| {
                model.alpha / (4.0 * std::f64::consts::PI * f)
                    + model.beta * std::f64::consts::PI * f
            })
            .collect();

        let k_mat = DMatrix::from_diagonal(&nalgebra::DVector::from_iterator(
            n_modes,
            omegas.iter().map(|w| w * w),
        ));
        let c_mat = DMatrix::from_diagonal(&nalgebra::DVector::from_iterator(
            n_modes,
            omegas.iter().zip(&damping).map(|(w, z)| 2.0 * z * w),
        ));
        let m_mat = DMatrix::identity(n_modes, n_modes);

        let (beta, gamma) = (NEWMARK_BETA, NEWMARK_GAMMA);

        let mut dsp = DMatrix::zeros(n_modes, nt);
        let mut vlc = DMatrix::zeros(n_modes, nt);
        let mut acc = DMatrix::zeros(n_modes, nt);

        // At rest initially, so the starting acceleration is the modal force
        acc.set_column(0, &frc.column(0).clone_owned());

        let a1 = &m_mat * (1.0 / (beta * h * h)) + &c_mat * (gamma / (beta * h));
        let a2 = &m_mat * (1.0 / (beta * h)) + &c_mat * (gamma / beta - 1.0);
        let a3 = &m_mat * (1.0 / (2.0 * beta) - 1.0) + &c_mat * (h * (gamma / (2.0 * beta) - 1.0));
        let ki = (&k_mat + &a1).try_inverse().ok_or_else(|| {
            SolverError::AnalysisFailed("effective stiffness is singular".to_string())
        })?;

        let c1 = gamma / (beta * h);
        let c2 = 1.0 - gamma / beta;
        let c3 = h * (1.0 - gamma / (2.0 * beta));
        let c4 = 1.0 / (beta * h * h);
        let c5 = -1.0 / (beta * h);
        let c6 = -(1.0 / (2.0 * beta) - 1.0);

        for j in 0..nt - 1 {
            let d_prev = dsp.column(j).clone_owned();
            let v_prev = vlc.column(j).clone_owned();
            let a_prev = acc.column(j).clone_owned();
            let f_next = frc.column(j + 1).clone_owned();

            let efrc = &a1 * &d_prev + &a2 * &v_prev + &a3 * &a_prev;
            let d_next = &ki * (&f_next + &efrc);

            let delta = &d_next - &d_prev;
            let v_next = &delta * c1 + &v_prev * c2 + &a_prev * c3;
            let a_next = &delta * c4 + &v_prev * c5 + &a_prev * c6;

            dsp.set_column(j + 1, &d_next);
            vlc.set_column(j + 1, &v_next);
            acc.set_column(j + 1, &a_next);
        }

        let mut node_dofs = HashMap::new();
        for name in model.node_order() {
            if let Some(dofs) = system.dof_map().node_dofs(name) {
                node_dofs.insert(name.clone(), dofs);
            }
        }

        Ok(DynamicResults::new(
            time,
            frequencies,
            dsp,
            vlc,
            acc,
            shapes,
            node_dofs,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StaticAnalysis;
    use crate::elements::{BeamElement, Material, Node, Section, Support};
    use crate::model::{Dof, Load, LoadHistory};
    use approx::assert_relative_eq;

    fn beam_model(n_elements: usize) -> Model {
        let mut model = Model::new();
        model.add_material("Steel", Material::steel()).unwrap();
        model
            .add_section("Girder", Section::rectangular(0.1, 0.25))
            .unwrap();

        let length = 6.0;
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
        model.add_support("N0", Support::pinned()).unwrap();
        model
            .add_support(&format!("N{}", n_elements), Support::roller())
            .unwrap();
        model
    }

    #[test]
    fn test_settings_validation() {
        let model = beam_model(8);

        let err = DynamicAnalysis::new()
            .with_period(-1.0)
            .run(&model)
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput(_)));

        let err = DynamicAnalysis::new()
            .with_step(0.0)
            .run(&model)
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput(_)));
    }

    #[test]
    fn test_step_clamped_to_highest_mode() {
        let mut model = beam_model(8);
        model
            .add_load(Load::constant("N4", Dof::Uy, -1000.0))
            .unwrap();

        let results = DynamicAnalysis::new()
            .with_period(0.05)
            .with_step(0.05)
            .with_modes(4)
            .run(&model)
            .unwrap();

        let f_max = *results.frequencies.last().unwrap();
        let h = results.time[1] - results.time[0];
        assert!(h <= 0.1 / f_max + 1e-12);
        // Grid covers the requested period
        assert!(*results.time.last().unwrap() >= 0.05);
    }

    /// A suddenly applied constant load converges on the static deflection
    /// once damping has eaten the transient.
    #[test]
    fn test_damped_step_load_settles_at_static_deflection() {
        let mut model = beam_model(12);
        let midspan = "N6";
        model
            .add_load(Load::new(
                midspan,
                Dof::Uy,
                LoadHistory::constant(-10_000.0),
            ))
            .unwrap();

        let statics = StaticAnalysis::run(&model).unwrap();
        let expected = statics.displacement(midspan).unwrap()[1];

        // First natural frequency sets the damping scale
        let f1 = ModalAnalysis::new().run(&model).unwrap().frequencies[0];
        // alpha = 4*pi*f1*zeta gives zeta = 20% in the first mode
        model.set_rayleigh_damping(4.0 * std::f64::consts::PI * f1 * 0.2, 0.0);

        let period = 30.0 / f1;
        let results = DynamicAnalysis::new()
            .with_period(period)
            .with_step(period / 4000.0)
            .with_modes(6)
            .run(&model)
            .unwrap();

        let history = results.displacement_history(midspan, Dof::Uy).unwrap();
        let settled = *history.last().unwrap();

        assert_relative_eq!(settled, expected, max_relative = 0.02);
    }

    /// Undamped response to a step load overshoots to about twice the
    /// static deflection.
    #[test]
    fn test_undamped_overshoot() {
        let mut model = beam_model(12);
        let midspan = "N6";
        model
            .add_load(Load::constant(midspan, Dof::Uy, -10_000.0))
            .unwrap();

        let statics = StaticAnalysis::run(&model).unwrap();
        let expected = statics.displacement(midspan).unwrap()[1];

        let f1 = ModalAnalysis::new().run(&model).unwrap().frequencies[0];
        let period = 2.0 / f1;
        let results = DynamicAnalysis::new()
            .with_period(period)
            .with_step(period / 2000.0)
            .with_modes(6)
            .run(&model)
            .unwrap();

        let history = results.displacement_history(midspan, Dof::Uy).unwrap();
        let peak = history.iter().cloned().fold(0.0, f64::min);

        // Dynamic amplification factor of an undamped step response is 2
        assert_relative_eq!(peak, 2.0 * expected, max_relative = 0.05);
    }
}
