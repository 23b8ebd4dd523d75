//! Model construction from a job configuration
//!
//! Meshes the girder into equal elements, snaps supports, loads, masses and
//! damage zones to the mesh and hands a ready model to the solver.

use tu1402_solver::elements::{
    BeamElement, Material, Node, Section, SpringSupport, Support,
};
use tu1402_solver::model::{Load, LoadHistory, Model, PointMass};

use crate::job::{Job, JobError, SupportKind};

/// Names of the material and section the builder registers
const GIRDER: &str = "Girder";

/// Build the solver model described by a job
pub fn build_model(job: &Job) -> Result<Model, JobError> {
    let s = &job.structure;
    let mut model = Model::new();

    let material = Material::new(s.material.elastic_modulus, s.material.density)
        .with_thermal_coefficient(s.material.thermal_coefficient);
    model.add_material(GIRDER, material)?;
    model.add_section(GIRDER, Section::rectangular(s.section.width, s.section.height))?;

    model.temperature = s.temperature;
    model.set_rayleigh_damping(job.damping.alpha, job.damping.beta);

    // Uniform mesh along the span
    for i in 0..=s.elements {
        let x = s.span * (i as f64) / (s.elements as f64);
        model.add_node(&node_name(i), Node::new(x, 0.0))?;
    }

    let element_length = s.span / (s.elements as f64);
    for i in 0..s.elements {
        let centroid = (i as f64 + 0.5) * element_length;

        // Overlapping damage zones compound
        let mut scale = 1.0;
        for zone in &s.damage {
            if centroid >= zone.start && centroid <= zone.end {
                scale *= 1.0 - zone.reduction;
            }
        }

        let element = BeamElement::new(&node_name(i), &node_name(i + 1), GIRDER, GIRDER)
            .with_stiffness_scale(scale);
        model.add_element(&format!("E{}", i), element)?;
    }

    for support in &s.supports {
        let node = snap(&model, support.position)?;
        match support.kind {
            SupportKind::Pinned => model.add_support(&node, Support::pinned())?,
            SupportKind::Roller => model.add_support(&node, Support::roller())?,
            SupportKind::Fixed => model.add_support(&node, Support::fixed())?,
            SupportKind::Spring { ku, kv, kr } => {
                model.add_spring(&node, SpringSupport::new(ku, kv, kr))?
            }
        }
    }

    for load in &job.loads {
        let node = snap(&model, load.position)?;
        let history = LoadHistory::new(load.time.clone(), load.value.clone())?;
        model.add_load(Load::new(&node, load.dof, history))?;
    }

    for mass in &s.masses {
        let node = snap(&model, mass.position)?;
        model.add_mass(&node, PointMass::new(mass.mass))?;
    }

    Ok(model)
}

/// Snap a position along the span to the nearest mesh node
pub fn snap(model: &Model, position: f64) -> Result<String, JobError> {
    model
        .nearest_node(position)
        .map(|n| n.to_string())
        .ok_or_else(|| JobError::Validation("model has no nodes to snap to".into()))
}

fn node_name(i: usize) -> String {
    format!("N{}", i)
}
