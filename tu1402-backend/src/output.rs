//! Tabular result writers
//!
//! Every analysis produces whitespace-aligned `.dat` tables prefixed with
//! the job name, the format the original benchmark distributes its results
//! in. Header lines start with `#`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tu1402_solver::model::{Dof, Model};
use tu1402_solver::results::{ModalResults, StaticResults};

use crate::job::JobError;

/// Short label of a nodal DOF, used in column headers and file names
pub fn dof_label(dof: Dof) -> &'static str {
    match dof {
        Dof::Ux => "ux",
        Dof::Uy => "uy",
        Dof::Rz => "rz",
    }
}

fn open(dir: &Path, name: &str, suffix: &str) -> Result<(PathBuf, BufWriter<File>), JobError> {
    let path = dir.join(format!("{}_{}.dat", name, suffix));
    let file = File::create(&path)?;
    Ok((path, BufWriter::new(file)))
}

fn write_header(out: &mut impl Write, name: &str, table: &str) -> Result<(), JobError> {
    writeln!(out, "# job: {}", name)?;
    writeln!(out, "# created: {}", chrono::Utc::now().to_rfc3339())?;
    writeln!(out, "# table: {}", table)?;
    Ok(())
}

/// Write nodal displacements and support reactions of a static analysis
pub fn write_static(
    dir: &Path,
    name: &str,
    model: &Model,
    results: &StaticResults,
) -> Result<PathBuf, JobError> {
    let (path, mut out) = open(dir, name, "static")?;
    write_header(&mut out, name, "static displacements")?;
    writeln!(out, "# columns: node x ux uy rz")?;

    for node in model.node_order() {
        let x = model.nodes[node].x;
        let d = results
            .displacement(node)
            .ok_or_else(|| JobError::Validation(format!("no displacement for node {}", node)))?;
        writeln!(
            out,
            "{:<8} {:>15.6e} {:>15.6e} {:>15.6e} {:>15.6e}",
            node, x, d[0], d[1], d[2]
        )?;
    }

    out.flush()?;
    Ok(path)
}

/// Write support reactions of a static analysis
pub fn write_reactions(
    dir: &Path,
    name: &str,
    model: &Model,
    results: &StaticResults,
) -> Result<PathBuf, JobError> {
    let (path, mut out) = open(dir, name, "reactions")?;
    write_header(&mut out, name, "support reactions")?;
    writeln!(out, "# columns: node x fx fy mz")?;

    for node in model.node_order() {
        if let Some(r) = results.reaction(node) {
            let x = model.nodes[node].x;
            writeln!(
                out,
                "{:<8} {:>15.6e} {:>15.6e} {:>15.6e} {:>15.6e}",
                node, x, r[0], r[1], r[2]
            )?;
        }
    }

    out.flush()?;
    Ok(path)
}

/// Write natural frequencies of a modal analysis
pub fn write_frequencies(
    dir: &Path,
    name: &str,
    results: &ModalResults,
) -> Result<PathBuf, JobError> {
    let (path, mut out) = open(dir, name, "frequencies")?;
    write_header(&mut out, name, "natural frequencies")?;
    writeln!(out, "# columns: mode frequency_hz")?;

    for (i, f) in results.frequencies.iter().enumerate() {
        writeln!(out, "{:<8} {:>15.6e}", i + 1, f)?;
    }

    out.flush()?;
    Ok(path)
}

/// Write mode shapes, one (ux, uy, rz) column triple per mode
pub fn write_modes(
    dir: &Path,
    name: &str,
    model: &Model,
    results: &ModalResults,
) -> Result<PathBuf, JobError> {
    let (path, mut out) = open(dir, name, "modes")?;
    write_header(&mut out, name, "mode shapes")?;

    let mut columns = String::from("# columns: node x");
    for mode in 1..=results.n_modes() {
        columns.push_str(&format!(" ux_{m} uy_{m} rz_{m}", m = mode));
    }
    writeln!(out, "{}", columns)?;

    for node in model.node_order() {
        let x = model.nodes[node].x;
        write!(out, "{:<8} {:>15.6e}", node, x)?;
        for mode in 0..results.n_modes() {
            let shape = results.shape_at(mode, node).ok_or_else(|| {
                JobError::Validation(format!("no shape for node {} in mode {}", node, mode + 1))
            })?;
            write!(
                out,
                " {:>15.6e} {:>15.6e} {:>15.6e}",
                shape[0], shape[1], shape[2]
            )?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(path)
}

/// Write one time history table: a time column plus one column per sensor
pub fn write_history(
    dir: &Path,
    name: &str,
    quantity: &str,
    time: &[f64],
    sensors: &[(String, Vec<f64>)],
) -> Result<PathBuf, JobError> {
    let (path, mut out) = open(dir, name, quantity)?;
    write_header(&mut out, name, quantity)?;

    let mut columns = String::from("# columns: time");
    for (label, _) in sensors {
        columns.push(' ');
        columns.push_str(label);
    }
    writeln!(out, "{}", columns)?;

    for (i, t) in time.iter().enumerate() {
        write!(out, "{:>15.6e}", t)?;
        for (label, series) in sensors {
            let value = series.get(i).ok_or_else(|| {
                JobError::Validation(format!("history of sensor {} is too short", label))
            })?;
            write!(out, " {:>15.6e}", value)?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dof_labels() {
        assert_eq!(dof_label(Dof::Ux), "ux");
        assert_eq!(dof_label(Dof::Uy), "uy");
        assert_eq!(dof_label(Dof::Rz), "rz");
    }
}
