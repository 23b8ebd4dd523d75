//! Plane-frame beam element (Euler-Bernoulli)
//!
//! Local DOF ordering per node: (ux, uy, rz), giving a 6x6 element matrix
//! for the 2-node element.

use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};

/// 6x6 matrix for element stiffness/mass
pub type Mat6 = SMatrix<f64, 6, 6>;

/// A 2-node Euler-Bernoulli plane-frame element.
///
/// `stiffness_scale` multiplies the elastic stiffness only; the consistent
/// mass is unaffected. Damage scenarios of the benchmark reduce it below 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamElement {
    /// i-node name (start)
    pub i_node: String,
    /// j-node name (end)
    pub j_node: String,
    /// Material name
    pub material: String,
    /// Section name
    pub section: String,
    /// Elastic stiffness modifier, 1.0 for the undamaged state
    pub stiffness_scale: f64,
}

impl BeamElement {
    /// Create a new element between two nodes
    pub fn new(i_node: &str, j_node: &str, material: &str, section: &str) -> Self {
        Self {
            i_node: i_node.to_string(),
            j_node: j_node.to_string(),
            material: material.to_string(),
            section: section.to_string(),
            stiffness_scale: 1.0,
        }
    }

    /// Set the elastic stiffness modifier
    pub fn with_stiffness_scale(mut self, scale: f64) -> Self {
        self.stiffness_scale = scale;
        self
    }
}

/// Compute the local stiffness matrix for a plane-frame element
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `a` - Cross-sectional area
/// * `i` - Moment of inertia
/// * `length` - Element length
pub fn local_stiffness(e: f64, a: f64, i: f64, length: f64) -> Mat6 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = e * a / l;
    let ei_l3 = e * i / l3;
    let ei_l2 = e * i / l2;
    let ei_l = e * i / l;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at i
        ea_l,   0.0,          0.0,         -ea_l,  0.0,          0.0,
        // Row 1: shear at i
        0.0,    12.0*ei_l3,   6.0*ei_l2,   0.0,    -12.0*ei_l3,  6.0*ei_l2,
        // Row 2: moment at i
        0.0,    6.0*ei_l2,    4.0*ei_l,    0.0,    -6.0*ei_l2,   2.0*ei_l,
        // Row 3: axial at j
        -ea_l,  0.0,          0.0,         ea_l,   0.0,          0.0,
        // Row 4: shear at j
        0.0,    -12.0*ei_l3,  -6.0*ei_l2,  0.0,    12.0*ei_l3,   -6.0*ei_l2,
        // Row 5: moment at j
        0.0,    6.0*ei_l2,    2.0*ei_l,    0.0,    -6.0*ei_l2,   4.0*ei_l,
    ];

    Mat6::from_row_slice(&data)
}

/// Compute the consistent mass matrix for a plane-frame element
///
/// Combines the axial (rho*A*L/6) and bending (rho*A*L/420) consistent
/// formulations of the Euler-Bernoulli element.
///
/// # Arguments
/// * `rho` - Material density
/// * `a` - Cross-sectional area
/// * `length` - Element length
pub fn local_mass(rho: f64, a: f64, length: f64) -> Mat6 {
    let l = length;
    let l2 = l * l;

    let ma = rho * a * l / 6.0;
    let mb = rho * a * l / 420.0;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at i
        2.0*ma,  0.0,          0.0,           ma,      0.0,          0.0,
        // Row 1: transverse at i
        0.0,     156.0*mb,     22.0*mb*l,     0.0,     54.0*mb,      -13.0*mb*l,
        // Row 2: rotation at i
        0.0,     22.0*mb*l,    4.0*mb*l2,     0.0,     13.0*mb*l,    -3.0*mb*l2,
        // Row 3: axial at j
        ma,      0.0,          0.0,           2.0*ma,  0.0,          0.0,
        // Row 4: transverse at j
        0.0,     54.0*mb,      13.0*mb*l,     0.0,     156.0*mb,     -22.0*mb*l,
        // Row 5: rotation at j
        0.0,     -13.0*mb*l,   -3.0*mb*l2,    0.0,     -22.0*mb*l,   4.0*mb*l2,
    ];

    Mat6::from_row_slice(&data)
}

/// Compute the transformation matrix for a plane-frame element
///
/// # Arguments
/// * `i_node` - Start node coordinates [X, Y]
/// * `j_node` - End node coordinates [X, Y]
///
/// # Returns
/// 6x6 transformation matrix from global to local coordinates
pub fn transformation(i_node: &[f64; 2], j_node: &[f64; 2]) -> Mat6 {
    let dx = j_node[0] - i_node[0];
    let dy = j_node[1] - i_node[1];
    let length = (dx * dx + dy * dy).sqrt();

    let c = dx / length;
    let s = dy / length;

    #[rustfmt::skip]
    let data = [
        c,    s,    0.0,  0.0,  0.0,  0.0,
        -s,   c,    0.0,  0.0,  0.0,  0.0,
        0.0,  0.0,  1.0,  0.0,  0.0,  0.0,
        0.0,  0.0,  0.0,  c,    s,    0.0,
        0.0,  0.0,  0.0,  -s,   c,    0.0,
        0.0,  0.0,  0.0,  0.0,  0.0,  1.0,
    ];

    Mat6::from_row_slice(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stiffness_symmetry() {
        let k = local_stiffness(210e9, 0.025, 1.3e-4, 0.2);

        for i in 0..6 {
            for j in 0..6 {
                assert_relative_eq!(k[(i, j)], k[(j, i)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_mass_symmetry_and_total() {
        let rho = 7850.0;
        let a = 0.025;
        let l = 0.2;
        let m = local_mass(rho, a, l);

        for i in 0..6 {
            for j in 0..6 {
                assert_relative_eq!(m[(i, j)], m[(j, i)], epsilon = 1e-9);
            }
        }

        // Translational mass adds up to rho*A*L in each direction
        let total = rho * a * l;
        let axial: f64 = [(0, 0), (0, 3), (3, 0), (3, 3)]
            .iter()
            .map(|&(i, j)| m[(i, j)])
            .sum();
        assert_relative_eq!(axial, total, epsilon = 1e-9);

        let transverse: f64 = [(1, 1), (1, 4), (4, 1), (4, 4)]
            .iter()
            .map(|&(i, j)| m[(i, j)])
            .sum();
        assert_relative_eq!(transverse, total, epsilon = 1e-9);
    }

    #[test]
    fn test_transformation_horizontal() {
        let t = transformation(&[0.0, 0.0], &[2.0, 0.0]);
        // For a horizontal element local x = global X
        assert_relative_eq!(t[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(t[(0, 1)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transformation_vertical() {
        let t = transformation(&[0.0, 0.0], &[0.0, 2.0]);
        // For a vertical element local x = global Y
        assert_relative_eq!(t[(0, 1)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(t[(1, 0)], -1.0, epsilon = 1e-12);
    }
}
