//! Support conditions

use serde::{Deserialize, Serialize};

/// Rigid support conditions at a node.
///
/// A restrained DOF is removed from the free set and its displacement is
/// prescribed to zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Support {
    /// Restrained in X translation
    pub ux: bool,
    /// Restrained in Y translation
    pub uy: bool,
    /// Restrained in rotation
    pub rz: bool,
}

impl Support {
    /// Create a new support with no restraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fully fixed support (all DOFs restrained)
    pub fn fixed() -> Self {
        Self {
            ux: true,
            uy: true,
            rz: true,
        }
    }

    /// Create a pinned support (translations restrained, rotation free)
    pub fn pinned() -> Self {
        Self {
            ux: true,
            uy: true,
            rz: false,
        }
    }

    /// Create a roller support (vertical translation restrained only)
    pub fn roller() -> Self {
        Self {
            ux: false,
            uy: true,
            rz: false,
        }
    }

    /// Create a support with specific restraints
    pub fn with_restraints(ux: bool, uy: bool, rz: bool) -> Self {
        Self { ux, uy, rz }
    }

    /// Restraint flags as an array ordered (ux, uy, rz)
    pub fn as_array(&self) -> [bool; 3] {
        [self.ux, self.uy, self.rz]
    }

    /// Check if any DOF is restrained
    pub fn is_supported(&self) -> bool {
        self.ux || self.uy || self.rz
    }

    /// Count number of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.as_array().iter().filter(|&&r| r).count()
    }
}

impl Default for Support {
    fn default() -> Self {
        Self {
            ux: false,
            uy: false,
            rz: false,
        }
    }
}

/// Elastic boundary at a node.
///
/// Spring stiffnesses are added to the diagonal of the global stiffness
/// matrix; the benchmark supports its girder on vertical and rotational
/// springs rather than rigid restraints. A spring acting on a rigidly
/// restrained DOF has no effect.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpringSupport {
    /// Horizontal spring stiffness in N/m
    pub ku: f64,
    /// Vertical spring stiffness in N/m
    pub kv: f64,
    /// Rotational spring stiffness in Nm/rad
    pub kr: f64,
}

impl SpringSupport {
    /// Create a spring support with the given stiffnesses
    pub fn new(ku: f64, kv: f64, kr: f64) -> Self {
        Self { ku, kv, kr }
    }

    /// Vertical spring only
    pub fn vertical(kv: f64) -> Self {
        Self {
            ku: 0.0,
            kv,
            kr: 0.0,
        }
    }

    /// Stiffnesses as an array ordered (ku, kv, kr)
    pub fn as_array(&self) -> [f64; 3] {
        [self.ku, self.kv, self.kr]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_support() {
        let support = Support::fixed();
        assert!(support.ux && support.uy && support.rz);
        assert_eq!(support.num_restrained(), 3);
    }

    #[test]
    fn test_pinned_support() {
        let support = Support::pinned();
        assert!(support.ux && support.uy);
        assert!(!support.rz);
        assert_eq!(support.num_restrained(), 2);
    }

    #[test]
    fn test_vertical_spring() {
        let spring = SpringSupport::vertical(1.0e8);
        assert_eq!(spring.as_array(), [0.0, 1.0e8, 0.0]);
    }
}
