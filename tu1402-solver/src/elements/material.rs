//! Material properties

use serde::{Deserialize, Serialize};

/// Material properties for the benchmark structure.
///
/// The SHM thermal scenarios scale the modulus of elasticity linearly with
/// the ambient temperature; `theta` is the relative stiffness change per
/// degree Celsius relative to the reference temperature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity (Young's modulus) in Pa at reference temperature
    pub e: f64,
    /// Density in kg/m³
    pub rho: f64,
    /// Relative stiffness change per °C (negative: softer when warmer)
    pub theta: f64,
    /// Reference temperature in °C
    pub reference_temperature: f64,
}

impl Material {
    /// Create a new material with given properties
    pub fn new(e: f64, rho: f64) -> Self {
        Self {
            e,
            rho,
            theta: 0.0,
            reference_temperature: 20.0,
        }
    }

    /// Attach a thermal stiffness coefficient
    pub fn with_thermal_coefficient(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    /// Modulus of elasticity at the given ambient temperature
    pub fn e_at(&self, temperature: f64) -> f64 {
        self.e * (1.0 + self.theta * (temperature - self.reference_temperature))
    }

    /// Create a standard structural steel material
    pub fn steel() -> Self {
        Self {
            e: 210e9,      // 210 GPa
            rho: 7850.0,   // kg/m³
            theta: 0.0,
            reference_temperature: 20.0,
        }
    }

    /// Create a standard concrete material
    pub fn concrete() -> Self {
        Self {
            e: 30e9,       // 30 GPa
            rho: 2400.0,   // kg/m³
            theta: 0.0,
            reference_temperature: 20.0,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel()
    }
}
