//! Uniform-step thermodynamics provider

use crate::{
    kelvin_to_celsius, DuplexEnergy, EntropicEnergy, LoopGeometry, Thermodynamics, GAS_CONSTANT,
};
use serde::{Deserialize, Serialize};

/// Sequence-independent provider: every nearest-neighbour step contributes the
/// same enthalpy and entropy
///
/// Defaults are averages over the unified nearest-neighbour table, a 100 nM
/// staple concentration and a Jacobson–Stockmayer loop exponent of 1.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformThermodynamics {
    /// Duplex initiation enthalpy
    pub initiation_dh: f64,
    /// Duplex initiation entropy
    pub initiation_ds: f64,
    /// Enthalpy per nearest-neighbour step
    pub step_dh: f64,
    /// Entropy per nearest-neighbour step
    pub step_ds: f64,
    /// Staple concentration in mol/L
    pub strand_concentration: f64,
    /// Exponent of the loop entropy term
    pub loop_exponent: f64,
}

impl Default for UniformThermodynamics {
    fn default() -> Self {
        Self {
            initiation_dh: 0.2,
            initiation_ds: -0.0057,
            step_dh: -8.0,
            step_ds: -0.0222,
            strand_concentration: 100e-9,
            loop_exponent: 1.5,
        }
    }
}

impl UniformThermodynamics {
    /// Create provider with default parameters
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With staple concentration (mol/L)
    #[inline]
    #[must_use]
    pub fn with_concentration(mut self, concentration: f64) -> Self {
        self.strand_concentration = concentration;
        self
    }

    fn enthalpy_entropy(&self, length: usize) -> (f64, f64) {
        if length == 0 {
            return (0.0, 0.0);
        }
        let steps = (length - 1) as f64;
        (
            self.initiation_dh + steps * self.step_dh,
            self.initiation_ds + steps * self.step_ds,
        )
    }
}

impl Thermodynamics for UniformThermodynamics {
    fn duplex(&self, sequence: &[u8], temperature_kelvin: f64) -> DuplexEnergy {
        let (dh, ds) = self.enthalpy_entropy(sequence.len());
        DuplexEnergy {
            dg: dh - temperature_kelvin * ds,
            dh,
            ds,
        }
    }

    fn melting_temperature(&self, sequence: &[u8]) -> f64 {
        let (dh, ds) = self.enthalpy_entropy(sequence.len());
        let denominator = ds + GAS_CONSTANT * (self.strand_concentration / 4.0).ln();
        if sequence.is_empty() || denominator == 0.0 {
            return 0.0;
        }
        kelvin_to_celsius(dh / denominator)
    }

    fn loop_closure(&self, geometry: LoopGeometry, temperature_kelvin: f64) -> EntropicEnergy {
        let distance = geometry.scaffold_distance().max(1) as f64;
        let ds = -self.loop_exponent * GAS_CONSTANT * distance.ln();
        EntropicEnergy {
            dg: -temperature_kelvin * ds,
            ds,
        }
    }

    fn concentration(&self, temperature_kelvin: f64) -> EntropicEnergy {
        let ds = GAS_CONSTANT * self.strand_concentration.ln();
        EntropicEnergy {
            dg: -temperature_kelvin * ds,
            ds,
        }
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}
