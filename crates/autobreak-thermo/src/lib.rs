//! Autobreak thermodynamics seam
//!
//! The break optimiser never evaluates hybridisation physics itself. It asks a
//! [`Thermodynamics`] provider for four pure quantities:
//!
//! - intrinsic duplex energy of a staple segment ([`DuplexEnergy`])
//! - melting temperature of a segment
//! - loop-closure energy between two segments bound to the scaffold
//! - the concentration (strand association) penalty
//!
//! All energies are kcal/mol, entropies kcal/(mol·K), temperatures Kelvin
//! unless a name says otherwise.
//!
//! [`UniformThermodynamics`] is a coarse, parameterised provider with a single
//! averaged nearest-neighbour step. It keeps the pipeline runnable end to end;
//! a sequence-resolved model plugs in through the same trait.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod uniform;

pub use uniform::UniformThermodynamics;

use serde::{Deserialize, Serialize};

/// Gas constant in kcal/(mol·K)
pub const GAS_CONSTANT: f64 = 1.987_204e-3;

/// Offset between the Celsius and Kelvin scales
pub const KELVIN_OFFSET: f64 = 273.15;

/// Convert °C to K
#[inline]
#[must_use]
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

/// Convert K to °C
#[inline]
#[must_use]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Free energy, enthalpy and entropy of one duplex segment
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DuplexEnergy {
    /// Gibbs free energy at the requested temperature
    pub dg: f64,
    /// Enthalpy
    pub dh: f64,
    /// Entropy
    pub ds: f64,
}

/// Purely entropic contribution (loop closure, concentration)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntropicEnergy {
    /// Gibbs free energy at the requested temperature
    pub dg: f64,
    /// Entropy
    pub ds: f64,
}

/// Scaffold placement of two duplex segments joined by a staple loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopGeometry {
    /// Total scaffold length in nucleotides
    pub scaffold_length: usize,
    /// Mean scaffold position of the upstream segment
    pub first: usize,
    /// Mean scaffold position of the downstream segment
    pub second: usize,
    /// Whether the scaffold is circular
    pub circular: bool,
}

impl LoopGeometry {
    /// Scaffold distance spanned by the loop
    ///
    /// On a circular scaffold the shorter way round is used.
    #[must_use]
    pub fn scaffold_distance(&self) -> usize {
        let direct = self.first.abs_diff(self.second);
        if self.circular && self.scaffold_length > 0 {
            direct.min(self.scaffold_length - direct % self.scaffold_length)
        } else {
            direct
        }
    }
}

/// Sequence thermodynamics consumed by the break optimiser
///
/// Implementations must be pure: identical inputs give identical outputs, so
/// edge profiles can be recomputed per registration offset and across threads.
pub trait Thermodynamics: Send + Sync + std::fmt::Debug {
    /// Intrinsic hybridisation energy of `sequence` (staple 5'→3', upper-case ACGT)
    fn duplex(&self, sequence: &[u8], temperature_kelvin: f64) -> DuplexEnergy;

    /// Melting temperature of `sequence` in °C
    fn melting_temperature(&self, sequence: &[u8]) -> f64;

    /// Loop-closure energy between two adjacent segments of one staple
    fn loop_closure(&self, geometry: LoopGeometry, temperature_kelvin: f64) -> EntropicEnergy;

    /// Concentration-dependent association penalty for one staple
    fn concentration(&self, temperature_kelvin: f64) -> EntropicEnergy;

    /// Provider name (for logs and reports)
    fn name(&self) -> &'static str;
}

impl<T: Thermodynamics + ?Sized> Thermodynamics for &T {
    fn duplex(&self, sequence: &[u8], temperature_kelvin: f64) -> DuplexEnergy {
        (**self).duplex(sequence, temperature_kelvin)
    }

    fn melting_temperature(&self, sequence: &[u8]) -> f64 {
        (**self).melting_temperature(sequence)
    }

    fn loop_closure(&self, geometry: LoopGeometry, temperature_kelvin: f64) -> EntropicEnergy {
        (**self).loop_closure(geometry, temperature_kelvin)
    }

    fn concentration(&self, temperature_kelvin: f64) -> EntropicEnergy {
        (**self).concentration(temperature_kelvin)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_round_trip() {
        assert!((kelvin_to_celsius(celsius_to_kelvin(50.0)) - 50.0).abs() < 1e-12);
        assert!((celsius_to_kelvin(0.0) - 273.15).abs() < 1e-12);
    }

    #[test]
    fn loop_distance_linear() {
        let geometry = LoopGeometry {
            scaffold_length: 100,
            first: 10,
            second: 90,
            circular: false,
        };
        assert_eq!(geometry.scaffold_distance(), 80);
    }

    #[test]
    fn loop_distance_circular_takes_short_way() {
        let geometry = LoopGeometry {
            scaffold_length: 100,
            first: 10,
            second: 90,
            circular: true,
        };
        assert_eq!(geometry.scaffold_distance(), 20);
    }
}
