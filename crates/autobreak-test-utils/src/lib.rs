//! Testing utilities for the autobreak workspace
//!
//! Small designs and deterministic thermodynamics providers.

#![allow(missing_docs)]

use autobreak_graph::{
    Design, DesignBuilder, Direction, DomainSpec, SiteKey, StrandSpec,
};
use autobreak_thermo::{DuplexEnergy, EntropicEnergy, LoopGeometry, Thermodynamics};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn site(helix: i32, index: i32) -> SiteKey {
    SiteKey::new(helix, index, Direction::Forward)
}

/// Deterministic pseudo-random ACGT sequence
pub fn scaffold_sequence(length: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..length)
        .map(|_| b"ACGT"[rng.random_range(0..4)] as char)
        .collect()
}

/// One fully paired linear strand with breaks at `positions`
pub fn linear_strand(length: usize, positions: &[usize]) -> Design {
    let mut spec = StrandSpec::new(site(0, -1), vec![DomainSpec::paired(length, 0)]);
    for &p in positions {
        spec = spec.with_break(site(0, p as i32), p);
    }
    let mut builder = DesignBuilder::new(scaffold_sequence(length.max(64) * 2, 1), true);
    builder.add_strand(spec).unwrap();
    builder.build().unwrap()
}

/// One fully paired circular strand with breaks at `positions`
pub fn circular_strand(length: usize, positions: &[usize]) -> Design {
    let mut spec = StrandSpec::new(site(0, -1), vec![DomainSpec::paired(length, 0)]).circular();
    for &p in positions {
        spec = spec.with_break(site(0, p as i32), p);
    }
    let mut builder = DesignBuilder::new(scaffold_sequence(length.max(64) * 2, 2), true);
    builder.add_strand(spec).unwrap();
    builder.build().unwrap()
}

/// Two linear strands of `length` with ends and one shared crossover at `at`
///
/// Site keys: strand `h` (0 or 1) has `site(h, 0)`, `site(h, at)` and
/// `site(h, length)`; `site(0, at)` and `site(1, at)` are neighbors.
pub fn crossover_pair(length: usize, at: usize) -> Design {
    let mut builder = DesignBuilder::new(scaffold_sequence(length * 4, 3), true);
    for helix in 0..2 {
        builder
            .add_strand(
                StrandSpec::new(
                    site(helix, -1),
                    vec![DomainSpec::paired(length, helix as usize * length * 2)],
                )
                .with_break(site(helix, 0), 0)
                .with_crossover(site(helix, at as i32), at)
                .with_break(site(helix, length as i32), length),
            )
            .unwrap();
    }
    builder.add_crossover(site(0, at as i32), site(1, at as i32)).unwrap();
    builder.build().unwrap()
}

/// `helices` linear strands of `length`, breaks every `spacing` nucleotides
///
/// Neighboring helices share crossovers on alternating break sites so every
/// site is paired at most once.
pub fn helix_bundle(helices: usize, length: usize, spacing: usize) -> Design {
    let spacing = spacing.max(1);
    let mut builder = DesignBuilder::new(scaffold_sequence(helices * length + 1, 4), true);
    let positions: Vec<usize> = (0..=length).step_by(spacing).collect();
    for h in 0..helices {
        let helix = h as i32;
        let mut spec = StrandSpec::new(
            site(helix, -1),
            vec![DomainSpec::paired(length, h * length)],
        );
        for &p in &positions {
            let interior = p != 0 && p != length;
            let linked_up = interior && h + 1 < helices && (p / spacing) % 2 == h % 2;
            let linked_down = interior && h > 0 && (p / spacing) % 2 == (h - 1) % 2;
            spec = if linked_up || linked_down {
                spec.with_crossover(site(helix, p as i32), p)
            } else {
                spec.with_break(site(helix, p as i32), p)
            };
        }
        builder.add_strand(spec).unwrap();
    }
    for h in 0..helices.saturating_sub(1) {
        for &p in &positions {
            if p != 0 && p != length && (p / spacing) % 2 == h % 2 {
                let helix = h as i32;
                builder
                    .add_crossover(site(helix, p as i32), site(helix + 1, p as i32))
                    .unwrap();
            }
        }
    }
    builder.build().unwrap()
}

/// Sequence-independent provider: every paired nucleotide contributes equally
#[derive(Debug, Clone, Copy)]
pub struct FixedThermodynamics {
    pub dg_per_nucleotide: f64,
    pub loop_dg: f64,
    pub concentration_dg: f64,
}

impl Default for FixedThermodynamics {
    fn default() -> Self {
        Self {
            dg_per_nucleotide: -1.0,
            loop_dg: 2.0,
            concentration_dg: 3.0,
        }
    }
}

impl Thermodynamics for FixedThermodynamics {
    fn duplex(&self, sequence: &[u8], temperature_kelvin: f64) -> DuplexEnergy {
        let n = sequence.len() as f64;
        let dh = -8.0 * n;
        let dg = self.dg_per_nucleotide * n;
        DuplexEnergy {
            dg,
            dh,
            ds: (dh - dg) / temperature_kelvin,
        }
    }

    fn melting_temperature(&self, sequence: &[u8]) -> f64 {
        2.0 * sequence.len() as f64
    }

    fn loop_closure(&self, _geometry: LoopGeometry, temperature_kelvin: f64) -> EntropicEnergy {
        EntropicEnergy {
            dg: self.loop_dg,
            ds: -self.loop_dg / temperature_kelvin,
        }
    }

    fn concentration(&self, temperature_kelvin: f64) -> EntropicEnergy {
        EntropicEnergy {
            dg: self.concentration_dg,
            ds: -self.concentration_dg / temperature_kelvin,
        }
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// GC-sensitive provider: G/C pairs bind twice as strongly as A/T pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct GcThermodynamics;

impl GcThermodynamics {
    fn counts(sequence: &[u8]) -> (f64, f64) {
        let gc = sequence.iter().filter(|b| matches!(b, b'G' | b'C')).count() as f64;
        (gc, sequence.len() as f64 - gc)
    }
}

impl Thermodynamics for GcThermodynamics {
    fn duplex(&self, sequence: &[u8], temperature_kelvin: f64) -> DuplexEnergy {
        let (gc, at) = Self::counts(sequence);
        let dg = -(gc + 0.5 * at);
        let dh = -8.0 * (gc + at);
        DuplexEnergy {
            dg,
            dh,
            ds: (dh - dg) / temperature_kelvin,
        }
    }

    fn melting_temperature(&self, sequence: &[u8]) -> f64 {
        let (gc, at) = Self::counts(sequence);
        4.0 * gc + 2.0 * at
    }

    fn loop_closure(&self, geometry: LoopGeometry, temperature_kelvin: f64) -> EntropicEnergy {
        let dg = 0.5 * (geometry.scaffold_distance().max(1) as f64).ln();
        EntropicEnergy {
            dg,
            ds: -dg / temperature_kelvin,
        }
    }

    fn concentration(&self, temperature_kelvin: f64) -> EntropicEnergy {
        EntropicEnergy {
            dg: 5.0,
            ds: -5.0 / temperature_kelvin,
        }
    }

    fn name(&self) -> &'static str {
        "gc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffold_sequence_is_deterministic() {
        assert_eq!(scaffold_sequence(50, 9), scaffold_sequence(50, 9));
        assert_ne!(scaffold_sequence(50, 9), scaffold_sequence(50, 10));
        assert!(scaffold_sequence(50, 9).bytes().all(|b| b"ACGT".contains(&b)));
        let long = scaffold_sequence(200, 5);
        assert_eq!(long.len(), 200);
        assert!(b"ACGT".iter().all(|base| long.as_bytes().contains(base)));
    }

    #[test]
    fn helix_bundle_pairs_each_site_once() {
        let design = helix_bundle(4, 84, 7);
        assert_eq!(design.strands().len(), 4);
        assert!(design.crossover_pairs().count() > 0);
        for (a, b) in design.crossover_pairs() {
            assert_eq!(design.neighbor(b), Some(a));
        }
    }

    #[test]
    fn crossover_pair_links_middle_sites() {
        let design = crossover_pair(60, 30);
        let a = design.node_by_key(&site(0, 30)).unwrap();
        let b = design.node_by_key(&site(1, 30)).unwrap();
        assert_eq!(design.neighbor(a), Some(b));
    }
}
