//! Fragment segmentation and edge profile computation
//!
//! A fragment is the stretch of strand nucleotides `[start, start + length)`,
//! wrapping on circular strands. Its duplex segments are the maximal runs of
//! paired nucleotides that stay in one domain and on consecutive scaffold
//! positions.

use crate::design::{Design, Strand};
use crate::types::StrandId;
use autobreak_scoring::{log_sigmoid_neg, EdgeProfile};
use autobreak_thermo::{
    celsius_to_kelvin, kelvin_to_celsius, LoopGeometry, Thermodynamics, GAS_CONSTANT,
};

/// Contiguous duplex region of a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplexSegment {
    /// Scaffold positions in staple order
    pub scaffold_positions: Vec<usize>,
}

impl DuplexSegment {
    /// Paired nucleotide count
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scaffold_positions.len()
    }

    /// Segments are never empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scaffold_positions.is_empty()
    }

    /// Rounded mean scaffold position
    #[must_use]
    pub fn mean_position(&self) -> usize {
        let sum: usize = self.scaffold_positions.iter().sum();
        let n = self.scaffold_positions.len().max(1);
        (sum + n / 2) / n
    }
}

/// Strand nucleotide indices covered by a fragment
fn covered(strand: &Strand, start: usize, length: usize) -> impl Iterator<Item = usize> + '_ {
    let total = strand.length();
    (start..start + length).map(move |i| if strand.is_circular() { i % total } else { i })
}

fn adjacent(a: usize, b: usize, scaffold_length: usize) -> bool {
    (a + 1) % scaffold_length == b || (b + 1) % scaffold_length == a
}

/// Split a fragment into duplex segments
#[must_use]
pub fn duplex_segments(
    design: &Design,
    strand: StrandId,
    start: usize,
    length: usize,
) -> Vec<DuplexSegment> {
    let strand = design.strand(strand);
    let scaffold_length = design.scaffold().len();
    let mut segments: Vec<DuplexSegment> = Vec::new();
    let mut current: Option<(usize, DuplexSegment)> = None;

    for index in covered(strand, start, length) {
        let Some(nucleotide) = strand.nucleotides().get(index) else {
            break;
        };
        match (nucleotide.scaffold_position, current.as_mut()) {
            (Some(p), Some((domain, segment)))
                if *domain == nucleotide.domain
                    && segment
                        .scaffold_positions
                        .last()
                        .is_some_and(|&q| adjacent(q, p, scaffold_length)) =>
            {
                segment.scaffold_positions.push(p);
            }
            (Some(p), _) => {
                if let Some((_, done)) = current.take() {
                    segments.push(done);
                }
                current = Some((
                    nucleotide.domain,
                    DuplexSegment {
                        scaffold_positions: vec![p],
                    },
                ));
            }
            (None, _) => {
                if let Some((_, done)) = current.take() {
                    segments.push(done);
                }
            }
        }
    }
    if let Some((_, done)) = current {
        segments.push(done);
    }
    segments
}

/// Staple sequence of a fragment; unpaired nucleotides render as `?`
#[must_use]
pub fn sequence_text(
    design: &Design,
    strand: StrandId,
    start: usize,
    length: usize,
    offset: usize,
) -> String {
    let scaffold = design.scaffold();
    let s = design.strand(strand);
    covered(s, start, length)
        .filter_map(|i| s.nucleotides().get(i))
        .map(|n| match n.scaffold_position {
            Some(p) => char::from(scaffold.staple_base(p, offset)),
            None => '?',
        })
        .collect()
}

/// Inputs shared by every profile computed for one registration offset
#[derive(Debug, Clone, Copy)]
pub struct ProfileContext<'a> {
    /// Design arena
    pub design: &'a Design,
    /// Sequence thermodynamics
    pub thermo: &'a dyn Thermodynamics,
    /// Optimisation temperature (°C)
    pub temperature_celsius: f64,
    /// Scaffold registration offset
    pub offset: usize,
}

impl ProfileContext<'_> {
    /// Profile of a strand left uncut; circular strands start at their first node
    #[must_use]
    pub fn whole_strand(&self, strand: StrandId) -> EdgeProfile {
        let s = self.design.strand(strand);
        let start = if s.is_circular() {
            s.nodes().first().map_or(0, |n| self.design.node(*n).position)
        } else {
            0
        };
        self.profile(strand, start, s.length())
    }

    /// Thermodynamic and structural profile of one fragment
    #[must_use]
    pub fn profile(&self, strand: StrandId, start: usize, length: usize) -> EdgeProfile {
        let segments = duplex_segments(self.design, strand, start, length);
        let mut profile = EdgeProfile {
            length,
            segment_count: segments.len(),
            ..EdgeProfile::default()
        };
        if segments.is_empty() {
            profile.log_probability = f64::NEG_INFINITY;
            profile.tf = f64::NAN;
            return profile;
        }

        let temperature = celsius_to_kelvin(self.temperature_celsius);
        let scaffold = self.design.scaffold();
        let mut dh = 0.0;
        let mut ds = 0.0;
        let mut max_tm = f64::NEG_INFINITY;
        for segment in &segments {
            let bases: Vec<u8> = segment
                .scaffold_positions
                .iter()
                .map(|&p| scaffold.staple_base(p, self.offset))
                .collect();
            let energy = self.thermo.duplex(&bases, temperature);
            profile.dg_intrinsic += energy.dg;
            dh += energy.dh;
            ds += energy.ds;
            max_tm = max_tm.max(self.thermo.melting_temperature(&bases));
            profile.max_segment_length = profile.max_segment_length.max(segment.len());
            profile.duplex_length += segment.len();
        }
        profile.max_tm = max_tm;

        for pair in segments.windows(2) {
            let geometry = LoopGeometry {
                scaffold_length: scaffold.len(),
                first: pair[0].mean_position(),
                second: pair[1].mean_position(),
                circular: scaffold.is_circular(),
            };
            let energy = self.thermo.loop_closure(geometry, temperature);
            profile.dg_loop += energy.dg;
            ds += energy.ds;
        }

        let concentration = self.thermo.concentration(temperature);
        profile.dg_concentration = concentration.dg;
        ds += concentration.ds;

        profile.dg_total = profile.dg_intrinsic + profile.dg_loop + profile.dg_concentration;
        profile.dh_total = dh;
        profile.ds_total = ds;

        let rt = GAS_CONSTANT * temperature;
        profile.log_probability = log_sigmoid_neg(profile.dg_total / rt);
        profile.probability = profile.log_probability.exp();
        profile.tf = if ds == 0.0 {
            f64::NAN
        } else {
            kelvin_to_celsius(dh / ds)
        };

        profile.has14 = profile.max_segment_length >= 14;
        profile.has16 = profile.max_segment_length >= 16;
        profile.structure = (segments.len() * segments.len()) as f64;
        profile
    }
}
