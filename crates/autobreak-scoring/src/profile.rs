//! Thermodynamic and structural profile of one break edge

use serde::{Deserialize, Serialize};

/// Everything a scoring term may look at for one staple fragment
///
/// Built by the graph layer from the fragment's duplex segments; the scoring
/// function only reads it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeProfile {
    /// Fragment length in nucleotides
    pub length: usize,
    /// Number of duplex segments
    pub segment_count: usize,
    /// Paired nucleotides over all segments
    pub duplex_length: usize,
    /// Highest segment melting temperature (°C)
    pub max_tm: f64,
    /// Longest duplex segment
    pub max_segment_length: usize,
    /// Some segment is at least 14 nt
    pub has14: bool,
    /// Some segment is at least 16 nt
    pub has16: bool,
    /// Summed intrinsic duplex free energy
    pub dg_intrinsic: f64,
    /// Summed loop-closure free energy
    pub dg_loop: f64,
    /// Concentration term
    pub dg_concentration: f64,
    /// `dg_intrinsic + dg_loop + dg_concentration`
    pub dg_total: f64,
    /// Intrinsic enthalpy
    pub dh_total: f64,
    /// Intrinsic, loop and concentration entropy
    pub ds_total: f64,
    /// Folding probability, `sigmoid(-dG/RT)`
    pub probability: f64,
    /// Natural log of [`Self::probability`]
    pub log_probability: f64,
    /// Estimated folding temperature (°C)
    pub tf: f64,
    /// Structural penalty, `segment_count²`
    pub structure: f64,
}

impl EdgeProfile {
    /// A fragment with no duplex segment cannot hold the staple in place
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.segment_count > 0
    }
}

/// Numerically stable `ln(sigmoid(-x))`, i.e. `-softplus(x)`
#[must_use]
pub fn log_sigmoid_neg(x: f64) -> f64 {
    if x > 0.0 {
        -x - (-x).exp().ln_1p()
    } else {
        -x.exp().ln_1p()
    }
}
