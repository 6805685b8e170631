//! Read-only scoring: every strand as one uncut fragment

use crate::controller::AutoBreak;
use autobreak_graph::{ProfileContext, SiteKey, StrandId};
use rayon::prelude::*;
use serde::Serialize;

/// One uncut strand
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnbrokenRecord {
    /// Strand id
    pub strand: StrandId,
    /// Strand 5' key
    pub key: SiteKey,
    /// Strand length
    pub length: usize,
    /// Left out of break optimization
    pub exempt: bool,
    /// Scoring function value
    pub weight: f64,
    /// Folding probability
    pub probability: f64,
    /// Paired nucleotides
    pub duplex_length: usize,
    /// Total free energy (kcal/mol)
    pub dg_total: f64,
    /// Estimated temperature where dG = 0 (°C)
    pub tf: f64,
    /// Highest segment melting temperature (°C)
    pub max_tm: f64,
}

/// Unbroken design under one registration offset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadOnlyScore {
    /// Registration offset
    pub offset: usize,
    /// Per-strand scores in strand id order
    pub strands: Vec<UnbrokenRecord>,
    /// Sum of strand weights
    pub score: f64,
    /// Product of strand probabilities
    pub probability: f64,
    /// Paired nucleotides over all strands
    pub duplex_length: usize,
}

impl ReadOnlyScore {
    /// Score per paired nucleotide; `None` without any duplex
    #[inline]
    #[must_use]
    pub fn normalized_score(&self) -> Option<f64> {
        (self.duplex_length > 0).then(|| self.score / self.duplex_length as f64)
    }
}

impl AutoBreak<'_> {
    /// Score the design uncut under `offset`
    #[must_use]
    pub fn score_offset_unbroken(&self, offset: usize) -> ReadOnlyScore {
        let design = self.design();
        let scoring = self.config().scoring();
        let options = self.config().graph_options();
        let context = ProfileContext {
            design,
            thermo: self.thermo(),
            temperature_celsius: scoring.temperature_celsius(),
            offset,
        };
        let strands: Vec<UnbrokenRecord> = design
            .strands()
            .iter()
            .map(|strand| {
                let profile = context.whole_strand(strand.id());
                UnbrokenRecord {
                    strand: strand.id(),
                    key: strand.key(),
                    length: strand.length(),
                    exempt: options.exempts(strand),
                    weight: scoring.evaluate(&profile),
                    probability: profile.probability,
                    duplex_length: profile.duplex_length,
                    dg_total: profile.dg_total,
                    tf: profile.tf,
                    max_tm: profile.max_tm,
                }
            })
            .collect();

        ReadOnlyScore {
            offset,
            score: strands.iter().map(|s| s.weight).sum(),
            probability: strands.iter().map(|s| s.probability).product(),
            duplex_length: strands.iter().map(|s| s.duplex_length).sum(),
            strands,
        }
    }

    /// Score the design uncut under every offset of the sweep
    ///
    /// Returns every offset in sweep order and the index of the best one:
    /// highest score, ties to the lower offset.
    #[must_use]
    pub fn score_unbroken(&self) -> (Vec<ReadOnlyScore>, Option<usize>) {
        let offsets = self.offsets();
        let scores: Vec<ReadOnlyScore> = if self.config().config().parallel {
            offsets
                .par_iter()
                .map(|o| self.score_offset_unbroken(*o))
                .collect()
        } else {
            offsets
                .iter()
                .map(|o| self.score_offset_unbroken(*o))
                .collect()
        };
        let best = scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.score
                    .total_cmp(&b.score)
                    .then(b.offset.cmp(&a.offset))
            })
            .map(|(i, _)| i);
        if let Some(i) = best {
            tracing::info!(
                offset = scores[i].offset,
                score = scores[i].score,
                offsets = scores.len(),
                "read-only scoring finished"
            );
        }
        (scores, best)
    }
}
