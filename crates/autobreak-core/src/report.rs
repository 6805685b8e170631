//! Export records for the selected solution
//!
//! Plain serialisable rows; writing them anywhere is up to the caller.

use crate::controller::{BreakOutcome, OffsetScore};
use autobreak_graph::{BreakKind, ClusterId, EdgeId, SiteKey};
use serde::Serialize;
use std::fmt;

/// One chosen fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRecord {
    /// Strand 5' key
    pub strand: SiteKey,
    /// Cluster of the strand
    pub cluster: ClusterId,
    /// Upstream cut
    pub from: SiteKey,
    /// Upstream cut kind
    pub from_kind: BreakKind,
    /// Downstream cut
    pub to: SiteKey,
    /// Downstream cut kind
    pub to_kind: BreakKind,
    /// Fragment length
    pub length: usize,
    /// Staple sequence, `?` for unpaired nucleotides
    pub sequence: String,
    /// Scoring function value
    pub weight: f64,
    /// Folding probability
    pub probability: f64,
    /// Natural log of the folding probability
    pub log_probability: f64,
    /// Estimated folding temperature (°C)
    pub tf: f64,
    /// Highest segment melting temperature (°C)
    pub max_tm: f64,
    /// Longest duplex segment
    pub max_segment_length: usize,
    /// Some segment is at least 14 nt
    pub has14: bool,
    /// Total free energy (kcal/mol)
    pub dg_total: f64,
    /// Intrinsic duplex part of `dg_total`
    pub dg_intrinsic: f64,
    /// Loop-closure part of `dg_total`
    pub dg_loop: f64,
    /// Concentration part of `dg_total`
    pub dg_concentration: f64,
}

/// Headline numbers of the selected solution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionSummary {
    /// Registration offset
    pub offset: usize,
    /// Optimisation temperature (°C)
    pub temperature_celsius: f64,
    /// Scoring function, as configured
    pub scoring: String,
    /// Total score
    pub score: f64,
    /// Total penalty
    pub penalty: usize,
    /// Paired nucleotides over all fragments
    pub duplex_length: usize,
    /// Product of cluster probabilities
    pub probability: f64,
    /// Score per paired nucleotide
    pub normalized_score: Option<f64>,
    /// Every cluster complete
    pub complete: bool,
    /// Sum of fragment free energies (kcal/mol)
    pub free_energy: f64,
    /// Clusters
    pub clusters: usize,
    /// Strands that received a path
    pub strands: usize,
    /// Fragments over all strands
    pub fragments: usize,
}

impl fmt::Display for SolutionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "offset:        {}", self.offset)?;
        writeln!(f, "scoring:       {} at {:.1} °C", self.scoring, self.temperature_celsius)?;
        writeln!(f, "score:         {:.4}", self.score)?;
        match self.normalized_score {
            Some(n) => writeln!(f, "normalized:    {n:.6}")?,
            None => writeln!(f, "normalized:    undefined")?,
        }
        writeln!(f, "penalty:       {}", self.penalty)?;
        writeln!(f, "probability:   {:.6e}", self.probability)?;
        writeln!(f, "free energy:   {:.2} kcal/mol", self.free_energy)?;
        writeln!(f, "duplex length: {}", self.duplex_length)?;
        write!(
            f,
            "fragments:     {} over {} strands in {} clusters",
            self.fragments, self.strands, self.clusters
        )
    }
}

/// Everything the caller exports after a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakReport {
    /// Selected solution
    pub summary: SolutionSummary,
    /// Every offset tried
    pub offsets: Vec<OffsetScore>,
    /// Chosen fragments, strand by strand
    pub edges: Vec<EdgeRecord>,
}

impl BreakReport {
    /// Collect records from a finished run
    #[must_use]
    pub fn new(outcome: &BreakOutcome<'_>) -> Self {
        let graph = &outcome.graph;
        let design = graph.design();
        let best = &outcome.best;

        let record = |cluster: ClusterId, id: EdgeId| {
            let edge = graph.edge(id);
            let (from, to) = (design.node(edge.from), design.node(edge.to));
            let p = &edge.profile;
            EdgeRecord {
                strand: design.strand(edge.strand).key(),
                cluster,
                from: from.key,
                from_kind: from.kind,
                to: to.key,
                to_kind: to.kind,
                length: edge.length,
                sequence: graph.sequence(id),
                weight: edge.weight,
                probability: p.probability,
                log_probability: p.log_probability,
                tf: p.tf,
                max_tm: p.max_tm,
                max_segment_length: p.max_segment_length,
                has14: p.has14,
                dg_total: p.dg_total,
                dg_intrinsic: p.dg_intrinsic,
                dg_loop: p.dg_loop,
                dg_concentration: p.dg_concentration,
            }
        };
        let edges: Vec<EdgeRecord> = best
            .groups
            .iter()
            .flat_map(|g| g.chosen().flat_map(move |s| s.edges.iter().map(move |e| (g.cluster, *e))))
            .map(|(cluster, id)| record(cluster, id))
            .collect();

        let summary = SolutionSummary {
            offset: best.offset,
            temperature_celsius: graph.temperature_celsius(),
            scoring: graph.scoring().to_string(),
            score: best.score,
            penalty: best.penalty,
            duplex_length: best.duplex_length,
            probability: best.probability,
            normalized_score: best.normalized_score(),
            complete: best.complete,
            free_energy: best.total_free_energy(graph),
            clusters: best.groups.len(),
            strands: best.solutions().count(),
            fragments: edges.len(),
        };
        Self {
            summary,
            offsets: outcome.offsets.clone(),
            edges,
        }
    }

    /// Pretty JSON
    ///
    /// # Errors
    /// Serialization failure.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
