//! Run configuration
//!
//! [`BreakConfig`] is the serialisable form (TOML files, builder calls);
//! [`BreakConfig::validate`] turns it into a [`ValidatedConfig`] holding the
//! parsed scoring function and length window.

use crate::error::ConfigError;
use autobreak_graph::{GraphOptions, LengthWindow, PickPolicy};
use autobreak_scoring::ScoringFunction;
use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Registration offsets to evaluate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OffsetSweep {
    /// A single offset
    Fixed {
        /// Offset into the scaffold sequence
        offset: usize,
    },
    /// `count` consecutive offsets from `start`
    Sequential {
        /// First offset
        start: usize,
        /// Number of offsets, capped at the scaffold length
        count: usize,
    },
    /// Every offset of the scaffold
    All,
    /// `count` distinct offsets drawn with the run seed
    Random {
        /// Sample size, capped at the scaffold length
        count: usize,
    },
    /// Explicit offsets
    List {
        /// Offsets, reduced modulo the scaffold length
        offsets: Vec<usize>,
    },
}

impl Default for OffsetSweep {
    fn default() -> Self {
        Self::Fixed { offset: 0 }
    }
}

impl OffsetSweep {
    fn check(&self) -> Result<(), ConfigError> {
        match self {
            Self::Sequential { count: 0, .. } | Self::Random { count: 0 } => Err(
                ConfigError::InvalidOffsets("offset count must be at least 1".to_string()),
            ),
            Self::List { offsets } if offsets.is_empty() => Err(ConfigError::InvalidOffsets(
                "offset list is empty".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Concrete offsets for a scaffold of `scaffold_length` nucleotides
    ///
    /// Offsets are distinct and reduced modulo the scaffold length. Random
    /// samples are drawn from `seed` and returned in ascending order.
    #[must_use]
    pub fn resolve(&self, scaffold_length: usize, seed: u64) -> Vec<usize> {
        let length = scaffold_length.max(1);
        match self {
            Self::Fixed { offset } => vec![offset % length],
            Self::Sequential { start, count } => (0..(*count).min(length))
                .map(|i| (start + i) % length)
                .collect(),
            Self::All => (0..length).collect(),
            Self::Random { count } => {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut sample =
                    rand::seq::index::sample(&mut rng, length, (*count).min(length)).into_vec();
                sample.sort_unstable();
                sample
            }
            Self::List { offsets } => offsets
                .iter()
                .map(|o| o % length)
                .collect::<IndexSet<_>>()
                .into_iter()
                .collect(),
        }
    }
}

/// Break run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakConfig {
    /// Shortest admissible fragment
    pub min_length: usize,
    /// Longest admissible fragment
    pub max_length: usize,
    /// Scoring terms, `name:param:...`; entries may hold comma-separated lists
    pub score_terms: Vec<String>,
    /// Reductions combining the term values (`sum`, `product`)
    pub score_reduction: Vec<String>,
    /// Candidate paths generated per strand (K)
    pub solutions_per_strand: usize,
    /// Combination attempts per cluster
    pub group_solutions: usize,
    /// Shuffle strand order on attempts after the first
    pub shuffle_strands: bool,
    /// Pool pick policy during K-best search
    pub k_select: PickPolicy,
    /// Candidate pick policy on shuffled group attempts
    pub group_pick: PickPolicy,
    /// Seed for every random choice of the run
    pub seed: u64,
    /// Strands shorter than this are never broken
    pub dont_break_below: usize,
    /// Registration offsets to evaluate
    pub offsets: OffsetSweep,
    /// Solve offsets and clusters on the rayon pool
    pub parallel: bool,
}

impl Default for BreakConfig {
    fn default() -> Self {
        Self {
            min_length: 21,
            max_length: 60,
            score_terms: vec!["dG:50".to_string()],
            score_reduction: vec!["sum".to_string()],
            solutions_per_strand: 10,
            group_solutions: 10,
            shuffle_strands: true,
            k_select: PickPolicy::Best,
            group_pick: PickPolicy::Best,
            seed: 0,
            dont_break_below: 0,
            offsets: OffsetSweep::default(),
            parallel: true,
        }
    }
}

impl BreakConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fragment length window
    #[inline]
    #[must_use]
    pub fn with_window(mut self, min_length: usize, max_length: usize) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    /// Set scoring terms
    #[must_use]
    pub fn with_score_terms<S: Into<String>>(mut self, terms: impl IntoIterator<Item = S>) -> Self {
        self.score_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    /// Set reductions
    #[must_use]
    pub fn with_score_reduction<S: Into<String>>(
        mut self,
        reductions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.score_reduction = reductions.into_iter().map(Into::into).collect();
        self
    }

    /// Set K
    #[inline]
    #[must_use]
    pub fn with_solutions_per_strand(mut self, k: usize) -> Self {
        self.solutions_per_strand = k;
        self
    }

    /// Set combination attempts per cluster
    #[inline]
    #[must_use]
    pub fn with_group_solutions(mut self, attempts: usize) -> Self {
        self.group_solutions = attempts;
        self
    }

    /// Enable or disable strand shuffling
    #[inline]
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle_strands = shuffle;
        self
    }

    /// Set the K-best and group pick policies
    #[inline]
    #[must_use]
    pub fn with_pick(mut self, k_select: PickPolicy, group_pick: PickPolicy) -> Self {
        self.k_select = k_select;
        self.group_pick = group_pick;
        self
    }

    /// Set the run seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Leave strands shorter than `length` unbroken
    #[inline]
    #[must_use]
    pub fn with_dont_break_below(mut self, length: usize) -> Self {
        self.dont_break_below = length;
        self
    }

    /// Set the offset sweep
    #[inline]
    #[must_use]
    pub fn with_offsets(mut self, offsets: OffsetSweep) -> Self {
        self.offsets = offsets;
        self
    }

    /// Enable or disable rayon parallelism
    #[inline]
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse TOML text; missing fields take their defaults
    ///
    /// # Errors
    /// [`ConfigError::Toml`] on syntax or type errors.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] when the file cannot be read, [`ConfigError::Toml`]
    /// when it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Check every field and parse the scoring function
    ///
    /// # Errors
    /// The first configuration problem found.
    pub fn validate(mut self) -> Result<ValidatedConfig, ConfigError> {
        let window = LengthWindow::new(self.min_length, self.max_length).ok_or(
            ConfigError::InvalidWindow {
                min: self.min_length,
                max: self.max_length,
            },
        )?;
        if self.solutions_per_strand == 0 {
            return Err(ConfigError::ZeroSolutions {
                field: "solutions_per_strand",
            });
        }
        if self.group_solutions == 0 {
            return Err(ConfigError::ZeroSolutions {
                field: "group_solutions",
            });
        }
        self.offsets.check()?;
        let scoring = ScoringFunction::parse(&self.score_terms, &self.score_reduction)?;

        if !self.shuffle_strands && self.group_solutions > 1 {
            tracing::debug!(
                group_solutions = self.group_solutions,
                "strand shuffling disabled, one group attempt is enough"
            );
            self.group_solutions = 1;
        }

        Ok(ValidatedConfig {
            options: GraphOptions {
                window,
                dont_break_below: self.dont_break_below,
            },
            scoring,
            config: self,
        })
    }
}

/// Configuration that passed [`BreakConfig::validate`]
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    config: BreakConfig,
    scoring: ScoringFunction,
    options: GraphOptions,
}

impl ValidatedConfig {
    /// Validated settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BreakConfig {
        &self.config
    }

    /// Parsed scoring function
    #[inline]
    #[must_use]
    pub fn scoring(&self) -> &ScoringFunction {
        &self.scoring
    }

    /// Graph build options
    #[inline]
    #[must_use]
    pub fn graph_options(&self) -> GraphOptions {
        self.options
    }
}
