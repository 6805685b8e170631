//! Composed scoring function: terms plus reductions

use crate::{EdgeProfile, ScoreTerm, ScoringError};
use std::fmt;
use std::str::FromStr;

/// Default optimisation temperature (°C) when no `dG` term is configured
pub const DEFAULT_TEMPERATURE_CELSIUS: f64 = 50.0;

/// How evaluated term values combine into an edge weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreReduction {
    /// Sum of all term values
    Sum,
    /// Product of all term values; ignored for a single term
    Product,
}

impl ScoreReduction {
    /// Configuration name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Product => "product",
        }
    }
}

impl FromStr for ScoreReduction {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sum" => Ok(Self::Sum),
            "product" => Ok(Self::Product),
            other => Err(ScoringError::UnknownReduction(other.to_string())),
        }
    }
}

/// Edge weight function built from named terms
///
/// ```
/// use autobreak_scoring::{EdgeProfile, ScoringFunction};
///
/// let scoring = ScoringFunction::parse(&["length", "14"], &["sum"]).unwrap();
/// let profile = EdgeProfile { length: 30, has14: true, ..EdgeProfile::default() };
/// assert_eq!(scoring.evaluate(&profile), 31.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringFunction {
    terms: Vec<ScoreTerm>,
    reductions: Vec<ScoreReduction>,
}

impl ScoringFunction {
    /// Build from already parsed terms and reductions
    ///
    /// # Errors
    /// Empty term or reduction list.
    pub fn new(
        terms: Vec<ScoreTerm>,
        reductions: Vec<ScoreReduction>,
    ) -> Result<Self, ScoringError> {
        if terms.is_empty() {
            return Err(ScoringError::EmptyTerms);
        }
        if reductions.is_empty() {
            return Err(ScoringError::EmptyReductions);
        }
        let mut unique = Vec::with_capacity(reductions.len());
        for r in reductions {
            if !unique.contains(&r) {
                unique.push(r);
            }
        }
        Ok(Self {
            terms,
            reductions: unique,
        })
    }

    /// Parse term strings (`name[:p…]`) and reduction names
    ///
    /// # Errors
    /// Any term or reduction that fails to parse, or an empty list.
    pub fn parse<T, R>(terms: &[T], reductions: &[R]) -> Result<Self, ScoringError>
    where
        T: AsRef<str>,
        R: AsRef<str>,
    {
        let terms = terms
            .iter()
            .flat_map(|t| split_list(t.as_ref()))
            .map(ScoreTerm::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let reductions = reductions
            .iter()
            .flat_map(|r| split_list(r.as_ref()))
            .map(str::parse::<ScoreReduction>)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(terms, reductions)
    }

    /// Parse a comma-separated term list with the `sum` reduction
    ///
    /// # Errors
    /// See [`ScoringFunction::parse`].
    pub fn from_terms(list: &str) -> Result<Self, ScoringError> {
        Self::parse(&[list], &["sum"])
    }

    /// Configured terms in order
    #[inline]
    #[must_use]
    pub fn terms(&self) -> &[ScoreTerm] {
        &self.terms
    }

    /// Configured reductions
    #[inline]
    #[must_use]
    pub fn reductions(&self) -> &[ScoreReduction] {
        &self.reductions
    }

    /// Temperature (°C) used for every profile computation
    ///
    /// Taken from the first `dG` term, else [`DEFAULT_TEMPERATURE_CELSIUS`].
    #[must_use]
    pub fn temperature_celsius(&self) -> f64 {
        self.terms
            .iter()
            .find_map(|t| match t {
                ScoreTerm::LogProbability { temperature } => Some(*temperature),
                _ => None,
            })
            .unwrap_or(DEFAULT_TEMPERATURE_CELSIUS)
    }

    /// Edge weight for one profile
    #[must_use]
    pub fn evaluate(&self, profile: &EdgeProfile) -> f64 {
        let values: Vec<f64> = self.terms.iter().map(|t| t.evaluate(profile)).collect();
        self.reductions
            .iter()
            .map(|r| match r {
                ScoreReduction::Sum => values.iter().sum(),
                ScoreReduction::Product if values.len() > 1 => values.iter().product(),
                ScoreReduction::Product => 0.0,
            })
            .sum()
    }
}

impl Default for ScoringFunction {
    fn default() -> Self {
        Self {
            terms: vec![ScoreTerm::LogProbability {
                temperature: DEFAULT_TEMPERATURE_CELSIUS,
            }],
            reductions: vec![ScoreReduction::Sum],
        }
    }
}

impl fmt::Display for ScoringFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reductions: Vec<&str> = self.reductions.iter().map(|r| r.name()).collect();
        write!(f, "{}(", reductions.join("+"))?;
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{term}")?;
        }
        f.write_str(")")
    }
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> EdgeProfile {
        EdgeProfile {
            length: 30,
            max_tm: 50.0,
            has14: true,
            log_probability: -0.5,
            ..EdgeProfile::default()
        }
    }

    #[test]
    fn default_is_log_probability_at_fifty() {
        let scoring = ScoringFunction::default();
        assert_eq!(scoring.temperature_celsius(), 50.0);
        assert_eq!(scoring.evaluate(&profile()), -0.5);
        assert_eq!(scoring.to_string(), "sum(dG:50)");
    }

    #[test]
    fn product_ignored_for_single_term() {
        let scoring = ScoringFunction::parse(&["length"], &["sum", "product"]).unwrap();
        assert_eq!(scoring.evaluate(&profile()), 30.0);
    }

    #[test]
    fn sum_and_product_combine() {
        let scoring = ScoringFunction::parse(&["length", "Tm"], &["sum,product"]).unwrap();
        assert_eq!(scoring.evaluate(&profile()), 80.0 + 1500.0);
        let product_only = ScoringFunction::parse(&["length,Tm"], &["product"]).unwrap();
        assert_eq!(product_only.evaluate(&profile()), 1500.0);
    }

    #[test]
    fn temperature_follows_dg_term() {
        let scoring = ScoringFunction::from_terms("length, dG:37").unwrap();
        assert_eq!(scoring.temperature_celsius(), 37.0);
    }

    #[test]
    fn rejects_unknown_reduction_and_empty_lists() {
        assert_eq!(
            ScoringFunction::parse(&["length"], &["max"]),
            Err(ScoringError::UnknownReduction("max".into()))
        );
        assert_eq!(
            ScoringFunction::parse::<&str, &str>(&[], &["sum"]),
            Err(ScoringError::EmptyTerms)
        );
        assert_eq!(
            ScoringFunction::parse::<&str, &str>(&["length"], &[]),
            Err(ScoringError::EmptyReductions)
        );
    }
}
