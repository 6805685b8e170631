//! Closed set of scoring terms and their lookup table
//!
//! A term is written `name[:p1[:p2]]`. Missing parameters take the defaults
//! from [`TERM_TABLE`]; unknown names are rejected when parsed.

use crate::{EdgeProfile, ScoringError};
use std::fmt;
use std::str::FromStr;

/// Edge quantity a Gaussian term is centred on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Fragment length
    Length,
    /// Highest segment melting temperature
    MaxTm,
    /// Longest duplex segment
    MaxSegment,
}

impl Quantity {
    #[inline]
    fn of(self, profile: &EdgeProfile) -> f64 {
        match self {
            Self::Length => profile.length as f64,
            Self::MaxTm => profile.max_tm,
            Self::MaxSegment => profile.max_segment_length as f64,
        }
    }
}

/// One named scoring term with its resolved parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreTerm {
    /// `14`: 1 if some segment is at least 14 nt
    Has14,
    /// `16`: 1 if some segment is at least 16 nt
    Has16,
    /// `Tm`: highest segment melting temperature
    MaxTm,
    /// `dG`: log folding probability at `temperature` °C
    LogProbability {
        /// Optimisation temperature in °C
        temperature: f64,
    },
    /// `structure`: `factor * segment_count²`
    Structure {
        /// Scale applied to the squared segment count
        factor: f64,
    },
    /// `length`: raw fragment length
    Length,
    /// `maxseq`: 1 if the longest segment reaches `threshold`
    MaxSegment {
        /// Segment length threshold
        threshold: f64,
    },
    /// `glength`, `gTm`, `gmaxseq`: `exp(-(x-μ)²/σ²)`
    Gauss {
        /// Quantity `x`
        quantity: Quantity,
        /// Target `μ`
        mean: f64,
        /// Width `σ`
        tolerance: f64,
    },
    /// `llength`, `lTm`, `lmaxseq`: `-(x-μ)²/σ²`
    LogGauss {
        /// Quantity `x`
        quantity: Quantity,
        /// Target `μ`
        mean: f64,
        /// Width `σ`
        tolerance: f64,
    },
}

/// Table entry mapping a term name to its defaults and constructor
#[derive(Debug, Clone, Copy)]
pub struct TermDescriptor {
    /// Name as written in configuration
    pub name: &'static str,
    /// Default parameter values (also the maximum parameter count)
    pub defaults: &'static [f64],
    /// Whether the second parameter is a Gaussian tolerance
    pub has_tolerance: bool,
    build: fn(&[f64]) -> ScoreTerm,
}

fn gauss(quantity: Quantity, p: &[f64]) -> ScoreTerm {
    ScoreTerm::Gauss {
        quantity,
        mean: p[0],
        tolerance: p[1],
    }
}

fn log_gauss(quantity: Quantity, p: &[f64]) -> ScoreTerm {
    ScoreTerm::LogGauss {
        quantity,
        mean: p[0],
        tolerance: p[1],
    }
}

/// Every scoring term the optimiser knows
pub const TERM_TABLE: &[TermDescriptor] = &[
    TermDescriptor {
        name: "14",
        defaults: &[],
        has_tolerance: false,
        build: |_| ScoreTerm::Has14,
    },
    TermDescriptor {
        name: "16",
        defaults: &[],
        has_tolerance: false,
        build: |_| ScoreTerm::Has16,
    },
    TermDescriptor {
        name: "Tm",
        defaults: &[],
        has_tolerance: false,
        build: |_| ScoreTerm::MaxTm,
    },
    TermDescriptor {
        name: "dG",
        defaults: &[50.0],
        has_tolerance: false,
        build: |p| ScoreTerm::LogProbability { temperature: p[0] },
    },
    TermDescriptor {
        name: "structure",
        defaults: &[1.0],
        has_tolerance: false,
        build: |p| ScoreTerm::Structure { factor: p[0] },
    },
    TermDescriptor {
        name: "length",
        defaults: &[],
        has_tolerance: false,
        build: |_| ScoreTerm::Length,
    },
    TermDescriptor {
        name: "maxseq",
        defaults: &[14.0],
        has_tolerance: false,
        build: |p| ScoreTerm::MaxSegment { threshold: p[0] },
    },
    TermDescriptor {
        name: "glength",
        defaults: &[45.0, 5.0],
        has_tolerance: true,
        build: |p| gauss(Quantity::Length, p),
    },
    TermDescriptor {
        name: "gmaxseq",
        defaults: &[14.0, 2.0],
        has_tolerance: true,
        build: |p| gauss(Quantity::MaxSegment, p),
    },
    TermDescriptor {
        name: "gTm",
        defaults: &[60.0, 5.0],
        has_tolerance: true,
        build: |p| gauss(Quantity::MaxTm, p),
    },
    TermDescriptor {
        name: "llength",
        defaults: &[45.0, 5.0],
        has_tolerance: true,
        build: |p| log_gauss(Quantity::Length, p),
    },
    TermDescriptor {
        name: "lmaxseq",
        defaults: &[14.0, 2.0],
        has_tolerance: true,
        build: |p| log_gauss(Quantity::MaxSegment, p),
    },
    TermDescriptor {
        name: "lTm",
        defaults: &[60.0, 5.0],
        has_tolerance: true,
        build: |p| log_gauss(Quantity::MaxTm, p),
    },
];

/// Look up a term descriptor by configuration name
#[must_use]
pub fn lookup(name: &str) -> Option<&'static TermDescriptor> {
    TERM_TABLE.iter().find(|d| d.name == name)
}

fn known_names() -> String {
    TERM_TABLE
        .iter()
        .map(|d| d.name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ScoreTerm {
    /// Parse `name[:p1[:p2]]`
    ///
    /// # Errors
    /// Unknown name, too many parameters, non-numeric parameter, or a
    /// non-positive Gaussian tolerance.
    pub fn parse(text: &str) -> Result<Self, ScoringError> {
        let mut parts = text.trim().split(':');
        let name = parts.next().unwrap_or_default().trim();
        let descriptor = lookup(name).ok_or_else(|| ScoringError::UnknownTerm {
            name: name.to_string(),
            known: known_names(),
        })?;

        let raw: Vec<&str> = parts.map(str::trim).collect();
        if raw.len() > descriptor.defaults.len() {
            return Err(ScoringError::TooManyParameters {
                name: name.to_string(),
                max: descriptor.defaults.len(),
                given: raw.len(),
            });
        }

        let mut params = descriptor.defaults.to_vec();
        for (slot, value) in params.iter_mut().zip(&raw) {
            *slot = value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ScoringError::InvalidParameter {
                    name: name.to_string(),
                    value: (*value).to_string(),
                })?;
        }

        if descriptor.has_tolerance && params[1] <= 0.0 {
            return Err(ScoringError::NonPositiveTolerance {
                name: name.to_string(),
                tolerance: params[1],
            });
        }

        Ok((descriptor.build)(&params))
    }

    /// Configuration name of this term
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Has14 => "14",
            Self::Has16 => "16",
            Self::MaxTm => "Tm",
            Self::LogProbability { .. } => "dG",
            Self::Structure { .. } => "structure",
            Self::Length => "length",
            Self::MaxSegment { .. } => "maxseq",
            Self::Gauss { quantity, .. } => match quantity {
                Quantity::Length => "glength",
                Quantity::MaxTm => "gTm",
                Quantity::MaxSegment => "gmaxseq",
            },
            Self::LogGauss { quantity, .. } => match quantity {
                Quantity::Length => "llength",
                Quantity::MaxTm => "lTm",
                Quantity::MaxSegment => "lmaxseq",
            },
        }
    }

    /// Resolved parameters in table order
    #[must_use]
    pub fn parameters(&self) -> Vec<f64> {
        match *self {
            Self::Has14 | Self::Has16 | Self::MaxTm | Self::Length => Vec::new(),
            Self::LogProbability { temperature } => vec![temperature],
            Self::Structure { factor } => vec![factor],
            Self::MaxSegment { threshold } => vec![threshold],
            Self::Gauss {
                mean, tolerance, ..
            }
            | Self::LogGauss {
                mean, tolerance, ..
            } => vec![mean, tolerance],
        }
    }

    /// Evaluate the term on one edge profile
    #[must_use]
    pub fn evaluate(&self, profile: &EdgeProfile) -> f64 {
        match *self {
            Self::Has14 => f64::from(u8::from(profile.has14)),
            Self::Has16 => f64::from(u8::from(profile.has16)),
            Self::MaxTm => profile.max_tm,
            Self::LogProbability { .. } => profile.log_probability,
            Self::Structure { factor } => factor * profile.structure,
            Self::Length => profile.length as f64,
            Self::MaxSegment { threshold } => {
                f64::from(u8::from(profile.max_segment_length as f64 >= threshold))
            }
            Self::Gauss {
                quantity,
                mean,
                tolerance,
            } => (-squared_deviation(quantity.of(profile), mean, tolerance)).exp(),
            Self::LogGauss {
                quantity,
                mean,
                tolerance,
            } => -squared_deviation(quantity.of(profile), mean, tolerance),
        }
    }
}

#[inline]
fn squared_deviation(x: f64, mean: f64, tolerance: f64) -> f64 {
    (x - mean).powi(2) / tolerance.powi(2)
}

impl FromStr for ScoreTerm {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScoreTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        for p in self.parameters() {
            write!(f, ":{p}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> EdgeProfile {
        EdgeProfile {
            length: 40,
            segment_count: 2,
            max_tm: 55.0,
            max_segment_length: 16,
            has14: true,
            has16: true,
            log_probability: -0.25,
            structure: 4.0,
            ..EdgeProfile::default()
        }
    }

    #[test]
    fn every_table_entry_parses_with_defaults() {
        for descriptor in TERM_TABLE {
            let term = ScoreTerm::parse(descriptor.name).unwrap();
            assert_eq!(term.name(), descriptor.name);
            assert_eq!(term.parameters(), descriptor.defaults.to_vec());
        }
    }

    #[test]
    fn parameters_override_defaults_in_order() {
        let term = ScoreTerm::parse("glength:40").unwrap();
        assert_eq!(
            term,
            ScoreTerm::Gauss {
                quantity: Quantity::Length,
                mean: 40.0,
                tolerance: 5.0
            }
        );
        assert_eq!(term.to_string(), "glength:40:5");
    }

    #[test]
    fn unknown_name_fails_fast() {
        let err = ScoreTerm::parse("foo").unwrap_err();
        assert!(matches!(err, ScoringError::UnknownTerm { ref name, .. } if name == "foo"));
    }

    #[test]
    fn rejects_extra_and_bad_parameters() {
        assert!(matches!(
            ScoreTerm::parse("14:3"),
            Err(ScoringError::TooManyParameters { max: 0, given: 1, .. })
        ));
        assert!(matches!(
            ScoreTerm::parse("dG:hot"),
            Err(ScoringError::InvalidParameter { .. })
        ));
        assert!(matches!(
            ScoreTerm::parse("gTm:60:0"),
            Err(ScoringError::NonPositiveTolerance { .. })
        ));
    }

    #[test]
    fn evaluates_indicator_and_raw_terms() {
        let p = profile();
        assert_eq!(ScoreTerm::Has14.evaluate(&p), 1.0);
        assert_eq!(ScoreTerm::Length.evaluate(&p), 40.0);
        assert_eq!(ScoreTerm::MaxTm.evaluate(&p), 55.0);
        assert_eq!(ScoreTerm::parse("maxseq:17").unwrap().evaluate(&p), 0.0);
        assert_eq!(ScoreTerm::parse("maxseq").unwrap().evaluate(&p), 1.0);
        assert_eq!(ScoreTerm::parse("dG").unwrap().evaluate(&p), -0.25);
        assert_eq!(ScoreTerm::parse("structure:0.5").unwrap().evaluate(&p), 2.0);
    }

    #[test]
    fn gaussian_terms_peak_at_mean() {
        let p = profile();
        let at_mean = ScoreTerm::parse("glength:40:5").unwrap().evaluate(&p);
        let off_mean = ScoreTerm::parse("glength:45:5").unwrap().evaluate(&p);
        assert!((at_mean - 1.0).abs() < 1e-12);
        assert!((off_mean - (-1.0f64).exp()).abs() < 1e-12);
        let log_off = ScoreTerm::parse("llength:45:5").unwrap().evaluate(&p);
        assert!((log_off + 1.0).abs() < 1e-12);
    }
}
