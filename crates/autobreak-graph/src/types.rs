//! Identifiers and keys shared by the graph layer

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// Arena index
            #[inline]
            #[must_use]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

arena_id!(
    /// Index of a strand in its design
    StrandId
);
arena_id!(
    /// Index of a break node in its design
    NodeId
);
arena_id!(
    /// Index of a break edge in its graph
    EdgeId
);
arena_id!(
    /// Index of a strand cluster
    ClusterId
);

/// Strand direction relative to its helix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Direction {
    /// 5'→3' along increasing helix index (`1`)
    Forward,
    /// 5'→3' along decreasing helix index (`-1`)
    Reverse,
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Reverse),
            other => Err(format!("direction must be 1 or -1, got {other}")),
        }
    }
}

/// Structural location of a break site: helix, base index, direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteKey {
    /// Helix number
    pub helix: i32,
    /// Base index along the helix
    pub index: i32,
    /// Strand direction
    pub direction: Direction,
}

impl SiteKey {
    /// Create a key
    #[inline]
    #[must_use]
    pub fn new(helix: i32, index: i32, direction: Direction) -> Self {
        Self {
            helix,
            index,
            direction,
        }
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.helix, self.index, i8::from(self.direction))
    }
}

/// Kind of candidate cut site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Site inside a domain, or a strand end
    #[default]
    Internal,
    /// Site at a crossover shared with another strand
    Crossover,
}

/// Inclusive fragment length window `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LengthWindow {
    /// Shortest admissible fragment
    pub min: usize,
    /// Longest admissible fragment
    pub max: usize,
}

impl LengthWindow {
    /// Create a window; `None` unless `min < max`
    #[must_use]
    pub fn new(min: usize, max: usize) -> Option<Self> {
        (min < max).then_some(Self { min, max })
    }

    /// Whether `length` lies inside the window
    #[inline]
    #[must_use]
    pub fn contains(&self, length: usize) -> bool {
        (self.min..=self.max).contains(&length)
    }
}

impl Default for LengthWindow {
    fn default() -> Self {
        Self { min: 21, max: 60 }
    }
}
