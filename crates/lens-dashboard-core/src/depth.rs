//! Dependency depth options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How far a lens expands: 1, 2, 3 hops, or unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthOption {
    #[serde(rename = "1")]
    One,
    #[default]
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "all")]
    All,
}

impl DepthOption {
    /// Every option in cycle order.
    pub const CYCLE: [Self; 4] = [Self::One, Self::Two, Self::Three, Self::All];

    /// Next option in the 1 → 2 → 3 → All → 1 cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::Three,
            Self::Three => Self::All,
            Self::All => Self::One,
        }
    }

    /// Hop count, `None` when unbounded.
    #[must_use]
    pub const fn level(self) -> Option<usize> {
        match self {
            Self::One => Some(1),
            Self::Two => Some(2),
            Self::Three => Some(3),
            Self::All => None,
        }
    }

    /// Tree depth bound, with `unbounded` standing in for All.
    #[must_use]
    pub const fn max_depth(self, unbounded: usize) -> usize {
        match self.level() {
            Some(level) => level,
            None => unbounded,
        }
    }

    /// Map a numeric level to an option. Anything outside 1..=3 is All.
    #[must_use]
    pub const fn from_level(level: i64) -> Self {
        match level {
            1 => Self::One,
            2 => Self::Two,
            3 => Self::Three,
            _ => Self::All,
        }
    }

    /// Position in [`Self::CYCLE`], used to index per-depth tables.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
            Self::All => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::All => "All",
        }
    }
}

impl fmt::Display for DepthOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepthOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" => Ok(Self::One),
            "2" => Ok(Self::Two),
            "3" => Ok(Self::Three),
            "all" | "inf" | "∞" | "-1" => Ok(Self::All),
            other => Err(Error::InvalidDepth(other.to_string())),
        }
    }
}
