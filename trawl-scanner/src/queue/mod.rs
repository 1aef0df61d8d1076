//! Traversal ordering for the crawl frontier.

mod frontier;

pub use frontier::Frontier;

use crate::error::ScanError;
use std::fmt;
use std::str::FromStr;

/// Order in which pending requests are taken from the frontier.
///
/// `Unknown` stands in for any out-of-range representation and renders as an
/// empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// FIFO: discovery order, depth grows across the whole frontier.
    #[default]
    BreadthFirst,
    /// LIFO: exhaust the most recently discovered branch first.
    DepthFirst,
    Unknown,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::BreadthFirst => "breadth-first",
            Strategy::DepthFirst => "depth-first",
            Strategy::Unknown => "",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<i32> for Strategy {
    fn from(value: i32) -> Self {
        match value {
            0 => Strategy::BreadthFirst,
            1 => Strategy::DepthFirst,
            _ => Strategy::Unknown,
        }
    }
}

impl FromStr for Strategy {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breadth-first" => Ok(Strategy::BreadthFirst),
            "depth-first" => Ok(Strategy::DepthFirst),
            other => Err(ScanError::InvalidStrategy(other.to_string())),
        }
    }
}
