//! Suggestion items and lookup verbosity.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpellError;

/// A dictionary term offered as a correction.
///
/// Two items are equal when their terms are equal, whatever their distance or
/// count. Use [`SuggestItem::rank`] to order items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestItem {
    /// The suggested term.
    pub term: String,
    /// Edit distance from the query.
    pub distance: usize,
    /// Frequency of the term in the dictionary.
    pub count: u64,
}

impl SuggestItem {
    /// Create a new suggestion.
    pub fn new<S: Into<String>>(term: S, distance: usize, count: u64) -> Self {
        SuggestItem {
            term: term.into(),
            distance,
            count,
        }
    }

    /// Ranking order: distance ascending, then count descending, then term.
    pub fn rank(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| self.term.cmp(&other.term))
    }
}

impl PartialEq for SuggestItem {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term
    }
}

impl Eq for SuggestItem {}

impl Hash for SuggestItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.term.hash(state);
    }
}

impl fmt::Display for SuggestItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.term, self.count, self.distance)
    }
}

/// Sort suggestions into ranking order.
pub fn sort_suggestions(suggestions: &mut [SuggestItem]) {
    suggestions.sort_by(SuggestItem::rank);
}

/// How many suggestions a lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// The single best suggestion. The search budget shrinks to the best
    /// distance found so far; ties go to the more frequent term.
    #[default]
    Top,
    /// Every suggestion at the smallest distance found.
    Closest,
    /// Every suggestion within the budget. No early termination.
    All,
}

impl FromStr for Verbosity {
    type Err = SpellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top" | "0" => Ok(Verbosity::Top),
            "closest" | "1" => Ok(Verbosity::Closest),
            "all" | "2" => Ok(Verbosity::All),
            other => Err(SpellError::invalid_argument(format!(
                "unknown verbosity '{other}', expected top, closest or all"
            ))),
        }
    }
}
