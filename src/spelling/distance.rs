//! Edit distance strategies used to verify lookup candidates.
//!
//! Every strategy implements [`DistanceOracle`]. The strategy is chosen once,
//! when an index is built, through [`DistanceAlgorithm`] or by handing a custom
//! oracle to the builder.

use std::cmp::min;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SpellError;

/// A true edit distance function.
///
/// `distance` returns `None` when the distance between `a` and `b` exceeds
/// `max_distance`. Callers treat `None` as "no match". Implementations must be
/// pure functions of their arguments so an index can be shared across threads.
pub trait DistanceOracle: Send + Sync + fmt::Debug {
    /// Short identifier used in logs and statistics.
    fn name(&self) -> &'static str;

    /// Distance between `a` and `b`, or `None` if it is larger than `max_distance`.
    fn distance(&self, a: &str, b: &str, max_distance: usize) -> Option<usize>;
}

/// Built-in distance strategies selectable by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceAlgorithm {
    /// Full-matrix Damerau-Levenshtein (optimal string alignment). Reference implementation.
    DamerauLevenshtein,
    /// Banded Damerau-Levenshtein with early termination. Same results as the reference.
    #[default]
    DamerauLevenshteinFast,
    /// Plain Levenshtein, transpositions cost two edits.
    Levenshtein,
}

impl DistanceAlgorithm {
    /// All selectable algorithms.
    pub const ALL: [DistanceAlgorithm; 3] = [
        DistanceAlgorithm::DamerauLevenshtein,
        DistanceAlgorithm::DamerauLevenshteinFast,
        DistanceAlgorithm::Levenshtein,
    ];

    /// Configuration name of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceAlgorithm::DamerauLevenshtein => "damerau-levenshtein",
            DistanceAlgorithm::DamerauLevenshteinFast => "damerau-levenshtein-fast",
            DistanceAlgorithm::Levenshtein => "levenshtein",
        }
    }

    /// Instantiate the oracle for this algorithm.
    pub fn oracle(&self) -> Arc<dyn DistanceOracle> {
        match self {
            DistanceAlgorithm::DamerauLevenshtein => Arc::new(DamerauLevenshtein),
            DistanceAlgorithm::DamerauLevenshteinFast => Arc::new(BoundedDamerauLevenshtein),
            DistanceAlgorithm::Levenshtein => Arc::new(Levenshtein),
        }
    }
}

impl fmt::Display for DistanceAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceAlgorithm {
    type Err = SpellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        DistanceAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == normalized)
            .ok_or_else(|| {
                SpellError::configuration(format!(
                    "unknown distance algorithm '{s}', expected one of: damerau-levenshtein, \
                     damerau-levenshtein-fast, levenshtein"
                ))
            })
    }
}

/// Reference Damerau-Levenshtein (optimal string alignment) over a full matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct DamerauLevenshtein;

impl DistanceOracle for DamerauLevenshtein {
    fn name(&self) -> &'static str {
        "damerau-levenshtein"
    }

    fn distance(&self, a: &str, b: &str, max_distance: usize) -> Option<usize> {
        let distance = damerau_levenshtein_distance(a, b);
        (distance <= max_distance).then_some(distance)
    }
}

/// Damerau-Levenshtein restricted to the budget.
///
/// Strips the common prefix and suffix, keeps three rows and abandons as soon
/// as a whole row exceeds the budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedDamerauLevenshtein;

impl DistanceOracle for BoundedDamerauLevenshtein {
    fn name(&self) -> &'static str {
        "damerau-levenshtein-fast"
    }

    fn distance(&self, a: &str, b: &str, max_distance: usize) -> Option<usize> {
        bounded_damerau_levenshtein(a, b, max_distance)
    }
}

/// Levenshtein distance with a threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

impl DistanceOracle for Levenshtein {
    fn name(&self) -> &'static str {
        "levenshtein"
    }

    fn distance(&self, a: &str, b: &str, max_distance: usize) -> Option<usize> {
        levenshtein_distance_threshold(a, b, max_distance)
    }
}

/// Calculate the Damerau-Levenshtein distance (optimal string alignment variant):
/// insertions, deletions, substitutions and adjacent transpositions, with no
/// substring edited more than once.
#[allow(clippy::needless_range_loop)]
pub fn damerau_levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for i in 0..=len1 {
        matrix[i][0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);

            matrix[i][j] = min(
                min(
                    matrix[i - 1][j] + 1, // deletion
                    matrix[i][j - 1] + 1, // insertion
                ),
                matrix[i - 1][j - 1] + cost, // substitution
            );

            if i > 1
                && j > 1
                && s1_chars[i - 1] == s2_chars[j - 2]
                && s1_chars[i - 2] == s2_chars[j - 1]
            {
                matrix[i][j] = min(
                    matrix[i][j],
                    matrix[i - 2][j - 2] + cost, // transposition
                );
            }
        }
    }

    matrix[len1][len2]
}

/// Damerau-Levenshtein (optimal string alignment) with early termination.
/// Returns `None` once the distance is known to exceed `max_distance`.
pub fn bounded_damerau_levenshtein(s1: &str, s2: &str, max_distance: usize) -> Option<usize> {
    let mut short: Vec<char> = s1.chars().collect();
    let mut long: Vec<char> = s2.chars().collect();
    if short.len() > long.len() {
        std::mem::swap(&mut short, &mut long);
    }

    if long.len() - short.len() > max_distance {
        return None;
    }

    let prefix = short
        .iter()
        .zip(long.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = short[prefix..]
        .iter()
        .rev()
        .zip(long[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let a = &short[prefix..short.len() - suffix];
    let b = &long[prefix..long.len() - suffix];

    if a.is_empty() {
        return (b.len() <= max_distance).then_some(b.len());
    }

    let width = b.len() + 1;
    let mut before_previous: Vec<usize> = (0..width).collect();
    let mut previous: Vec<usize> = (0..width).collect();
    let mut current: Vec<usize> = vec![0; width];

    for i in 1..=a.len() {
        current[0] = i;
        let mut row_min = i;

        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut value = min(
                min(previous[j] + 1, current[j - 1] + 1),
                previous[j - 1] + cost,
            );

            if i > 1 && j > 1 && cost == 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                value = min(value, before_previous[j - 2] + 1);
            }

            current[j] = value;
            row_min = min(row_min, value);
        }

        // Row minima never decrease, so the budget is already lost.
        if row_min > max_distance {
            return None;
        }

        std::mem::swap(&mut before_previous, &mut previous);
        std::mem::swap(&mut previous, &mut current);
    }

    let distance = previous[b.len()];
    (distance <= max_distance).then_some(distance)
}

/// Calculate Levenshtein distance with a maximum threshold for early termination.
/// Returns None if the distance exceeds the threshold.
#[allow(clippy::needless_range_loop)]
pub fn levenshtein_distance_threshold(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1.abs_diff(len2) > threshold {
        return None;
    }

    if len1 == 0 {
        return (len2 <= threshold).then_some(len2);
    }
    if len2 == 0 {
        return (len1 <= threshold).then_some(len1);
    }

    // Use only two rows for space optimization
    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr_row[0] = i;
        let mut min_in_row = i;

        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);

            curr_row[j] = min(
                min(
                    prev_row[j] + 1,     // deletion
                    curr_row[j - 1] + 1, // insertion
                ),
                prev_row[j - 1] + cost, // substitution
            );

            min_in_row = min(min_in_row, curr_row[j]);
        }

        if min_in_row > threshold {
            return None;
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[len2];
    (distance <= threshold).then_some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: &[(&str, &str)] = &[
        ("", ""),
        ("", "abc"),
        ("a", ""),
        ("ab", "ba"),
        ("teh", "the"),
        ("search", "serach"),
        ("kitten", "sitting"),
        ("ca", "abc"),
        ("thecat", "the cat"),
        ("abcdef", "badcfe"),
        ("bank", "kanb"),
        ("naïve", "naive"),
        ("tashi delek", "tashidelek"),
        ("aaaa", "aa"),
    ];

    #[test]
    fn test_damerau_levenshtein_distance() {
        assert_eq!(damerau_levenshtein_distance("", ""), 0);
        assert_eq!(damerau_levenshtein_distance("ab", "ba"), 1);
        assert_eq!(damerau_levenshtein_distance("search", "serach"), 1);
        assert_eq!(damerau_levenshtein_distance("kitten", "sitting"), 3);
        // optimal string alignment: no substring is edited twice
        assert_eq!(damerau_levenshtein_distance("ca", "abc"), 3);
        assert_eq!(damerau_levenshtein_distance("thecat", "the cat"), 1);
    }

    #[test]
    fn test_bounded_matches_reference() {
        for &(a, b) in PAIRS {
            let expected = damerau_levenshtein_distance(a, b);
            for max in 0..=expected + 1 {
                let bounded = bounded_damerau_levenshtein(a, b, max);
                if expected <= max {
                    assert_eq!(bounded, Some(expected), "{a:?} vs {b:?} max {max}");
                } else {
                    assert_eq!(bounded, None, "{a:?} vs {b:?} max {max}");
                }
            }
            assert_eq!(
                bounded_damerau_levenshtein(a, b, usize::MAX),
                Some(expected)
            );
        }
    }

    #[test]
    fn test_levenshtein_distance_threshold() {
        assert_eq!(
            levenshtein_distance_threshold("kitten", "sitting", 3),
            Some(3)
        );
        assert_eq!(levenshtein_distance_threshold("kitten", "sitting", 2), None);
        assert_eq!(levenshtein_distance_threshold("search", "serach", 2), Some(2));
        assert_eq!(levenshtein_distance_threshold("a", "abc", 1), None);
        assert_eq!(levenshtein_distance_threshold("a", "ab", 1), Some(1));
    }

    #[test]
    fn test_oracles_share_contract() {
        for algorithm in DistanceAlgorithm::ALL {
            let oracle = algorithm.oracle();
            assert_eq!(oracle.name(), algorithm.name());
            assert_eq!(oracle.distance("same", "same", 0), Some(0));
            assert_eq!(oracle.distance("abc", "xyz", 2), None);
            assert_eq!(oracle.distance("kitten", "sitting", 3), Some(3));
        }
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!(
            "damerau-levenshtein".parse::<DistanceAlgorithm>().unwrap(),
            DistanceAlgorithm::DamerauLevenshtein
        );
        assert_eq!(
            "Damerau_Levenshtein_Fast".parse::<DistanceAlgorithm>().unwrap(),
            DistanceAlgorithm::DamerauLevenshteinFast
        );
        assert_eq!(
            "levenshtein".parse::<DistanceAlgorithm>().unwrap(),
            DistanceAlgorithm::Levenshtein
        );

        let err = "typo".parse::<DistanceAlgorithm>().unwrap_err();
        assert!(matches!(err, SpellError::Configuration(_)));
    }

    #[test]
    fn test_algorithm_serde_names() {
        let json = serde_json::to_string(&DistanceAlgorithm::DamerauLevenshteinFast).unwrap();
        assert_eq!(json, "\"damerau-levenshtein-fast\"");
        let parsed: DistanceAlgorithm = serde_json::from_str("\"levenshtein\"").unwrap();
        assert_eq!(parsed, DistanceAlgorithm::Levenshtein);
    }
}
