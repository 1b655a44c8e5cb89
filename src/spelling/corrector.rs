//! Compound-aware correction of token sequences.
//!
//! Whitespace is itself an error source: two tokens may belong to one word and
//! one token may hide two words. Every token is weighed against a merge with
//! its left neighbour and against all of its two-way splits, with one token of
//! lookahead.

use serde::{Deserialize, Serialize};

use crate::spelling::index::SpellIndex;
use crate::spelling::suggest::{SuggestItem, Verbosity};

/// Result of correcting a token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// Accepted parts joined by single spaces.
    pub term: String,
    /// Edit distance between the joined input and `term`.
    pub distance: usize,
    /// Smallest count among the accepted parts.
    pub count: u64,
    /// Accepted parts, one per output word group.
    pub parts: Vec<SuggestItem>,
    /// Budget the correction ran with.
    pub max_distance: usize,
}

impl CorrectionResult {
    /// Parts kept unchanged because no correction was found.
    pub fn unresolved_parts(&self) -> impl Iterator<Item = &SuggestItem> {
        self.parts
            .iter()
            .filter(move |part| part.distance > self.max_distance)
    }

    /// Check if every part was resolved.
    pub fn is_resolved(&self) -> bool {
        self.unresolved_parts().next().is_none()
    }
}

/// Runs one compound correction against an index.
#[derive(Debug, Clone, Copy)]
pub struct CompoundCorrector<'a> {
    index: &'a SpellIndex,
    max_distance: usize,
}

impl<'a> CompoundCorrector<'a> {
    /// Create a corrector with the given per-token budget.
    pub fn new(index: &'a SpellIndex, max_distance: usize) -> Self {
        CompoundCorrector {
            index,
            max_distance,
        }
    }

    /// Correct `tokens` left to right.
    pub fn correct<S: AsRef<str>>(&self, tokens: &[S]) -> CorrectionResult {
        let mut parts: Vec<SuggestItem> = Vec::with_capacity(tokens.len());
        let mut last_was_merge = false;

        for (i, token) in tokens.iter().enumerate() {
            let token = token.as_ref();
            let suggestions = self.top(token);

            if i > 0 && !last_was_merge {
                let previous = tokens[i - 1].as_ref();
                if let Some(merged) = self.try_merge(previous, token, &suggestions, &parts) {
                    if let Some(last) = parts.last_mut() {
                        *last = merged;
                    }
                    last_was_merge = true;
                    continue;
                }
            }
            last_was_merge = false;

            if let Some(best) = suggestions.first() {
                if best.distance == 0 || token.chars().count() == 1 {
                    parts.push(best.clone());
                    continue;
                }
            }

            parts.push(self.best_split(token, suggestions.first()));
        }

        self.finish(tokens, parts)
    }

    fn top(&self, term: &str) -> Vec<SuggestItem> {
        self.index.lookup(term, self.max_distance, Verbosity::Top)
    }

    fn unresolved(&self) -> usize {
        self.max_distance + 1
    }

    fn bounded_distance(&self, a: &str, b: &str) -> usize {
        self.index
            .distance(a, b, self.max_distance)
            .unwrap_or_else(|| self.unresolved())
    }

    /// Merged suggestion for `previous + token`, if it is cheaper than
    /// correcting both tokens on their own.
    fn try_merge(
        &self,
        previous: &str,
        token: &str,
        suggestions: &[SuggestItem],
        parts: &[SuggestItem],
    ) -> Option<SuggestItem> {
        let combined = self.top(&format!("{previous}{token}"));
        let best_combined = combined.first()?;
        let accepted = parts.last()?;

        let corrected = suggestions
            .first()
            .map(|s| s.term.as_str())
            .unwrap_or(token);
        let separate = self.bounded_distance(
            &format!("{previous} {token}"),
            &format!("{} {corrected}", accepted.term),
        );

        if separate > 0 && best_combined.distance + 1 < separate {
            let mut merged = best_combined.clone();
            merged.distance += 1;
            Some(merged)
        } else {
            None
        }
    }

    /// Best of the token's own suggestion and its two-way splits.
    fn best_split(&self, token: &str, single: Option<&SuggestItem>) -> SuggestItem {
        let chars: Vec<char> = token.chars().collect();
        let mut best: Option<SuggestItem> = single.cloned();

        for j in 1..chars.len() {
            let left: String = chars[..j].iter().collect();
            let right: String = chars[j..].iter().collect();

            let left_suggestions = self.top(&left);
            let Some(left_best) = left_suggestions.first() else {
                continue;
            };
            if single.is_some_and(|s| s.term == left_best.term) {
                break;
            }

            let right_suggestions = self.top(&right);
            let Some(right_best) = right_suggestions.first() else {
                continue;
            };
            if single.is_some_and(|s| s.term == right_best.term) {
                break;
            }

            let term = format!("{} {}", left_best.term, right_best.term);
            let distance = self.bounded_distance(token, &term);
            let split = SuggestItem::new(term, distance, left_best.count.min(right_best.count));

            if best.as_ref().is_none_or(|b| score(&split) < score(b)) {
                best = Some(split);
            }
            if distance == 1 {
                break;
            }
        }

        best.unwrap_or_else(|| SuggestItem::new(token, self.unresolved(), 0))
    }

    fn finish<S: AsRef<str>>(&self, tokens: &[S], parts: Vec<SuggestItem>) -> CorrectionResult {
        let input = tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(" ");
        let term = parts
            .iter()
            .map(|part| part.term.as_str())
            .collect::<Vec<&str>>()
            .join(" ");

        let distance = self
            .index
            .distance(&input, &term, usize::MAX)
            .unwrap_or_else(|| input.chars().count().max(term.chars().count()));
        let count = parts.iter().map(|part| part.count).min().unwrap_or(0);

        CorrectionResult {
            term,
            distance,
            count,
            parts,
            max_distance: self.max_distance,
        }
    }
}

/// Lower is better.
fn score(item: &SuggestItem) -> i128 {
    2 * item.distance as i128 - item.count as i128
}

impl SpellIndex {
    /// Correct a sequence of tokens, allowing merges and splits.
    pub fn correct<S: AsRef<str>>(&self, tokens: &[S], max_distance: usize) -> CorrectionResult {
        CompoundCorrector::new(self, max_distance).correct(tokens)
    }

    /// Correct whitespace-separated text.
    pub fn correct_text(&self, text: &str, max_distance: usize) -> CorrectionResult {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        self.correct(&tokens, max_distance)
    }
}
