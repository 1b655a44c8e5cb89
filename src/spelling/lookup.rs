//! Single-term lookup over the delete-variant index.
//!
//! The query's own delete variants are generated breadth first, so candidates
//! are visited in order of increasing deletion depth. Each variant hash yields
//! a list of dictionary terms, which pass a series of cheap length and prefix
//! bounds before the distance oracle is asked for the true distance.

use ahash::AHashSet;
use log::debug;

use crate::spelling::dictionary::{TermId, variant_hash};
use crate::spelling::index::SpellIndex;
use crate::spelling::suggest::{SuggestItem, Verbosity, sort_suggestions};

impl SpellIndex {
    /// Find dictionary terms within `max_edit_distance` of `input`.
    ///
    /// Results are sorted by distance ascending, then count descending. An
    /// empty list is returned when `max_edit_distance` exceeds the configured
    /// maximum or when `input` is too long to match any term. A dictionary term
    /// is returned alone at distance 0 unless `verbosity` is [`Verbosity::All`].
    pub fn lookup(
        &self,
        input: &str,
        max_edit_distance: usize,
        verbosity: Verbosity,
    ) -> Vec<SuggestItem> {
        let mut suggestions: Vec<SuggestItem> = Vec::new();

        if max_edit_distance > self.config().max_dictionary_edit_distance {
            debug!(
                "lookup of {input:?} rejected: distance {max_edit_distance} exceeds {}",
                self.config().max_dictionary_edit_distance
            );
            return suggestions;
        }

        let input_chars: Vec<char> = input.chars().collect();
        let input_len = input_chars.len();
        if input_len > self.max_length() + max_edit_distance {
            return suggestions;
        }

        if let Some(count) = self.count(input) {
            suggestions.push(SuggestItem::new(input, 0, count));
            if verbosity != Verbosity::All {
                return suggestions;
            }
        }

        if max_edit_distance == 0 {
            return suggestions;
        }

        let dictionary = self.dictionary();
        let prefix_length = self.config().prefix_length;
        let input_prefix_len = input_len.min(prefix_length);

        let mut max_edit_distance2 = max_edit_distance;
        let mut queued: AHashSet<Vec<char>> = AHashSet::new();
        let mut verified: AHashSet<TermId> = AHashSet::new();
        let mut candidates: Vec<Vec<char>> = vec![input_chars[..input_prefix_len].to_vec()];
        let mut pointer = 0;

        while pointer < candidates.len() {
            let candidate = candidates[pointer].clone();
            pointer += 1;
            let candidate_len = candidate.len();
            let length_diff = input_prefix_len - candidate_len;

            // Candidates come in order of deletion depth: nothing closer follows.
            if length_diff > max_edit_distance2 {
                if verbosity == Verbosity::All {
                    continue;
                }
                break;
            }

            let candidate_string: String = candidate.iter().collect();
            for &id in dictionary.candidates(variant_hash(&candidate_string)) {
                let suggestion = dictionary.term(id);
                if suggestion == input {
                    continue;
                }

                let suggestion_chars: Vec<char> = suggestion.chars().collect();
                let suggestion_len = suggestion_chars.len();

                if suggestion_len.abs_diff(input_len) > max_edit_distance2
                    || suggestion_len < candidate_len
                    || (suggestion_len == candidate_len && suggestion != candidate_string)
                {
                    continue;
                }

                let suggestion_prefix_len = suggestion_len.min(prefix_length);
                if suggestion_prefix_len > input_prefix_len
                    && suggestion_prefix_len - candidate_len > max_edit_distance2
                {
                    continue;
                }

                let distance = if candidate_len == 0 {
                    // No common characters: both strings fit in the budget.
                    let distance = input_len.max(suggestion_len);
                    if distance > max_edit_distance2 || !verified.insert(id) {
                        continue;
                    }
                    distance
                } else if suggestion_len == 1 {
                    let distance = if input_chars.contains(&suggestion_chars[0]) {
                        input_len - 1
                    } else {
                        input_len
                    };
                    if distance > max_edit_distance2 || !verified.insert(id) {
                        continue;
                    }
                    distance
                } else if has_different_suffix(
                    prefix_length,
                    max_edit_distance,
                    &input_chars,
                    candidate_len,
                    &suggestion_chars,
                ) {
                    continue;
                } else {
                    if verbosity != Verbosity::All
                        && !delete_in_suggestion_prefix(&candidate, &suggestion_chars, prefix_length)
                    {
                        continue;
                    }
                    if !verified.insert(id) {
                        continue;
                    }
                    match self.distance(input, suggestion, max_edit_distance2) {
                        Some(distance) => distance,
                        None => continue,
                    }
                };

                if distance > max_edit_distance2 {
                    continue;
                }

                let count = dictionary.count_of(id);
                let item = SuggestItem::new(suggestion, distance, count);

                if !suggestions.is_empty() {
                    match verbosity {
                        Verbosity::Closest => {
                            if distance < max_edit_distance2 {
                                suggestions.clear();
                            }
                        }
                        Verbosity::Top => {
                            if distance < max_edit_distance2 || count > suggestions[0].count {
                                max_edit_distance2 = distance;
                                suggestions[0] = item;
                            }
                            continue;
                        }
                        Verbosity::All => {}
                    }
                }

                if verbosity != Verbosity::All {
                    max_edit_distance2 = distance;
                }
                suggestions.push(item);
            }

            if length_diff < max_edit_distance && candidate_len <= prefix_length {
                // Deeper deletes cannot beat what has been found.
                if verbosity != Verbosity::All && length_diff >= max_edit_distance2 {
                    continue;
                }

                for i in 0..candidate_len {
                    let mut delete = candidate.clone();
                    delete.remove(i);
                    if queued.insert(delete.clone()) {
                        candidates.push(delete);
                    }
                }
            }
        }

        if suggestions.len() > 1 {
            sort_suggestions(&mut suggestions);
        }
        suggestions
    }
}

/// True when the candidate used the whole budget inside the prefix but the
/// characters after the prefix still differ, so the distance is out of budget.
fn has_different_suffix(
    prefix_length: usize,
    max_edit_distance: usize,
    input: &[char],
    candidate_len: usize,
    suggestion: &[char],
) -> bool {
    if prefix_length.saturating_sub(max_edit_distance) != candidate_len {
        return false;
    }

    let input_len = input.len();
    let suggestion_len = suggestion.len();
    let min = input_len.min(suggestion_len).saturating_sub(prefix_length);

    if min > 1 && input[input_len + 1 - min..] != suggestion[suggestion_len + 1 - min..] {
        return true;
    }

    min > 0
        && input[input_len - min] != suggestion[suggestion_len - min]
        && (input[input_len - min - 1] != suggestion[suggestion_len - min]
            || input[input_len - min] != suggestion[suggestion_len - min - 1])
}

/// Check that the characters of `delete` appear in order within the indexed
/// prefix of `suggestion`.
fn delete_in_suggestion_prefix(delete: &[char], suggestion: &[char], prefix_length: usize) -> bool {
    if delete.is_empty() {
        return true;
    }

    let suggestion_len = suggestion.len().min(prefix_length);
    let mut j = 0;
    for &c in delete {
        while j < suggestion_len && c != suggestion[j] {
            j += 1;
        }
        if j == suggestion_len {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spelling::config::SpellConfig;
    use crate::spelling::distance::damerau_levenshtein_distance;

    fn index(entries: &[(&str, u64)]) -> SpellIndex {
        SpellIndex::build(SpellConfig::default(), entries.iter().copied()).unwrap()
    }

    fn terms(suggestions: &[SuggestItem]) -> Vec<&str> {
        suggestions.iter().map(|s| s.term.as_str()).collect()
    }

    #[test]
    fn test_transposition() {
        let index = index(&[("the", 100), ("cat", 80), ("sat", 50)]);
        let suggestions = index.lookup("teh", 2, Verbosity::Top);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].term, "the");
        assert_eq!(suggestions[0].distance, 1);
        assert_eq!(suggestions[0].count, 100);
    }

    #[test]
    fn test_exact_match_returns_alone() {
        let index = index(&[("cat", 80), ("sat", 50), ("hat", 500)]);
        for verbosity in [Verbosity::Top, Verbosity::Closest] {
            let suggestions = index.lookup("cat", 2, verbosity);
            assert_eq!(terms(&suggestions), vec!["cat"]);
            assert_eq!(suggestions[0].distance, 0);
        }

        let suggestions = index.lookup("cat", 2, Verbosity::All);
        assert_eq!(suggestions[0].term, "cat");
        assert_eq!(suggestions[0].distance, 0);
        assert_eq!(terms(&suggestions[1..]), vec!["hat", "sat"]);
    }

    #[test]
    fn test_top_prefers_frequent_on_tie() {
        let index = index(&[("cat", 80), ("sat", 50), ("hat", 500)]);
        let suggestions = index.lookup("bat", 2, Verbosity::Top);
        assert_eq!(terms(&suggestions), vec!["hat"]);
        assert_eq!(suggestions[0].distance, 1);
    }

    #[test]
    fn test_closest_returns_all_at_best_distance() {
        let index = index(&[("cat", 80), ("sat", 50), ("hat", 500), ("cart", 900)]);
        let suggestions = index.lookup("bat", 2, Verbosity::Closest);
        assert_eq!(terms(&suggestions), vec!["hat", "cat", "sat"]);
        assert!(suggestions.iter().all(|s| s.distance == 1));
    }

    #[test]
    fn test_all_returns_everything_within_budget() {
        let index = index(&[("cat", 80), ("sat", 50), ("cart", 900), ("dog", 10)]);
        let suggestions = index.lookup("cat", 1, Verbosity::All);
        assert_eq!(terms(&suggestions), vec!["cat", "cart", "sat"]);
        assert_eq!(suggestions[1].distance, 1);
    }

    #[test]
    fn test_budget_above_configured_maximum() {
        let index = index(&[("the", 100)]);
        assert!(index.lookup("teh", 3, Verbosity::Top).is_empty());
        assert!(index.lookup("the", 3, Verbosity::Top).is_empty());
    }

    #[test]
    fn test_zero_budget() {
        let index = index(&[("the", 100)]);
        assert_eq!(terms(&index.lookup("the", 0, Verbosity::Top)), vec!["the"]);
        assert!(index.lookup("teh", 0, Verbosity::Top).is_empty());
    }

    #[test]
    fn test_too_long_query() {
        let index = index(&[("the", 100)]);
        assert!(index.lookup("thereafter", 2, Verbosity::All).is_empty());
    }

    #[test]
    fn test_empty_dictionary() {
        let index = index(&[]);
        assert!(index.lookup("anything", 2, Verbosity::All).is_empty());
        assert!(index.lookup("", 2, Verbosity::All).is_empty());
    }

    #[test]
    fn test_short_terms_through_empty_variant() {
        let index = index(&[("a", 10), ("an", 20), ("xyz", 5)]);
        let suggestions = index.lookup("b", 2, Verbosity::All);
        assert_eq!(terms(&suggestions), vec!["a", "an"]);
        assert_eq!(suggestions[0].distance, 1);
        assert_eq!(suggestions[1].distance, 2);
    }

    #[test]
    fn test_long_terms_beyond_prefix() {
        let config = SpellConfig::new(2, 5);
        let index = SpellIndex::build(
            config,
            [("spelling", 10), ("spellings", 4), ("spelunking", 3)],
        )
        .unwrap();

        let suggestions = index.lookup("speling", 2, Verbosity::Closest);
        assert_eq!(terms(&suggestions), vec!["spelling"]);
        assert_eq!(suggestions[0].distance, 1);

        let suggestions = index.lookup("spellign", 2, Verbosity::All);
        assert_eq!(suggestions[0].term, "spelling");
        assert_eq!(suggestions[0].distance, 1);
    }

    #[test]
    fn test_suggestions_within_true_distance() {
        let words = [
            ("the", 100),
            ("then", 60),
            ("they", 55),
            ("cat", 80),
            ("cart", 20),
            ("car", 40),
            ("sat", 50),
            ("at", 30),
            ("a", 90),
        ];
        let index = index(&words);

        for query in ["teh", "ct", "crat", "thne", "x", "atc", "sta", "cars"] {
            for max in 0..=2 {
                let suggestions = index.lookup(query, max, Verbosity::All);
                for s in &suggestions {
                    assert!(damerau_levenshtein_distance(query, &s.term) <= max);
                    assert!(s.distance <= max);
                }
                for pair in suggestions.windows(2) {
                    assert!(
                        pair[0].distance < pair[1].distance
                            || (pair[0].distance == pair[1].distance
                                && pair[0].count >= pair[1].count)
                    );
                }
            }
        }
    }

    #[test]
    fn test_promoted_term_first_at_any_budget() {
        let index = index(&[("the", 100), ("then", 60), ("they", 55)]);
        for term in ["the", "then", "they"] {
            for max in 0..=2 {
                for verbosity in [Verbosity::Top, Verbosity::Closest, Verbosity::All] {
                    let suggestions = index.lookup(term, max, verbosity);
                    assert_eq!(suggestions[0].term, term);
                    assert_eq!(suggestions[0].distance, 0);
                }
            }
        }
    }

    #[test]
    fn test_delete_in_suggestion_prefix() {
        let chars = |s: &str| s.chars().collect::<Vec<char>>();
        assert!(delete_in_suggestion_prefix(&chars("th"), &chars("the"), 7));
        assert!(!delete_in_suggestion_prefix(&chars("ht"), &chars("the"), 7));
        assert!(!delete_in_suggestion_prefix(&chars("ce"), &chars("abcdef"), 3));
        assert!(delete_in_suggestion_prefix(&[], &chars("abc"), 7));
    }

    #[test]
    fn test_has_different_suffix() {
        let chars = |s: &str| s.chars().collect::<Vec<char>>();
        assert!(has_different_suffix(
            5,
            2,
            &chars("abcdefxyz"),
            3,
            &chars("abcdefuvw")
        ));
        assert!(!has_different_suffix(
            5,
            2,
            &chars("abcdefxyz"),
            3,
            &chars("abcdefxyz")
        ));
        assert!(!has_different_suffix(5, 2, &chars("abc"), 2, &chars("abd")));
    }
}
