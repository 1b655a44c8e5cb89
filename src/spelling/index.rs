//! The read-only spelling index.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::spelling::config::SpellConfig;
use crate::spelling::dictionary::{DictionaryBuilder, TermDictionary};
use crate::spelling::distance::DistanceOracle;

/// A built dictionary with its delete-variant table and distance oracle.
///
/// The index is immutable. Lookups and corrections take `&self`, so one index
/// can be shared between threads behind an [`Arc`].
#[derive(Debug, Clone)]
pub struct SpellIndex {
    config: SpellConfig,
    dictionary: TermDictionary,
    oracle: Arc<dyn DistanceOracle>,
}

/// Summary of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Terms visible to lookups.
    pub terms: usize,
    /// Sum of all term counts, saturating.
    pub total_count: u64,
    /// Length in characters of the longest term.
    pub max_length: usize,
    /// Distinct variant hashes.
    pub variant_keys: usize,
    /// Term references across all variants.
    pub variant_entries: usize,
    /// Largest edit distance a lookup may ask for.
    pub max_dictionary_edit_distance: usize,
    /// Indexed prefix length.
    pub prefix_length: usize,
    /// Count a term needed to be promoted.
    pub count_threshold: u64,
    /// Name of the distance oracle.
    pub distance: String,
}

impl SpellIndex {
    /// Build an index from `(term, count)` pairs.
    ///
    /// Entries go through [`DictionaryBuilder::add_term`], so repeated terms
    /// accumulate and the count threshold applies.
    pub fn build<I, S>(config: SpellConfig, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut builder = DictionaryBuilder::new(config)?;
        for (term, count) in entries {
            builder.add_term(term.as_ref(), count);
        }
        Ok(builder.build())
    }

    /// Start a builder for file-based loading.
    pub fn builder(config: SpellConfig) -> Result<DictionaryBuilder> {
        DictionaryBuilder::new(config)
    }

    pub(crate) fn from_parts(
        config: SpellConfig,
        dictionary: TermDictionary,
        oracle: Arc<dyn DistanceOracle>,
    ) -> Self {
        SpellIndex {
            config,
            dictionary,
            oracle,
        }
    }

    /// Construction parameters.
    pub fn config(&self) -> &SpellConfig {
        &self.config
    }

    /// Underlying term arena and variant table.
    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    /// Distance oracle used to verify candidates.
    pub fn oracle(&self) -> &Arc<dyn DistanceOracle> {
        &self.oracle
    }

    /// Number of terms visible to lookups.
    pub fn len(&self) -> usize {
        self.dictionary.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.dictionary.is_empty()
    }

    /// Length in characters of the longest term.
    pub fn max_length(&self) -> usize {
        self.dictionary.max_length()
    }

    /// Check if `term` is a dictionary term.
    pub fn contains(&self, term: &str) -> bool {
        self.dictionary.contains(term)
    }

    /// Count of a dictionary term.
    pub fn count(&self, term: &str) -> Option<u64> {
        self.dictionary.count(term)
    }

    /// Bounded distance through the configured oracle.
    pub fn distance(&self, a: &str, b: &str, max_distance: usize) -> Option<usize> {
        self.oracle.distance(a, b, max_distance)
    }

    /// Get index statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            terms: self.dictionary.len(),
            total_count: self.dictionary.total_count(),
            max_length: self.dictionary.max_length(),
            variant_keys: self.dictionary.variant_keys(),
            variant_entries: self.dictionary.variant_entries(),
            max_dictionary_edit_distance: self.config.max_dictionary_edit_distance,
            prefix_length: self.config.prefix_length,
            count_threshold: self.config.count_threshold,
            distance: self.oracle.name().to_string(),
        }
    }
}
