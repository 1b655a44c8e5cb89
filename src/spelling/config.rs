//! Construction-time parameters of a spelling index.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpellError};
use crate::spelling::distance::DistanceAlgorithm;

/// Parameters fixed when a [`SpellIndex`](crate::spelling::SpellIndex) is built.
///
/// `max_dictionary_edit_distance` and `prefix_length` bound the size of the
/// delete-variant index: variants are generated from the first
/// `prefix_length` characters of each term, with up to
/// `max_dictionary_edit_distance` deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellConfig {
    /// Largest edit distance any lookup may ask for.
    pub max_dictionary_edit_distance: usize,
    /// Number of leading characters of each term that are indexed.
    pub prefix_length: usize,
    /// Cumulative count a term needs before it becomes visible to lookups.
    pub count_threshold: u64,
    /// Distance strategy used to verify candidates.
    pub distance: DistanceAlgorithm,
    /// Initial capacity of the term and variant maps.
    pub initial_capacity: usize,
}

impl Default for SpellConfig {
    fn default() -> Self {
        SpellConfig {
            max_dictionary_edit_distance: 2,
            prefix_length: 7,
            count_threshold: 1,
            distance: DistanceAlgorithm::default(),
            initial_capacity: 16,
        }
    }
}

impl SpellConfig {
    /// Create a configuration with the given distance and prefix bounds.
    pub fn new(max_dictionary_edit_distance: usize, prefix_length: usize) -> Self {
        SpellConfig {
            max_dictionary_edit_distance,
            prefix_length,
            ..Default::default()
        }
    }

    /// Set the count threshold.
    pub fn with_count_threshold(mut self, count_threshold: u64) -> Self {
        self.count_threshold = count_threshold;
        self
    }

    /// Set the distance algorithm.
    pub fn with_distance(mut self, distance: DistanceAlgorithm) -> Self {
        self.distance = distance;
        self
    }

    /// Check the parameters. Fails with a configuration error.
    pub fn validate(&self) -> Result<()> {
        if self.prefix_length == 0 {
            return Err(SpellError::configuration("prefix_length must be at least 1"));
        }
        if self.prefix_length <= self.max_dictionary_edit_distance {
            return Err(SpellError::configuration(format!(
                "prefix_length ({}) must be greater than max_dictionary_edit_distance ({})",
                self.prefix_length, self.max_dictionary_edit_distance
            )));
        }
        Ok(())
    }

    /// Read a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SpellConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}
