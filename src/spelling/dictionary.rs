//! Term frequencies and the delete-variant index.
//!
//! A [`DictionaryBuilder`] ingests `(term, count)` pairs in one batch. Terms
//! whose cumulative count reaches the configured threshold are promoted into a
//! [`TermDictionary`]: the term is stored once in an arena and every delete
//! variant of its prefix points back at the term id. The builder is consumed by
//! [`DictionaryBuilder::build`], after which the dictionary is read-only.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use ahash::{AHashMap, AHashSet, RandomState};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpellError};
use crate::spelling::config::SpellConfig;
use crate::spelling::distance::DistanceOracle;
use crate::spelling::index::SpellIndex;

/// Index of a term in the dictionary arena.
pub type TermId = u32;

static VARIANT_HASHER: LazyLock<RandomState> =
    LazyLock::new(|| RandomState::with_seeds(808259318, 750368348, 84901999, 789810389));

/// Hash key of a delete variant.
///
/// Fixed seeds keep keys stable between runs of the same build, so a saved
/// variant table can be reused.
pub fn variant_hash(variant: &str) -> u64 {
    VARIANT_HASHER.hash_one(variant)
}

/// All strings obtained by deleting up to `max_edit_distance` characters from
/// the first `prefix_length` characters of `term`, including the prefix
/// itself. The empty string is included when the whole term is no longer than
/// `max_edit_distance`. No variant is emitted twice.
pub fn delete_variants(term: &str, prefix_length: usize, max_edit_distance: usize) -> Vec<String> {
    let chars: Vec<char> = term.chars().collect();
    let mut variants = Vec::new();
    let mut seen: AHashSet<String> = AHashSet::new();

    if chars.len() <= max_edit_distance {
        seen.insert(String::new());
        variants.push(String::new());
    }

    let prefix: Vec<char> = chars[..chars.len().min(prefix_length)].to_vec();
    let prefix_string: String = prefix.iter().collect();
    if seen.insert(prefix_string.clone()) {
        variants.push(prefix_string);
    }

    // Breadth first, so every variant is expanded from its shallowest depth.
    let mut worklist: VecDeque<(Vec<char>, usize)> = VecDeque::new();
    worklist.push_back((prefix, 0));

    while let Some((word, depth)) = worklist.pop_front() {
        let depth = depth + 1;
        if word.len() <= 1 || depth > max_edit_distance {
            continue;
        }

        for i in 0..word.len() {
            let mut delete = word.clone();
            delete.remove(i);
            let delete_string: String = delete.iter().collect();

            if seen.insert(delete_string.clone()) {
                variants.push(delete_string);
                if depth < max_edit_distance {
                    worklist.push_back((delete, depth));
                }
            }
        }
    }

    variants
}

/// Promoted terms, their counts and the delete-variant table.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    terms: Vec<String>,
    counts: Vec<u64>,
    ids: AHashMap<String, TermId>,
    deletes: AHashMap<u64, Vec<TermId>>,
    max_length: usize,
}

impl TermDictionary {
    /// Create an empty dictionary with room for `capacity` terms.
    pub fn with_capacity(capacity: usize) -> Self {
        TermDictionary {
            terms: Vec::with_capacity(capacity),
            counts: Vec::with_capacity(capacity),
            ids: AHashMap::with_capacity(capacity),
            deletes: AHashMap::with_capacity(capacity),
            max_length: 0,
        }
    }

    /// Number of promoted terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Length in characters of the longest term.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Id of a promoted term.
    pub fn id(&self, term: &str) -> Option<TermId> {
        self.ids.get(term).copied()
    }

    /// Check if a term is promoted.
    pub fn contains(&self, term: &str) -> bool {
        self.ids.contains_key(term)
    }

    /// Count of a promoted term.
    pub fn count(&self, term: &str) -> Option<u64> {
        self.id(term).map(|id| self.counts[id as usize])
    }

    /// Term stored under `id`.
    pub fn term(&self, id: TermId) -> &str {
        &self.terms[id as usize]
    }

    /// Count stored under `id`.
    pub fn count_of(&self, id: TermId) -> u64 {
        self.counts[id as usize]
    }

    /// Terms that produce the variant with this hash. May contain terms from
    /// unrelated variants sharing the hash.
    pub fn candidates(&self, hash: u64) -> &[TermId] {
        self.deletes.get(&hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct variant hashes.
    pub fn variant_keys(&self) -> usize {
        self.deletes.len()
    }

    /// Number of term references across all variants.
    pub fn variant_entries(&self) -> usize {
        self.deletes.values().map(Vec::len).sum()
    }

    /// Iterate over `(term, count)` in promotion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.terms
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }

    /// Sum of all counts, saturating.
    pub fn total_count(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |total, &count| total.saturating_add(count))
    }

    fn insert(
        &mut self,
        term: String,
        count: u64,
        prefix_length: usize,
        max_edit_distance: usize,
    ) -> TermId {
        let id = self.terms.len() as TermId;
        self.index_variants(id, &term, prefix_length, max_edit_distance);
        self.max_length = self.max_length.max(term.chars().count());
        self.ids.insert(term.clone(), id);
        self.terms.push(term);
        self.counts.push(count);
        id
    }

    fn accumulate(&mut self, id: TermId, count: u64) {
        let slot = &mut self.counts[id as usize];
        *slot = slot.saturating_add(count);
    }

    fn index_variants(
        &mut self,
        id: TermId,
        term: &str,
        prefix_length: usize,
        max_edit_distance: usize,
    ) {
        for variant in delete_variants(term, prefix_length, max_edit_distance) {
            self.deletes
                .entry(variant_hash(&variant))
                .or_default()
                .push(id);
        }
    }

    pub(crate) fn terms(&self) -> &[String] {
        &self.terms
    }

    pub(crate) fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Variant table sorted by hash.
    pub(crate) fn variant_table(&self) -> Vec<(u64, Vec<TermId>)> {
        let mut table: Vec<(u64, Vec<TermId>)> = self
            .deletes
            .iter()
            .map(|(hash, ids)| (*hash, ids.clone()))
            .collect();
        table.sort_unstable_by_key(|(hash, _)| *hash);
        table
    }

    /// Reassemble a dictionary from stored parts.
    pub(crate) fn from_parts(
        terms: Vec<String>,
        counts: Vec<u64>,
        variants: Vec<(u64, Vec<TermId>)>,
    ) -> Result<Self> {
        if terms.len() != counts.len() {
            return Err(SpellError::snapshot(format!(
                "{} terms but {} counts",
                terms.len(),
                counts.len()
            )));
        }

        let mut ids = AHashMap::with_capacity(terms.len());
        let mut max_length = 0;
        for (id, term) in terms.iter().enumerate() {
            max_length = max_length.max(term.chars().count());
            if ids.insert(term.clone(), id as TermId).is_some() {
                return Err(SpellError::snapshot(format!("duplicate term '{term}'")));
            }
        }

        let mut deletes = AHashMap::with_capacity(variants.len());
        for (hash, term_ids) in variants {
            if let Some(bad) = term_ids.iter().find(|&&id| id as usize >= terms.len()) {
                return Err(SpellError::snapshot(format!(
                    "variant references unknown term id {bad}"
                )));
            }
            deletes.insert(hash, term_ids);
        }

        Ok(TermDictionary {
            terms,
            counts,
            ids,
            deletes,
            max_length,
        })
    }

    /// Recompute the variant table from the stored terms.
    pub(crate) fn reindex(&mut self, prefix_length: usize, max_edit_distance: usize) {
        self.deletes.clear();
        let terms = std::mem::take(&mut self.terms);
        for (id, term) in terms.iter().enumerate() {
            self.index_variants(id as TermId, term, prefix_length, max_edit_distance);
        }
        self.terms = terms;
    }
}

/// Outcome of loading a dictionary or corpus file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Lines read.
    pub lines: usize,
    /// `(term, count)` pairs handed to the dictionary.
    pub entries: usize,
    /// Lines skipped as malformed.
    pub skipped: usize,
    /// Terms that became visible to lookups.
    pub promoted: usize,
}

/// Single-writer batch loader for a [`SpellIndex`].
#[derive(Debug)]
pub struct DictionaryBuilder {
    config: SpellConfig,
    dictionary: TermDictionary,
    staging: AHashMap<String, u64>,
    oracle: Option<Arc<dyn DistanceOracle>>,
}

impl DictionaryBuilder {
    /// Create a builder. Fails if the configuration is invalid.
    pub fn new(config: SpellConfig) -> Result<Self> {
        config.validate()?;
        let dictionary = TermDictionary::with_capacity(config.initial_capacity);
        Ok(DictionaryBuilder {
            config,
            dictionary,
            staging: AHashMap::new(),
            oracle: None,
        })
    }

    /// Verify candidates with a custom oracle instead of the configured algorithm.
    pub fn with_oracle(mut self, oracle: Arc<dyn DistanceOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Configuration of the builder.
    pub fn config(&self) -> &SpellConfig {
        &self.config
    }

    /// Number of promoted terms.
    pub fn len(&self) -> usize {
        self.dictionary.len()
    }

    /// Check if no term has been promoted.
    pub fn is_empty(&self) -> bool {
        self.dictionary.is_empty()
    }

    /// Number of terms still below the count threshold.
    pub fn staged_len(&self) -> usize {
        self.staging.len()
    }

    /// Add `count` occurrences of `term`.
    ///
    /// Returns true if the term was promoted by this call. Counts of promoted
    /// terms accumulate; counts below the threshold accumulate in staging.
    pub fn add_term(&mut self, term: &str, count: u64) -> bool {
        if term.is_empty() {
            return false;
        }
        if count == 0 && self.config.count_threshold > 0 {
            return false;
        }

        if let Some(id) = self.dictionary.id(term) {
            self.dictionary.accumulate(id, count);
            return false;
        }

        let total = match self.staging.remove(term) {
            Some(previous) => previous.saturating_add(count),
            None => count,
        };

        if total < self.config.count_threshold {
            self.staging.insert(term.to_string(), total);
            return false;
        }

        self.dictionary.insert(
            term.to_string(),
            total,
            self.config.prefix_length,
            self.config.max_dictionary_edit_distance,
        );
        true
    }

    /// Load a frequency dictionary file.
    ///
    /// Each line is split on whitespace; `term_index` and `count_index` select
    /// the fields. Terms are lowercased. Malformed lines are skipped.
    pub fn load_dictionary<P: AsRef<Path>>(
        &mut self,
        path: P,
        term_index: usize,
        count_index: usize,
    ) -> Result<LoadStats> {
        let reader = open(path.as_ref())?;
        self.load_dictionary_from_reader(reader, term_index, count_index)
    }

    /// Load a frequency dictionary from any buffered reader.
    pub fn load_dictionary_from_reader<R: BufRead>(
        &mut self,
        reader: R,
        term_index: usize,
        count_index: usize,
    ) -> Result<LoadStats> {
        let mut stats = LoadStats::default();

        for line in reader.lines() {
            let line = line.map_err(|e| SpellError::load(format!("unreadable line: {e}")))?;
            stats.lines += 1;

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 2 {
                stats.skipped += 1;
                continue;
            }

            let parsed = match (fields.get(term_index), fields.get(count_index)) {
                (Some(term), Some(count)) => count.parse::<u64>().ok().map(|c| (*term, c)),
                _ => None,
            };
            let Some((term, count)) = parsed else {
                debug!("skipping dictionary line {}: {line:?}", stats.lines);
                stats.skipped += 1;
                continue;
            };

            stats.entries += 1;
            if self.add_term(&term.to_lowercase(), count) {
                stats.promoted += 1;
            }
        }

        info!(
            "loaded {} dictionary entries ({} promoted, {} lines skipped)",
            stats.entries, stats.promoted, stats.skipped
        );
        Ok(stats)
    }

    /// Build the dictionary from a plain text corpus: every whitespace token
    /// counts once. Tokens are lowercased.
    pub fn load_corpus<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadStats> {
        let reader = open(path.as_ref())?;
        self.load_corpus_from_reader(reader)
    }

    /// Corpus loading from any buffered reader.
    pub fn load_corpus_from_reader<R: BufRead>(&mut self, reader: R) -> Result<LoadStats> {
        let mut stats = LoadStats::default();

        for line in reader.lines() {
            let line = line.map_err(|e| SpellError::load(format!("unreadable line: {e}")))?;
            stats.lines += 1;

            for token in line.split_whitespace() {
                stats.entries += 1;
                if self.add_term(&token.to_lowercase(), 1) {
                    stats.promoted += 1;
                }
            }
        }

        info!(
            "loaded {} corpus tokens ({} terms promoted)",
            stats.entries, stats.promoted
        );
        Ok(stats)
    }

    /// Finish loading. Staged terms below the threshold are dropped.
    pub fn build(self) -> SpellIndex {
        let oracle = self
            .oracle
            .unwrap_or_else(|| self.config.distance.oracle());

        info!(
            "built spelling index: {} terms, {} variant keys, {} staged terms dropped",
            self.dictionary.len(),
            self.dictionary.variant_keys(),
            self.staging.len()
        );

        SpellIndex::from_parts(self.config, self.dictionary, oracle)
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .map_err(|e| SpellError::load(format!("cannot open {}: {e}", path.display())))?;
    Ok(BufReader::new(file))
}
