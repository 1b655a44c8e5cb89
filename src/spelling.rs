//! Symmetric-delete spelling correction.
//!
//! A [`DictionaryBuilder`] turns `(term, count)` pairs into a read-only
//! [`SpellIndex`]. The index answers single-term lookups through precomputed
//! delete variants and corrects whole token sequences, merging and splitting
//! tokens where whitespace is wrong. Built indexes can be saved to and loaded
//! from binary snapshots.

pub mod batch;
pub mod config;
pub mod corrector;
pub mod dictionary;
pub mod distance;
pub mod index;
pub mod lookup;
pub mod snapshot;
pub mod suggest;

// Re-export commonly used types
pub use batch::{BatchConfig, BatchCorrector, BatchStats, LineCorrection};
pub use config::SpellConfig;
pub use corrector::{CompoundCorrector, CorrectionResult};
pub use dictionary::{DictionaryBuilder, LoadStats, TermDictionary, TermId};
pub use distance::{DistanceAlgorithm, DistanceOracle};
pub use index::{IndexStats, SpellIndex};
pub use suggest::{SuggestItem, Verbosity};
