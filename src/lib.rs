//! # Symcompound
//!
//! Compound-aware fuzzy spelling correction for Rust.
//!
//! ## Features
//!
//! - Symmetric-delete candidate index with prefix truncation
//! - Top, closest and exhaustive lookup modes
//! - Merge and split correction of token sequences
//! - Pluggable edit distance
//! - Checksummed binary snapshots
//! - Parallel batch correction
//!
//! ## Example
//!
//! ```
//! use symcompound::prelude::*;
//!
//! let index = SpellIndex::build(SpellConfig::default(), [("the", 100), ("cat", 80)]).unwrap();
//!
//! let suggestions = index.lookup("teh", 2, Verbosity::Top);
//! assert_eq!(suggestions[0].term, "the");
//!
//! let correction = index.correct(&["thecat"], 2);
//! assert_eq!(correction.term, "the cat");
//! ```

pub mod cli;
pub mod error;
pub mod spelling;

pub mod prelude {
    pub use crate::error::{Result, SpellError};
    pub use crate::spelling::{
        CorrectionResult, DistanceAlgorithm, SpellConfig, SpellIndex, SuggestItem, Verbosity,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
