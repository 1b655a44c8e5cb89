//! Command line argument parsing for the symcompound CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::spelling::{DistanceAlgorithm, SpellConfig, Verbosity};

/// Symcompound - compound-aware fuzzy spelling correction
#[derive(Parser, Debug, Clone)]
#[command(name = "symcompound")]
#[command(about = "Compound-aware fuzzy spelling correction with a symmetric-delete index")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Symcompound Contributors")]
#[command(long_about = None)]
pub struct SymcompoundArgs {
    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SymcompoundArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build an index snapshot from a frequency dictionary or a corpus
    Build(BuildArgs),

    /// Look up suggestions for single terms
    Lookup(LookupArgs),

    /// Correct text line by line
    Correct(CorrectArgs),

    /// Show index statistics
    Stats(StatsArgs),
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Path of the snapshot to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Frequency dictionary file (one "term count" pair per line)
    #[arg(
        short,
        long,
        value_name = "DICTIONARY_FILE",
        conflicts_with = "corpus",
        required_unless_present = "corpus"
    )]
    pub dictionary: Option<PathBuf>,

    /// Plain text corpus; every token counts once
    #[arg(long, value_name = "CORPUS_FILE")]
    pub corpus: Option<PathBuf>,

    /// Field holding the term in dictionary lines
    #[arg(long, default_value = "0")]
    pub term_index: usize,

    /// Field holding the count in dictionary lines
    #[arg(long, default_value = "1")]
    pub count_index: usize,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Largest edit distance lookups may use
    #[arg(long, env = "SYMCOMPOUND_MAX_EDIT_DISTANCE")]
    pub max_edit_distance: Option<usize>,

    /// Number of leading characters indexed per term
    #[arg(long, env = "SYMCOMPOUND_PREFIX_LENGTH")]
    pub prefix_length: Option<usize>,

    /// Minimum cumulative count for a term to be kept
    #[arg(long)]
    pub count_threshold: Option<u64>,

    /// Edit distance algorithm
    #[arg(long)]
    pub distance: Option<DistanceAlgorithm>,

    /// Overwrite an existing snapshot
    #[arg(long)]
    pub force: bool,
}

impl BuildArgs {
    /// Configuration from the config file, if any, with flags applied on top.
    pub fn spell_config(&self) -> Result<SpellConfig> {
        let mut config = match &self.config {
            Some(path) => SpellConfig::from_json_file(path)?,
            None => SpellConfig::default(),
        };

        if let Some(max_edit_distance) = self.max_edit_distance {
            config.max_dictionary_edit_distance = max_edit_distance;
        }
        if let Some(prefix_length) = self.prefix_length {
            config.prefix_length = prefix_length;
        }
        if let Some(count_threshold) = self.count_threshold {
            config.count_threshold = count_threshold;
        }
        if let Some(distance) = self.distance {
            config.distance = distance;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Arguments for single-term lookups
#[derive(Parser, Debug, Clone)]
pub struct LookupArgs {
    /// Index snapshot
    #[arg(short, long, value_name = "INDEX", env = "SYMCOMPOUND_INDEX")]
    pub index: PathBuf,

    /// Terms to look up (lowercased like dictionary entries)
    #[arg(value_name = "TERM", required = true)]
    pub terms: Vec<String>,

    /// Maximum edit distance
    #[arg(short = 'd', long, default_value = "2")]
    pub max_distance: usize,

    /// Suggestion mode: top, closest or all
    #[arg(short = 'm', long, default_value = "top")]
    pub mode: Verbosity,

    /// Maximum number of suggestions per term
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for text correction
#[derive(Parser, Debug, Clone)]
pub struct CorrectArgs {
    /// Index snapshot
    #[arg(short, long, value_name = "INDEX", env = "SYMCOMPOUND_INDEX")]
    pub index: PathBuf,

    /// Input file (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Maximum edit distance per token
    #[arg(short = 'd', long, default_value = "2")]
    pub max_distance: usize,

    /// Number of worker threads
    #[arg(short, long, env = "SYMCOMPOUND_THREADS")]
    pub threads: Option<usize>,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Index snapshot
    #[arg(short, long, value_name = "INDEX", env = "SYMCOMPOUND_INDEX")]
    pub index: PathBuf,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
