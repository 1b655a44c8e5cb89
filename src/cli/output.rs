//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, SymcompoundArgs};
use crate::error::Result;
use crate::spelling::{BatchStats, IndexStats, LineCorrection, SuggestItem};

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn print_human(&self, args: &SymcompoundArgs);
}

/// Result structure for index builds.
#[derive(Debug, Serialize, Deserialize)]
pub struct BuildResult {
    pub output: String,
    pub source: String,
    pub lines: usize,
    pub entries: usize,
    pub skipped: usize,
    pub terms: usize,
    pub variant_keys: usize,
    pub duration_ms: u64,
}

/// Suggestions for one looked-up term.
#[derive(Debug, Serialize, Deserialize)]
pub struct TermSuggestions {
    pub query: String,
    pub suggestions: Vec<SuggestItem>,
}

/// Result structure for lookups.
#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResults {
    pub results: Vec<TermSuggestions>,
    pub duration_ms: u64,
}

/// Result structure for text correction.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorrectionReport {
    pub corrections: Vec<LineCorrection>,
    pub stats: BatchStats,
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &SymcompoundArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            output_human(message, result, args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: HumanOutput>(message: &str, result: &T, args: &SymcompoundArgs) {
    if args.verbosity() > 0 && !message.is_empty() {
        println!("{message}");
        println!();
    }
    result.print_human(args);
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &SymcompoundArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

impl HumanOutput for BuildResult {
    fn print_human(&self, _args: &SymcompoundArgs) {
        println!("Snapshot: {}", self.output);
        println!("Source: {}", self.source);
        println!(
            "Lines: {} ({} entries, {} skipped)",
            self.lines, self.entries, self.skipped
        );
        println!("Terms: {}", self.terms);
        println!("Variant keys: {}", self.variant_keys);
        println!("Duration: {}ms", self.duration_ms);
    }
}

impl HumanOutput for LookupResults {
    fn print_human(&self, args: &SymcompoundArgs) {
        for result in &self.results {
            if result.suggestions.is_empty() {
                println!("{}: no suggestions", result.query);
                continue;
            }

            println!("{}:", result.query);
            for suggestion in &result.suggestions {
                println!(
                    "  {} (distance {}, count {})",
                    suggestion.term, suggestion.distance, suggestion.count
                );
            }
        }

        if args.verbosity() > 1 {
            println!();
            println!("Lookup took {}ms", self.duration_ms);
        }
    }
}

impl HumanOutput for CorrectionReport {
    fn print_human(&self, args: &SymcompoundArgs) {
        for correction in &self.corrections {
            if args.verbosity() > 1 {
                println!(
                    "{}\t{}\t{}",
                    correction.result.term, correction.result.distance, correction.result.count
                );
            } else {
                println!("{}", correction.result.term);
            }
        }
    }
}

impl HumanOutput for IndexStats {
    fn print_human(&self, _args: &SymcompoundArgs) {
        println!("Terms: {}", self.terms);
        println!("Total count: {}", self.total_count);
        println!("Longest term: {} characters", self.max_length);
        println!(
            "Variants: {} keys, {} entries",
            self.variant_keys, self.variant_entries
        );
        println!(
            "Max edit distance: {}",
            self.max_dictionary_edit_distance
        );
        println!("Prefix length: {}", self.prefix_length);
        println!("Count threshold: {}", self.count_threshold);
        println!("Distance: {}", self.distance);
    }
}
