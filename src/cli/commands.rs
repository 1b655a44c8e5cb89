//! Command implementations for the symcompound CLI.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use log::{info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{Result, SpellError};
use crate::spelling::{BatchConfig, BatchCorrector, DictionaryBuilder, SpellIndex};

/// Execute a CLI command.
pub fn execute_command(args: SymcompoundArgs) -> Result<()> {
    match &args.command {
        Command::Build(build_args) => build_index(build_args.clone(), &args),
        Command::Lookup(lookup_args) => lookup_terms(lookup_args.clone(), &args),
        Command::Correct(correct_args) => correct_text(correct_args.clone(), &args),
        Command::Stats(stats_args) => show_stats(stats_args.clone(), &args),
    }
}

/// Build an index snapshot.
fn build_index(args: BuildArgs, cli_args: &SymcompoundArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(SpellError::invalid_argument(format!(
            "{} already exists. Use --force to overwrite.",
            args.output.display()
        )));
    }

    let config = args.spell_config()?;
    let start = Instant::now();
    let mut builder = DictionaryBuilder::new(config)?;

    let (source, load_stats) = match (&args.dictionary, &args.corpus) {
        (Some(path), _) => (
            path,
            builder.load_dictionary(path, args.term_index, args.count_index)?,
        ),
        (None, Some(path)) => (path, builder.load_corpus(path)?),
        (None, None) => {
            return Err(SpellError::invalid_argument(
                "either --dictionary or --corpus is required",
            ));
        }
    };

    let index = builder.build();

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory {}", parent.display()))?;
        }
    }
    index.save(&args.output)?;

    let stats = index.stats();
    output_result(
        "Index built successfully",
        &BuildResult {
            output: args.output.to_string_lossy().to_string(),
            source: source.to_string_lossy().to_string(),
            lines: load_stats.lines,
            entries: load_stats.entries,
            skipped: load_stats.skipped,
            terms: stats.terms,
            variant_keys: stats.variant_keys,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Look up single terms.
fn lookup_terms(args: LookupArgs, cli_args: &SymcompoundArgs) -> Result<()> {
    let index = load_index(&args.index)?;
    check_distance(&index, args.max_distance)?;

    let start = Instant::now();
    let results = args
        .terms
        .iter()
        .map(|term| {
            let query = term.to_lowercase();
            let mut suggestions = index.lookup(&query, args.max_distance, args.mode);
            if let Some(limit) = args.limit {
                suggestions.truncate(limit);
            }
            TermSuggestions { query, suggestions }
        })
        .collect();

    output_result(
        "",
        &LookupResults {
            results,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Correct text from a file or stdin.
fn correct_text(args: CorrectArgs, cli_args: &SymcompoundArgs) -> Result<()> {
    let index = load_index(&args.index)?;
    check_distance(&index, args.max_distance)?;

    let lines = match &args.input {
        Some(path) => read_lines(
            BufReader::new(
                File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
            ),
        )?,
        None => read_lines(io::stdin().lock())?,
    };

    let corrector = BatchCorrector::new(
        Arc::new(index),
        BatchConfig {
            thread_pool_size: args.threads,
        },
    )?;
    let (corrections, stats) = corrector.correct_lines_with_stats(&lines, args.max_distance);

    for correction in &corrections {
        for part in correction.result.unresolved_parts() {
            warn!(
                "line {}: no correction for {:?}",
                correction.line + 1,
                part.term
            );
        }
    }

    output_result("", &CorrectionReport { corrections, stats }, cli_args)
}

/// Show index statistics.
fn show_stats(args: StatsArgs, cli_args: &SymcompoundArgs) -> Result<()> {
    let index = load_index(&args.index)?;
    output_result(
        &format!("Index statistics for {}", args.index.display()),
        &index.stats(),
        cli_args,
    )
}

fn load_index(path: &Path) -> Result<SpellIndex> {
    let start = Instant::now();
    let index = SpellIndex::load(path)
        .with_context(|| format!("cannot load index {}", path.display()))?;
    info!("index ready in {}ms", start.elapsed().as_millis());
    Ok(index)
}

fn check_distance(index: &SpellIndex, max_distance: usize) -> Result<()> {
    let limit = index.config().max_dictionary_edit_distance;
    if max_distance > limit {
        return Err(SpellError::invalid_argument(format!(
            "max distance {max_distance} exceeds the index limit of {limit}"
        )));
    }
    Ok(())
}

fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let lines = reader
        .lines()
        .collect::<io::Result<Vec<String>>>()
        .context("cannot read input")?;
    Ok(lines)
}
