//! Parallel correction of many lines against one shared index.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpellError};
use crate::spelling::corrector::CorrectionResult;
use crate::spelling::index::SpellIndex;

/// Configuration for batch correction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Worker threads. Defaults to the number of CPUs.
    pub thread_pool_size: Option<usize>,
}

impl BatchConfig {
    /// Use a fixed number of worker threads.
    pub fn with_threads(thread_pool_size: usize) -> Self {
        BatchConfig {
            thread_pool_size: Some(thread_pool_size),
        }
    }
}

/// Correction of one input line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineCorrection {
    /// Zero-based position of the line in the input.
    pub line: usize,
    /// The line as read.
    pub input: String,
    /// Correction of the line's whitespace tokens.
    pub result: CorrectionResult,
}

impl LineCorrection {
    /// Check if the corrected text differs from the input tokens.
    pub fn is_changed(&self) -> bool {
        let mut tokens = self.input.split_whitespace();
        let mut corrected = self.result.term.split(' ').filter(|t| !t.is_empty());
        loop {
            match (tokens.next(), corrected.next()) {
                (None, None) => return false,
                (Some(a), Some(b)) if a == b => continue,
                _ => return true,
            }
        }
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Lines processed.
    pub lines: usize,
    /// Lines with at least one unresolved part.
    pub unresolved: usize,
    /// Lines whose output differs from the input.
    pub changed: usize,
    /// Wall time of the run.
    pub execution_time: Duration,
}

impl BatchStats {
    fn collect(corrections: &[LineCorrection], execution_time: Duration) -> Self {
        BatchStats {
            lines: corrections.len(),
            unresolved: corrections
                .iter()
                .filter(|c| !c.result.is_resolved())
                .count(),
            changed: corrections.iter().filter(|c| c.is_changed()).count(),
            execution_time,
        }
    }
}

/// Corrects lines on a dedicated thread pool.
pub struct BatchCorrector {
    index: Arc<SpellIndex>,
    thread_pool: Arc<ThreadPool>,
}

impl BatchCorrector {
    /// Create a batch corrector sharing `index`.
    pub fn new(index: Arc<SpellIndex>, config: BatchConfig) -> Result<Self> {
        let thread_pool_size = config.thread_pool_size.unwrap_or_else(num_cpus::get);
        if thread_pool_size == 0 {
            return Err(SpellError::configuration("thread_pool_size must be at least 1"));
        }

        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(thread_pool_size)
            .thread_name(|i| format!("symcompound-batch-{i}"))
            .build()
            .map_err(|e| SpellError::internal(format!("Failed to create thread pool: {e}")))?;

        Ok(BatchCorrector {
            index,
            thread_pool: Arc::new(thread_pool),
        })
    }

    /// The shared index.
    pub fn index(&self) -> &Arc<SpellIndex> {
        &self.index
    }

    /// Number of worker threads.
    pub fn thread_count(&self) -> usize {
        self.thread_pool.current_num_threads()
    }

    /// Correct every line. The output is in input order, each entry tagged
    /// with its line number.
    pub fn correct_lines<S>(&self, lines: &[S], max_distance: usize) -> Vec<LineCorrection>
    where
        S: AsRef<str> + Sync,
    {
        let index = self.index.as_ref();
        self.thread_pool.install(|| {
            lines
                .par_iter()
                .enumerate()
                .map(|(line, text)| LineCorrection {
                    line,
                    input: text.as_ref().to_string(),
                    result: index.correct_text(text.as_ref(), max_distance),
                })
                .collect()
        })
    }

    /// Correct every line and summarize the run.
    pub fn correct_lines_with_stats<S>(
        &self,
        lines: &[S],
        max_distance: usize,
    ) -> (Vec<LineCorrection>, BatchStats)
    where
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let corrections = self.correct_lines(lines, max_distance);
        let stats = BatchStats::collect(&corrections, start.elapsed());

        info!(
            "corrected {} lines on {} threads: {} changed, {} unresolved",
            stats.lines,
            self.thread_count(),
            stats.changed,
            stats.unresolved
        );
        (corrections, stats)
    }
}
