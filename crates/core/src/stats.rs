use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::pipeline::Stage;

/// Monotonic counters shared by every call on a [`Pipeline`](crate::Pipeline).
#[derive(Debug, Default)]
pub struct PipelineStats {
    processed: AtomicU64,
    succeeded: AtomicU64,
    lexical_errors: AtomicU64,
    syntax_errors: AtomicU64,
    semantic_errors: AtomicU64,
    warnings: AtomicU64,
    unknown_words: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Commands received.
    pub processed: u64,
    /// Commands that produced code.
    pub succeeded: u64,
    /// Commands rejected by the tokenizer.
    pub lexical_errors: u64,
    /// Commands rejected by the parser.
    pub syntax_errors: u64,
    /// Commands rejected by the validator.
    pub semantic_errors: u64,
    /// Warning diagnostics emitted.
    pub warnings: u64,
    /// Words outside the lexicon.
    pub unknown_words: u64,
}

impl StatsSnapshot {
    /// Commands rejected at any stage.
    pub fn failed(&self) -> u64 {
        self.lexical_errors + self.syntax_errors + self.semantic_errors
    }

    /// Percentage of processed commands that succeeded, or `None` before the first one.
    pub fn success_rate(&self) -> Option<f64> {
        (self.processed > 0).then(|| self.succeeded as f64 * 100.0 / self.processed as f64)
    }
}

impl PipelineStats {
    pub(crate) fn record_received(&self, unknown_words: usize) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        self.unknown_words
            .fetch_add(unknown_words as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self, warnings: usize) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.warnings.fetch_add(warnings as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, stage: Stage) {
        let counter = match stage {
            Stage::Lexical => &self.lexical_errors,
            Stage::Syntax => &self.syntax_errors,
            Stage::Semantic => &self.semantic_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            lexical_errors: self.lexical_errors.load(Ordering::Relaxed),
            syntax_errors: self.syntax_errors.load(Ordering::Relaxed),
            semantic_errors: self.semantic_errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            unknown_words: self.unknown_words.load(Ordering::Relaxed),
        }
    }
}
