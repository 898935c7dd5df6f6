//! Engine run metrics.
//!
//! A parse is two cheap phases (lex, assemble); timing them separately makes
//! it obvious when a pathological input is spending its time in the regex.
//!
//! Metrics are always collected; they are a handful of `Instant` reads.

use std::time::Duration;

use crate::Skipped;
use crate::schedule::Schedule;

use super::lexer::Lexeme;

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for [`Parser::run`](super::Parser::run).
    pub total: Duration,
    /// Time spent normalizing and tokenizing.
    pub lex: Duration,
    /// Time spent grouping tokens into rules.
    pub assemble: Duration,
}

/// Parser output bundled with its intermediate products and timings.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub schedule: Option<Schedule>,
    /// Normalized input; lexeme and skipped ranges index into it.
    pub normalized: String,
    pub lexemes: Vec<Lexeme>,
    /// Fragments that contributed nothing to the schedule.
    pub skipped: Vec<Skipped>,
    pub metrics: RunMetrics,
}
