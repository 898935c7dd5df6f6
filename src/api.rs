use crate::engine::{self, Lexeme};
use crate::error::ParseError;
use crate::schedule::Schedule;
use crate::token::TokenClass;
use crate::{Range, Skipped};
use std::str::FromStr;
use std::time::Duration;

/// What to do with input fragments that no phrase shape recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkippedTextPolicy {
    /// Drop them silently.
    Ignore,
    /// Drop them and emit a `log::warn!` per fragment.
    #[default]
    Warn,
    /// Fail the parse with [`ParseError::UnrecognizedText`].
    Reject,
}

/// Options that affect parsing behavior.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub skipped_text: SkippedTextPolicy,
}

impl Options {
    /// Options that reject any unrecognized text.
    pub fn strict() -> Self {
        Self { skipped_text: SkippedTextPolicy::Reject }
    }
}

/// A compact token summary used in verbose traces.
#[derive(Debug, Clone)]
pub struct TokenSummary {
    pub start: usize,
    pub end: usize,
    pub class: TokenClass,
    /// Slice of the normalized input that matched.
    pub body: String,
    pub preview: String,
}

/// Additional details returned by [`parse_verbose`] and [`parse_verbose_with`].
#[derive(Debug, Clone)]
pub struct ParseDetails {
    /// Lowercased, punctuation-folded input; all byte ranges refer to it.
    pub normalized: String,
    pub tokens: Vec<TokenSummary>,
    pub skipped: Vec<Skipped>,
    /// One line per emitted rule span, open spans first.
    pub rules: Vec<String>,
    /// Total elapsed time.
    pub total: Duration,
    /// Time spent normalizing and tokenizing.
    pub lex: Duration,
    /// Time spent grouping tokens into rule spans.
    pub assemble: Duration,
}

/// Result from [`parse_verbose`] and [`parse_verbose_with`].
#[derive(Debug, Clone)]
pub struct ParseResultVerbose {
    pub text: String,
    pub schedule: Option<Schedule>,
    pub elapsed: Duration,
    pub details: ParseDetails,
}

/// Parse `text` with default [`Options`].
///
/// Returns `Ok(None)` when the text is well-formed but describes no open or
/// closed periods.
///
/// # Example
/// ```
/// use hourspan::parse;
///
/// let schedule = parse("Mon-Fri 9am-5pm").unwrap().unwrap();
/// assert_eq!(schedule.positive().len(), 1);
/// assert!(parse("call for details").unwrap().is_none());
/// ```
pub fn parse(text: &str) -> Result<Option<Schedule>, ParseError> {
    parse_with(text, &Options::default())
}

/// Parse `text` with the provided `options`.
pub fn parse_with(text: &str, options: &Options) -> Result<Option<Schedule>, ParseError> {
    let run = engine::Parser::new(text).run(options)?;
    Ok(run.schedule)
}

pub fn parse_verbose(text: &str) -> Result<ParseResultVerbose, ParseError> {
    parse_verbose_with(text, &Options::default())
}

/// Parse `text` with `options` and return extra (compact) debug details.
///
/// The default [`parse_with`] path does not allocate these traces.
pub fn parse_verbose_with(text: &str, options: &Options) -> Result<ParseResultVerbose, ParseError> {
    let run = engine::Parser::new(text).run(options)?;

    let tokens = run.lexemes.iter().map(|l| lexeme_to_summary(&run.normalized, l)).collect();
    let rules = match &run.schedule {
        Some(schedule) => describe_rules(schedule),
        None => Vec::new(),
    };

    let details = ParseDetails {
        normalized: run.normalized,
        tokens,
        skipped: run.skipped,
        rules,
        total: run.metrics.total,
        lex: run.metrics.lex,
        assemble: run.metrics.assemble,
    };

    Ok(ParseResultVerbose { text: text.to_string(), schedule: run.schedule, elapsed: run.metrics.total, details })
}

impl FromStr for Schedule {
    type Err = ParseError;

    /// Parse with default options; text that yields no rules is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)?.ok_or(ParseError::Empty)
    }
}

fn describe_rules(schedule: &Schedule) -> Vec<String> {
    let open = schedule.positive().iter().map(|s| format!("open   {s}"));
    let closed = schedule.negative().iter().map(|s| format!("closed {s}"));
    open.chain(closed).collect()
}

fn lexeme_to_summary(normalized: &str, lexeme: &Lexeme) -> TokenSummary {
    let Range { start, end } = lexeme.range.clone();
    let preview: String = format!("{:?}", lexeme.token).chars().take(80).collect();

    TokenSummary {
        start,
        end,
        class: lexeme.token.class(),
        body: normalized.get(start..end).unwrap_or("").to_string(),
        preview,
    }
}
