//! Parse driver.
//!
//! ```text
//! input ── normalize + tokenize (lexer.rs) ──> [Lexeme]
//!                                                │
//!            Assembler::assemble (assembler.rs) <┘
//!                     │
//!                     v
//!      skipped-text policy ──> RunResult { schedule, lexemes, skipped }
//! ```
//!
//! The run is a pure function of the input and the options: no I/O, no shared
//! mutable state, and the same text always yields the same schedule.

use std::time::Instant;

use super::assembler::Assembler;
use super::lexer::tokenize;
use super::metrics::{RunMetrics, RunResult};
use crate::error::ParseError;
use crate::{Options, Range, SkippedTextPolicy};

#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    input: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser { input }
    }

    /// Lex, assemble and apply the skipped-text policy.
    pub fn run(&self, options: &Options) -> Result<RunResult, ParseError> {
        let started = Instant::now();

        let lexed = tokenize(self.input)?;
        let lex = started.elapsed();

        let assemble_started = Instant::now();
        let assembly = Assembler::assemble(&lexed.lexemes);
        let assemble = assemble_started.elapsed();

        let mut skipped = lexed.skipped;
        for &idx in &assembly.ignored {
            let Range { start, end } = lexed.lexemes[idx].range.clone();
            skipped.push(crate::Skipped { start, end, text: lexed.normalized[start..end].to_string() });
        }
        skipped.sort_by_key(|s| s.start);

        match options.skipped_text {
            SkippedTextPolicy::Ignore => {}
            SkippedTextPolicy::Warn => {
                for s in &skipped {
                    log::warn!("ignoring unrecognized text '{}' at {}..{}", s.text, s.start, s.end);
                }
            }
            SkippedTextPolicy::Reject => {
                if let Some(s) = skipped.first() {
                    return Err(ParseError::UnrecognizedText { text: s.text.clone() });
                }
            }
        }

        if log::log_enabled!(log::Level::Debug) {
            let kinds: Vec<String> = lexed.lexemes.iter().map(|l| format!("{:?}", l.token)).collect();
            log::debug!("tokens for '{}': [{}]", lexed.normalized.escape_debug(), kinds.join(", "));
        }

        Ok(RunResult {
            schedule: assembly.schedule,
            normalized: lexed.normalized,
            lexemes: lexed.lexemes,
            skipped,
            metrics: RunMetrics { total: started.elapsed(), lex, assemble },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, policy: SkippedTextPolicy) -> Result<RunResult, ParseError> {
        Parser::new(input).run(&Options { skipped_text: policy })
    }

    #[test]
    fn run_reports_lexemes_and_metrics() {
        let res = run("Mon-Fri 9-5", SkippedTextPolicy::Ignore).unwrap();
        assert!(res.schedule.is_some());
        assert_eq!(res.lexemes.len(), 2);
        assert!(res.metrics.lex <= res.metrics.total);
        assert!(res.metrics.assemble <= res.metrics.total);
    }

    #[test]
    fn lone_times_are_reported_as_skipped() {
        let res = run("Mon-Fri 9-5, last entry 4:30pm", SkippedTextPolicy::Ignore).unwrap();
        let texts: Vec<&str> = res.skipped.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["last entry", "4:30pm"]);
    }

    #[test]
    fn reject_policy_fails_on_first_skipped_fragment() {
        let err = run("Mon-Fri 9-5 by arrangement", SkippedTextPolicy::Reject).unwrap_err();
        assert!(matches!(err, ParseError::UnrecognizedText { ref text } if text == "by arrangement"));
    }

    #[test]
    fn reject_policy_accepts_clean_input() {
        assert!(run("Mon-Fri 9am-5pm; Sat 10-2", SkippedTextPolicy::Reject).is_ok());
    }
}
