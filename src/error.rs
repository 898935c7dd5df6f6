//! Error types.
//!
//! Parsing fails fast: the first unrecognized lexicon word or malformed number
//! aborts the parse and no partial `Schedule` is returned.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors raised while turning text into a [`Schedule`](crate::Schedule).
#[derive(Debug, Error)]
pub enum ParseError {
    /// A word in day-name position that the day lexicon cannot resolve.
    #[error("unrecognized day name: '{0}'")]
    UnknownDayName(String),

    /// A word in month-name position that the month lexicon cannot resolve.
    #[error("unrecognized month name: '{0}'")]
    UnknownMonthName(String),

    /// A word in named-time position ("noon", "dusk", ...) with no fixed hour.
    #[error("unrecognized named time: '{0}'")]
    UnknownNamedTime(String),

    /// A numeric field that does not parse as an integer.
    #[error("invalid number '{text}': {source}")]
    InvalidNumber {
        text: String,
        #[source]
        source: ParseIntError,
    },

    /// A numeric field outside its allowed range (hour 25, minute 75, day 40).
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: u32 },

    /// Input text matched no phrase shape and the options ask to reject it.
    #[error("unrecognized text: '{text}'")]
    UnrecognizedText { text: String },

    /// The text parsed cleanly but described no open or closed periods.
    #[error("no schedule rules found in input")]
    Empty,
}

/// Errors raised while building a [`CompiledEvaluator`](crate::CompiledEvaluator).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A `(weekday, minute)` evaluator has no calendar date to gate on.
    #[error("schedule has {0} date-gated span(s); compiled evaluators only cover weekly rules")]
    DateGated(usize),
}

pub(crate) fn parse_number(text: &str) -> Result<u32, ParseError> {
    text.parse::<u32>().map_err(|source| ParseError::InvalidNumber { text: text.to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_reports_offending_text() {
        assert_eq!(parse_number("42").unwrap(), 42);
        let err = parse_number("99999999999").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { ref text, .. } if text == "99999999999"));
        assert!(err.to_string().starts_with("invalid number '99999999999'"));
    }
}
