//! Business-hours text parsing.
//!
//! Turns free-form opening-hours text ("Mon-Fri 9am-5pm, closed Sun") into a
//! compact [`Schedule`] that answers "is it open at this instant?".
//!
//! ```
//! use chrono::NaiveDate;
//!
//! let schedule = hourspan::parse("Mon-Fri 9am-5pm, closed Wed").unwrap().unwrap();
//! let thursday_noon = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let wednesday_noon = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap().and_hms_opt(12, 0, 0).unwrap();
//!
//! assert!(schedule.is_open(&thursday_noon));
//! assert!(!schedule.is_open(&wednesday_noon));
//! ```

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod evaluator;
mod lexicon;
mod schedule;
mod token;


pub use api::{
    Options, ParseDetails, ParseResultVerbose, SkippedTextPolicy, TokenSummary, parse, parse_verbose, parse_verbose_with,
    parse_with,
};
pub use error::{CompileError, ParseError};
pub use evaluator::{BitmapEvaluator, CompiledEvaluator, EvaluatorKind, InterpretedEvaluator};
pub use lexicon::{Meridiem, month_from_name, weekday_from_name};
pub use schedule::{
    CalendarDate, DateSpan, DayMask, MINUTES_PER_DAY, MinuteOfDay, Schedule, ScheduleRule, ScheduleRuleSpan,
};
pub use token::{ClockTime, ScheduleToken, TokenClass, resolve_hour_range};

// --- Shared types -----------------------------------------------------------

/// Byte range into the normalized input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}

/// A fragment of input that contributed nothing to the schedule.
///
/// `start`/`end` are byte offsets into the normalized text (see
/// [`ParseDetails::normalized`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub start: usize,
    pub end: usize,
    pub text: String,
}
