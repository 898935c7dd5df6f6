//! Compiled evaluators.
//!
//! For call-heavy use a [`Schedule`] can be specialized ahead of time into a
//! `(weekday, minute) -> bool` predicate. Two strategies sit behind the one
//! [`CompiledEvaluator`] trait:
//!
//! - [`InterpretedEvaluator`]: the rules flattened into two plain tables
//!   (closed first, then open) and scanned per call.
//! - [`BitmapEvaluator`]: every minute of the week precomputed into a
//!   10,080-bit table; a query is one shift and mask, with no allocation.
//!
//! Both honour closed overrides, and both agree with [`Schedule::is_open`] for
//! every weekday and minute. A weekday and a minute carry no calendar date, so
//! schedules with date-gated spans cannot be compiled.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Weekday};

use crate::error::CompileError;
use crate::schedule::{DayMask, MINUTES_PER_DAY, MinuteOfDay, Schedule, ScheduleRule, ScheduleRuleSpan};

const WEEK_MINUTES: usize = 7 * MINUTES_PER_DAY as usize;
const BITMAP_WORDS: usize = WEEK_MINUTES.div_ceil(64);

/// Strategy used by [`Schedule::compile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluatorKind {
    #[default]
    Interpreted,
    Bitmap,
}

/// A precompiled open/closed predicate over (weekday, minute of day).
pub trait CompiledEvaluator: Send + Sync + fmt::Debug {
    fn evaluate(&self, day: Weekday, minute: MinuteOfDay) -> bool;

    /// Evaluate at a wall-clock timestamp, ignoring its date.
    fn evaluate_at(&self, at: &NaiveDateTime) -> bool {
        self.evaluate(at.weekday(), MinuteOfDay::of(at))
    }
}

/// Flattened rule tables, scanned closed-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpretedEvaluator {
    closed: Vec<ScheduleRule>,
    open: Vec<ScheduleRule>,
}

impl InterpretedEvaluator {
    pub fn new(schedule: &Schedule) -> Result<Self, CompileError> {
        let gated = schedule.date_gated_spans();
        if gated > 0 {
            return Err(CompileError::DateGated(gated));
        }
        Ok(Self { closed: flatten(schedule.negative()), open: flatten(schedule.positive()) })
    }
}

fn flatten(spans: &[ScheduleRuleSpan]) -> Vec<ScheduleRule> {
    spans.iter().flat_map(|s| s.rules().iter().copied()).collect()
}

impl CompiledEvaluator for InterpretedEvaluator {
    fn evaluate(&self, day: Weekday, minute: MinuteOfDay) -> bool {
        let day = DayMask::from_weekday(day);
        if self.closed.iter().any(|r| r.matches(day, minute)) {
            return false;
        }
        self.open.iter().any(|r| r.matches(day, minute))
    }
}

/// One bit per minute of the week, Sunday 00:00 first.
#[derive(Clone, PartialEq, Eq)]
pub struct BitmapEvaluator {
    bits: [u64; BITMAP_WORDS],
}

impl BitmapEvaluator {
    pub fn new(schedule: &Schedule) -> Result<Self, CompileError> {
        let table = InterpretedEvaluator::new(schedule)?;
        let mut bits = [0u64; BITMAP_WORDS];

        for day in [Weekday::Sun, Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat] {
            for minute in (0..MINUTES_PER_DAY).filter_map(MinuteOfDay::new) {
                if table.evaluate(day, minute) {
                    let idx = slot(day, minute);
                    bits[idx / 64] |= 1 << (idx % 64);
                }
            }
        }
        Ok(Self { bits })
    }

    /// Number of open minutes in a week.
    pub fn open_minutes(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }
}

fn slot(day: Weekday, minute: MinuteOfDay) -> usize {
    day.num_days_from_sunday() as usize * MINUTES_PER_DAY as usize + minute.get() as usize
}

impl CompiledEvaluator for BitmapEvaluator {
    fn evaluate(&self, day: Weekday, minute: MinuteOfDay) -> bool {
        let idx = slot(day, minute);
        self.bits[idx / 64] & (1 << (idx % 64)) != 0
    }
}

impl fmt::Debug for BitmapEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapEvaluator").field("open_minutes", &self.open_minutes()).finish()
    }
}

impl Schedule {
    /// Specialize this schedule into a `(weekday, minute)` predicate.
    pub fn compile(&self, kind: EvaluatorKind) -> Result<Box<dyn CompiledEvaluator>, CompileError> {
        Ok(match kind {
            EvaluatorKind::Interpreted => Box::new(InterpretedEvaluator::new(self)?),
            EvaluatorKind::Bitmap => Box::new(BitmapEvaluator::new(self)?),
        })
    }
}
