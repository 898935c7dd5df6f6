//! Lexer tokens.
//!
//! A token is created once per lexer match, consumed once by the assembler and
//! then dropped. Each kind carries only the fields relevant to it.

use chrono::Weekday;

use crate::lexicon::{Meridiem, last_day_of_month};
use crate::schedule::{CalendarDate, DateSpan, DayMask, MINUTES_PER_DAY, MinuteOfDay};

const HALF_DAY: u32 = 12 * 60;

/// Coarse token class used by the assembler's grouping state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Hours,
    DaysOfWeek,
    Dates,
    Meta,
}

/// One side of an hour range as written: digits with an optional meridiem, or
/// a named time with its fixed hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Option<Meridiem>,
    /// Came from a named time ("noon", "dusk"); never subject to inference.
    pub named: bool,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32, meridiem: Option<Meridiem>) -> Self {
        Self { hour, minute, meridiem, named: false }
    }

    pub fn named(hour: u32, minute: u32) -> Self {
        Self { hour, minute, meridiem: None, named: true }
    }

    /// Whether the side is pinned to one half of the day.
    pub fn has_meridiem(&self) -> bool {
        self.meridiem.is_some() || self.named
    }

    /// Minutes since midnight on a 24h clock. May reach 1440 for "24:00".
    pub fn minutes(&self) -> u32 {
        let hour = match (self.meridiem, self.hour) {
            (Some(Meridiem::Am), 12) => 0,
            (Some(Meridiem::Pm), h) if h < 12 => h + 12,
            (_, h) => h,
        };
        hour * 60 + self.minute
    }
}

/// Resolve both sides of an hour range to minutes of day, inferring the
/// meridiem of a side that does not state one.
///
/// - "1-5pm": the end is PM and the start has none; the start moves to the
///   afternoon when that keeps it at or before the end.
/// - "10-2": neither side has one and the range runs backwards within the
///   morning; the end moves to the afternoon.
pub fn resolve_hour_range(start: &ClockTime, end: &ClockTime) -> (MinuteOfDay, MinuteOfDay) {
    let mut from = start.minutes();
    let mut to = end.minutes();

    if end.meridiem == Some(Meridiem::Pm) && !start.has_meridiem() && from + HALF_DAY <= to {
        from += HALF_DAY;
    } else if !start.has_meridiem() && !end.has_meridiem() && from > to && from < HALF_DAY && to < HALF_DAY {
        to += HALF_DAY;
    }

    (wrap_minutes(from), wrap_minutes(to))
}

/// Fold an extended minute value ("24:00", "26:00") back into one day.
pub(crate) fn wrap_minutes(minutes: u32) -> MinuteOfDay {
    let wrapped = (minutes % MINUTES_PER_DAY as u32) as u16;
    MinuteOfDay::new(wrapped).unwrap_or(MinuteOfDay::MIDNIGHT)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleToken {
    /// "24 hours", "24/7".
    AllDay,
    /// A single day or a named day set ("daily", "weekends").
    SingleDay { days: DayMask },
    DayRange { start: Weekday, end: Weekday },
    /// A lone time ("at 5pm"); not an interval on its own.
    SingleHour { at: ClockTime },
    HourRange { start: ClockTime, end: ClockTime },
    /// "until 10pm", "till midnight".
    Until { end: ClockTime },
    SingleDate { date: CalendarDate },
    DateRange { start: CalendarDate, end: CalendarDate },
    SingleMonth { month: u8 },
    MonthRange { start: CalendarDate, end: CalendarDate },
    Separator,
    Open,
    Closed,
}

impl ScheduleToken {
    pub fn class(&self) -> TokenClass {
        match self {
            Self::AllDay | Self::SingleHour { .. } | Self::HourRange { .. } | Self::Until { .. } => TokenClass::Hours,
            Self::SingleDay { .. } | Self::DayRange { .. } => TokenClass::DaysOfWeek,
            Self::SingleDate { .. } | Self::DateRange { .. } | Self::SingleMonth { .. } | Self::MonthRange { .. } => {
                TokenClass::Dates
            }
            Self::Separator | Self::Open | Self::Closed => TokenClass::Meta,
        }
    }

    /// Day mask of a day-class token.
    pub fn day_mask(&self) -> Option<DayMask> {
        match self {
            Self::SingleDay { days } => Some(*days),
            Self::DayRange { start, end } => Some(DayMask::range(*start, *end)),
            _ => None,
        }
    }

    /// Start/end minutes of an hour-class token. `AllDay` is the 0-0 sentinel;
    /// `Until` runs from midnight; `SingleHour` has no range.
    pub fn minute_range(&self) -> Option<(MinuteOfDay, MinuteOfDay)> {
        match self {
            Self::AllDay => Some((MinuteOfDay::MIDNIGHT, MinuteOfDay::MIDNIGHT)),
            Self::HourRange { start, end } => Some(resolve_hour_range(start, end)),
            Self::Until { end } => Some((MinuteOfDay::MIDNIGHT, wrap_minutes(end.minutes()))),
            _ => None,
        }
    }

    /// Date span of a date-class token. A single month covers the whole month.
    pub fn date_span(&self) -> Option<DateSpan> {
        match self {
            Self::SingleDate { date } => Some(DateSpan::single(*date)),
            Self::DateRange { start, end } | Self::MonthRange { start, end } => Some(DateSpan::new(*start, *end)),
            Self::SingleMonth { month } => Some(DateSpan::new(
                CalendarDate::new(*month, 1, None),
                CalendarDate::new(*month, last_day_of_month(*month), None),
            )),
            _ => None,
        }
    }
}
