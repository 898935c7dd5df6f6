//! Schedule model and matching semantics.
//!
//! Everything in this module is an immutable value: a [`Schedule`] is built
//! once by the assembler and then queried any number of times, from any number
//! of threads, without locking.
//!
//! ```text
//! Schedule
//!   ├─ negative: [ScheduleRuleSpan]   closed overrides, checked first
//!   └─ positive: [ScheduleRuleSpan]   open periods
//!
//! ScheduleRuleSpan
//!   ├─ dates: Option<[DateSpan]>      None = every date
//!   └─ rules: [ScheduleRule]          day mask + minute range
//! ```

use std::fmt;

use chrono::{Datelike, Local, Timelike, Weekday};

pub const MINUTES_PER_DAY: u16 = 24 * 60;

bitflags::bitflags! {
    /// Set of days of the week, Sunday = bit 0 through Saturday = bit 6.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DayMask: u8 {
        const SUNDAY    = 1 << 0;
        const MONDAY    = 1 << 1;
        const TUESDAY   = 1 << 2;
        const WEDNESDAY = 1 << 3;
        const THURSDAY  = 1 << 4;
        const FRIDAY    = 1 << 5;
        const SATURDAY  = 1 << 6;

        const WEEKDAYS = Self::MONDAY.bits()
            | Self::TUESDAY.bits()
            | Self::WEDNESDAY.bits()
            | Self::THURSDAY.bits()
            | Self::FRIDAY.bits();
        const WEEKENDS = Self::SATURDAY.bits() | Self::SUNDAY.bits();
        const ALL_WEEK = Self::WEEKDAYS.bits() | Self::WEEKENDS.bits();
    }
}

/// Display order for day lists: Monday first.
const DISPLAY_ORDER: [Weekday; 7] =
    [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun];

impl DayMask {
    /// The single-bit mask for `day`.
    pub fn from_weekday(day: Weekday) -> Self {
        Self::from_bits_truncate(1 << day.num_days_from_sunday())
    }

    /// Inclusive range of days, wrapping past Saturday ("Fri-Mon").
    pub fn range(start: Weekday, end: Weekday) -> Self {
        let mut mask = Self::empty();
        let mut day = start;
        loop {
            mask |= Self::from_weekday(day);
            if day == end {
                return mask;
            }
            day = day.succ();
        }
    }

    /// Each day in the set shifted back by one, Sunday wrapping to Saturday.
    pub fn previous_day(self) -> Self {
        let bits = self.bits();
        Self::from_bits_truncate((bits >> 1) | (bits << 6))
    }

    pub fn contains_day(self, day: Weekday) -> bool {
        self.contains(Self::from_weekday(day))
    }
}

impl fmt::Display for DayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ALL_WEEK {
            return f.write_str("every day");
        }
        if self.is_empty() {
            return f.write_str("no days");
        }

        // Collapse runs of three or more consecutive days into "Mon-Fri".
        let mut parts: Vec<String> = Vec::new();
        let mut idx = 0;
        while idx < DISPLAY_ORDER.len() {
            if !self.contains_day(DISPLAY_ORDER[idx]) {
                idx += 1;
                continue;
            }
            let start = idx;
            while idx + 1 < DISPLAY_ORDER.len() && self.contains_day(DISPLAY_ORDER[idx + 1]) {
                idx += 1;
            }
            match idx - start {
                0 => parts.push(format!("{}", DISPLAY_ORDER[start])),
                1 => {
                    parts.push(format!("{}", DISPLAY_ORDER[start]));
                    parts.push(format!("{}", DISPLAY_ORDER[idx]));
                }
                _ => parts.push(format!("{}-{}", DISPLAY_ORDER[start], DISPLAY_ORDER[idx])),
            }
            idx += 1;
        }
        f.write_str(&parts.join(","))
    }
}

/// Minute of the day, `0..1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub const MIDNIGHT: Self = Self(0);

    pub fn new(minute: u16) -> Option<Self> {
        (minute < MINUTES_PER_DAY).then_some(Self(minute))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self((hour * 60 + minute) as u16))
    }

    /// Minute of day of a timestamp; seconds are truncated.
    pub fn of<T: Timelike>(at: &T) -> Self {
        Self((at.hour() * 60 + at.minute()) as u16)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// One weekly rule: a set of days and a minute range.
///
/// `start < end` is a same-day range and `start >= end` runs past midnight into
/// the following day. The 00:00-00:00 rule alone covers the whole of each day in
/// `days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleRule {
    days: DayMask,
    start: MinuteOfDay,
    end: MinuteOfDay,
}

impl ScheduleRule {
    pub fn new(days: DayMask, start: MinuteOfDay, end: MinuteOfDay) -> Self {
        Self { days: days & DayMask::ALL_WEEK, start, end }
    }

    /// The 0-0 sentinel: open (or closed) for the whole of each day.
    pub fn all_day(days: DayMask) -> Self {
        Self::new(days, MinuteOfDay::MIDNIGHT, MinuteOfDay::MIDNIGHT)
    }

    pub fn days(&self) -> DayMask {
        self.days
    }

    pub fn start(&self) -> MinuteOfDay {
        self.start
    }

    pub fn end(&self) -> MinuteOfDay {
        self.end
    }

    pub fn is_all_day(&self) -> bool {
        self.start == MinuteOfDay::MIDNIGHT && self.end == MinuteOfDay::MIDNIGHT
    }

    pub fn is_overnight(&self) -> bool {
        self.start >= self.end && !self.is_all_day()
    }

    /// Match a single day bit and a minute of that day. Range ends are exclusive.
    pub fn matches(&self, day: DayMask, minute: MinuteOfDay) -> bool {
        if self.is_all_day() {
            return self.days.contains(day);
        }
        if self.start < self.end {
            return self.days.contains(day) && minute > self.start && minute < self.end;
        }
        (self.days.contains(day) && minute > self.start) || (self.days.contains(day.previous_day()) && minute < self.end)
    }
}

impl fmt::Display for ScheduleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all_day() {
            write!(f, "{} all day", self.days)
        } else {
            write!(f, "{} {}-{}", self.days, self.start, self.end)
        }
    }
}

/// A calendar date with an optional year (`Dec 25` or `Dec 25 2024`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarDate {
    pub month: u8,
    pub day: u8,
    pub year: Option<i32>,
}

impl CalendarDate {
    pub fn new(month: u8, day: u8, year: Option<i32>) -> Self {
        Self { month, day, year }
    }

    fn month_day(&self) -> (u8, u8) {
        (self.month, self.day)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{year:04}-{:02}-{:02}", self.month, self.day),
            None => write!(f, "--{:02}-{:02}", self.month, self.day),
        }
    }
}

/// Inclusive range of calendar dates.
///
/// When both ends carry a year the range compares full dates. Otherwise it
/// compares (month, day) and may wrap past December ("Nov 15 - Feb 15").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateSpan {
    start: CalendarDate,
    end: CalendarDate,
}

impl DateSpan {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self { start, end }
    }

    pub fn single(date: CalendarDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn start(&self) -> CalendarDate {
        self.start
    }

    pub fn end(&self) -> CalendarDate {
        self.end
    }

    pub fn matches(&self, year: i32, month: u32, day: u32) -> bool {
        let key = (month as u8, day as u8);
        if let (Some(start_year), Some(end_year)) = (self.start.year, self.end.year) {
            let probe = (year, key);
            return (start_year, self.start.month_day()) <= probe && probe <= (end_year, self.end.month_day());
        }

        let (start, end) = (self.start.month_day(), self.end.month_day());
        if start <= end { start <= key && key <= end } else { key >= start || key <= end }
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end { write!(f, "{}", self.start) } else { write!(f, "{}..{}", self.start, self.end) }
    }
}

/// Rules that apply together, optionally gated to a set of date spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRuleSpan {
    dates: Option<Vec<DateSpan>>,
    rules: Vec<ScheduleRule>,
}

impl ScheduleRuleSpan {
    pub fn new(dates: Option<Vec<DateSpan>>, rules: Vec<ScheduleRule>) -> Self {
        // An empty gate would never match; treat it as "every date".
        let dates = dates.filter(|d| !d.is_empty());
        Self { dates, rules }
    }

    pub fn dates(&self) -> Option<&[DateSpan]> {
        self.dates.as_deref()
    }

    pub fn rules(&self) -> &[ScheduleRule] {
        &self.rules
    }

    pub fn is_date_gated(&self) -> bool {
        self.dates.is_some()
    }

    pub(crate) fn applies_on(&self, year: i32, month: u32, day: u32) -> bool {
        match &self.dates {
            None => true,
            Some(spans) => spans.iter().any(|s| s.matches(year, month, day)),
        }
    }

    pub(crate) fn matches_time(&self, day: DayMask, minute: MinuteOfDay) -> bool {
        self.rules.iter().any(|r| r.matches(day, minute))
    }

    pub fn matches<T: Datelike + Timelike>(&self, at: &T) -> bool {
        self.applies_on(at.year(), at.month(), at.day())
            && self.matches_time(DayMask::from_weekday(at.weekday()), MinuteOfDay::of(at))
    }
}

impl fmt::Display for ScheduleRuleSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<String> = self.rules.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", rules.join("; "))?;
        if let Some(dates) = &self.dates {
            let dates: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
            write!(f, " [on {}]", dates.join(", "))?;
        }
        Ok(())
    }
}

/// A parsed opening-hours schedule.
///
/// Closed (negative) spans override open (positive) spans; anything matched by
/// neither is closed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    positive: Vec<ScheduleRuleSpan>,
    negative: Vec<ScheduleRuleSpan>,
}

impl Schedule {
    pub fn new(positive: Vec<ScheduleRuleSpan>, negative: Vec<ScheduleRuleSpan>) -> Self {
        Self { positive, negative }
    }

    /// Open spans.
    pub fn positive(&self) -> &[ScheduleRuleSpan] {
        &self.positive
    }

    /// Closed-override spans.
    pub fn negative(&self) -> &[ScheduleRuleSpan] {
        &self.negative
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    /// Number of spans, on either side, restricted to particular dates.
    pub fn date_gated_spans(&self) -> usize {
        self.positive.iter().chain(&self.negative).filter(|s| s.is_date_gated()).count()
    }

    /// Whether the location is open at `at` (interpreted in the schedule's local time).
    pub fn is_open<T: Datelike + Timelike>(&self, at: &T) -> bool {
        let (year, month, day) = (at.year(), at.month(), at.day());
        let weekday = DayMask::from_weekday(at.weekday());
        let minute = MinuteOfDay::of(at);

        let hit = |span: &ScheduleRuleSpan| span.applies_on(year, month, day) && span.matches_time(weekday, minute);

        if self.negative.iter().any(hit) {
            return false;
        }
        self.positive.iter().any(hit)
    }

    /// [`is_open`](Self::is_open) against the local wall clock.
    pub fn is_open_now(&self) -> bool {
        self.is_open(&Local::now().naive_local())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.positive {
            writeln!(f, "open   {span}")?;
        }
        for span in &self.negative {
            writeln!(f, "closed {span}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    fn minute(h: u32, m: u32) -> MinuteOfDay {
        MinuteOfDay::from_hm(h, m).unwrap()
    }

    #[test]
    fn named_day_sets() {
        assert_eq!(DayMask::WEEKDAYS, days!(MONDAY, TUESDAY, WEDNESDAY, THURSDAY, FRIDAY));
        assert_eq!(DayMask::WEEKENDS, days!(SATURDAY, SUNDAY));
        assert_eq!(DayMask::ALL_WEEK.bits(), 0x7f);
    }

    #[test]
    fn day_range_wraps_past_saturday() {
        assert_eq!(DayMask::range(Weekday::Mon, Weekday::Fri), DayMask::WEEKDAYS);
        assert_eq!(DayMask::range(Weekday::Fri, Weekday::Mon), days!(FRIDAY, SATURDAY, SUNDAY, MONDAY));
        assert_eq!(DayMask::range(Weekday::Wed, Weekday::Wed), DayMask::WEDNESDAY);
    }

    #[test]
    fn previous_day_wraps_sunday_to_saturday() {
        assert_eq!(DayMask::SUNDAY.previous_day(), DayMask::SATURDAY);
        assert_eq!(DayMask::WEDNESDAY.previous_day(), DayMask::TUESDAY);
        assert_eq!(DayMask::ALL_WEEK.previous_day(), DayMask::ALL_WEEK);
    }

    #[test]
    fn day_mask_display_collapses_runs() {
        assert_eq!(DayMask::WEEKDAYS.to_string(), "Mon-Fri");
        assert_eq!(DayMask::WEEKENDS.to_string(), "Sat,Sun");
        assert_eq!(days!(MONDAY, WEDNESDAY).to_string(), "Mon,Wed");
        assert_eq!(DayMask::ALL_WEEK.to_string(), "every day");
    }

    #[test]
    fn same_day_rule_excludes_both_ends() {
        let rule = ScheduleRule::new(DayMask::WEEKDAYS, minute(9, 0), minute(17, 0));
        assert!(rule.matches(DayMask::MONDAY, minute(9, 1)));
        assert!(rule.matches(DayMask::MONDAY, minute(16, 59)));
        assert!(!rule.matches(DayMask::MONDAY, minute(9, 0)));
        assert!(!rule.matches(DayMask::MONDAY, minute(17, 0)));
        assert!(!rule.matches(DayMask::SATURDAY, minute(12, 0)));
    }

    #[test]
    fn overnight_rule_spills_into_next_day() {
        let rule = ScheduleRule::new(DayMask::FRIDAY, minute(22, 0), minute(2, 0));
        assert!(rule.is_overnight());
        assert!(rule.matches(DayMask::FRIDAY, minute(23, 0)));
        assert!(rule.matches(DayMask::SATURDAY, minute(1, 0)));
        assert!(!rule.matches(DayMask::FRIDAY, minute(1, 0)));
        assert!(!rule.matches(DayMask::SATURDAY, minute(23, 0)));
    }

    #[test]
    fn equal_ends_off_midnight_wrap_a_full_day() {
        let rule = ScheduleRule::new(DayMask::MONDAY, minute(9, 0), minute(9, 0));
        assert!(!rule.is_all_day());
        assert!(rule.is_overnight());
        assert!(rule.matches(DayMask::MONDAY, minute(9, 1)));
        assert!(rule.matches(DayMask::TUESDAY, minute(8, 59)));
        assert!(!rule.matches(DayMask::MONDAY, minute(3, 0)));
        assert!(!rule.matches(DayMask::TUESDAY, minute(9, 30)));
    }

    #[test]
    fn all_day_sentinel_covers_midnight() {
        let rule = ScheduleRule::all_day(DayMask::ALL_WEEK);
        assert!(rule.matches(DayMask::SUNDAY, MinuteOfDay::MIDNIGHT));
        assert!(rule.matches(DayMask::SATURDAY, minute(23, 59)));
    }

    #[test]
    fn date_span_wraps_year_without_years() {
        let span = DateSpan::new(CalendarDate::new(11, 15, None), CalendarDate::new(2, 15, None));
        assert!(span.matches(2024, 12, 31));
        assert!(span.matches(2025, 1, 10));
        assert!(!span.matches(2025, 3, 1));
    }

    #[test]
    fn date_span_with_years_compares_full_dates() {
        let span = DateSpan::new(CalendarDate::new(12, 20, Some(2024)), CalendarDate::new(1, 5, Some(2025)));
        assert!(span.matches(2024, 12, 25));
        assert!(span.matches(2025, 1, 5));
        assert!(!span.matches(2025, 12, 25));
    }

    #[test]
    fn closed_spans_override_open_spans() {
        let open = ScheduleRuleSpan::new(None, vec![ScheduleRule::new(DayMask::WEEKDAYS, minute(9, 0), minute(17, 0))]);
        let closed = ScheduleRuleSpan::new(None, vec![ScheduleRule::all_day(DayMask::WEDNESDAY)]);
        let schedule = Schedule::new(vec![open], vec![closed]);

        // 2024-01-01 is a Monday.
        assert!(schedule.is_open(&at(2024, 1, 1, 12, 0)));
        assert!(!schedule.is_open(&at(2024, 1, 3, 12, 0)));
        assert!(!schedule.is_open(&at(2024, 1, 6, 12, 0)));
    }

    #[test]
    fn date_gate_restricts_span() {
        let gate = vec![DateSpan::single(CalendarDate::new(12, 25, None))];
        let closed = ScheduleRuleSpan::new(Some(gate), vec![ScheduleRule::all_day(DayMask::ALL_WEEK)]);
        let open = ScheduleRuleSpan::new(None, vec![ScheduleRule::all_day(DayMask::ALL_WEEK)]);
        let schedule = Schedule::new(vec![open], vec![closed]);

        assert!(!schedule.is_open(&at(2024, 12, 25, 10, 0)));
        assert!(schedule.is_open(&at(2024, 12, 26, 10, 0)));
        assert_eq!(schedule.date_gated_spans(), 1);
    }

    #[test]
    fn empty_gate_means_every_date() {
        let span = ScheduleRuleSpan::new(Some(Vec::new()), vec![ScheduleRule::all_day(DayMask::ALL_WEEK)]);
        assert!(!span.is_date_gated());
        assert!(span.matches(&at(2024, 7, 4, 8, 0)));
    }
}
