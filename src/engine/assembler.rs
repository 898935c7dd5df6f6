//! Token-to-rule assembly.
//!
//! The assembler walks the token stream once and groups day tokens with hour
//! tokens into [`ScheduleRule`]s. Writers put days and hours in either order
//! ("Mon-Fri 9-5" and "9-5 Mon-Fri"), so the order is learned per block: the
//! class seen first fixes the shape of the block, and the next token of that
//! same class after the other class has appeared starts a new block.
//!
//! ```text
//!                    day/hour token
//! AwaitingFirstClass ───────────────> CollectingFirstClass(c)
//!                                        │ token of the other class
//!                                        v
//!                                     CollectingSecondClass(c)
//!                                        │ token of class c: flush, then
//!                                        └──> CollectingFirstClass(c)
//! ```
//!
//! Meta tokens flush the pending block and switch the open/closed mode:
//!
//! - `Separator` ends the statement and resets the mode to open.
//! - `Open` / `Closed` flush under the current mode, then switch. When
//!   `Closed` follows days or dates with no hours pending ("Sat closed",
//!   "Jan 1-Jan 15 closed") those tokens are what is closed, so the mode
//!   switches before the flush.
//!
//! Date tokens gate the rules of the next flush in the same statement.

use crate::schedule::{DateSpan, DayMask, MinuteOfDay, Schedule, ScheduleRule, ScheduleRuleSpan};
use crate::token::{ScheduleToken, TokenClass};

use super::lexer::Lexeme;

/// Block grouping state. Only `Hours` and `DaysOfWeek` classes are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    AwaitingFirstClass,
    CollectingFirstClass(TokenClass),
    CollectingSecondClass(TokenClass),
}

impl GroupState {
    /// Next state after a token of `class`, and whether the pending block must
    /// be flushed before that token is pushed.
    pub fn advance(self, class: TokenClass) -> (GroupState, bool) {
        match self {
            Self::AwaitingFirstClass => (Self::CollectingFirstClass(class), false),
            Self::CollectingFirstClass(first) if first == class => (self, false),
            Self::CollectingFirstClass(first) => (Self::CollectingSecondClass(first), false),
            Self::CollectingSecondClass(first) if first == class => (Self::CollectingFirstClass(first), true),
            Self::CollectingSecondClass(_) => (self, false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Open,
    Closed,
}

/// Why the pending block is being flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlushKind {
    /// A new block of the same shape starts.
    Block,
    /// An `Open`/`Closed` token switches mode; lone dates stay pending.
    ModeSwitch,
    /// Separator, end of input, or a closing subject; lone dates become an
    /// all-day rule.
    StatementEnd,
}

/// Output of one assembly run.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub schedule: Option<Schedule>,
    /// Indices of lexemes that produced nothing (lone times).
    pub ignored: Vec<usize>,
}

#[derive(Debug)]
pub struct Assembler {
    mode: Mode,
    state: GroupState,
    days: Vec<DayMask>,
    hours: Vec<(MinuteOfDay, MinuteOfDay)>,
    dates: Vec<DateSpan>,
    last_mask: Option<DayMask>,
    positive: Vec<ScheduleRuleSpan>,
    negative: Vec<ScheduleRuleSpan>,
    ignored: Vec<usize>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            mode: Mode::Open,
            state: GroupState::AwaitingFirstClass,
            days: Vec::new(),
            hours: Vec::new(),
            dates: Vec::new(),
            last_mask: None,
            positive: Vec::new(),
            negative: Vec::new(),
            ignored: Vec::new(),
        }
    }

    /// Assemble a whole lexeme stream.
    pub fn assemble(lexemes: &[Lexeme]) -> Assembly {
        let mut assembler = Self::new();
        for (idx, lexeme) in lexemes.iter().enumerate() {
            assembler.push(idx, &lexeme.token);
        }
        assembler.finish()
    }

    pub fn push(&mut self, idx: usize, token: &ScheduleToken) {
        match token {
            ScheduleToken::Separator => {
                self.flush(FlushKind::StatementEnd);
                self.mode = Mode::Open;
                self.state = GroupState::AwaitingFirstClass;
            }
            ScheduleToken::Open => {
                self.flush(FlushKind::ModeSwitch);
                self.mode = Mode::Open;
                self.state = GroupState::AwaitingFirstClass;
            }
            ScheduleToken::Closed => {
                let closing_subject = self.hours.is_empty() && (!self.days.is_empty() || !self.dates.is_empty());
                if closing_subject {
                    self.mode = Mode::Closed;
                    self.flush(FlushKind::StatementEnd);
                } else {
                    self.flush(FlushKind::ModeSwitch);
                    self.mode = Mode::Closed;
                }
                self.state = GroupState::AwaitingFirstClass;
            }
            ScheduleToken::SingleHour { .. } => {
                log::debug!("lone time {token:?} does not describe an interval; ignoring");
                self.ignored.push(idx);
            }
            _ => match token.class() {
                TokenClass::Hours => {
                    self.advance(TokenClass::Hours);
                    if let Some(range) = token.minute_range() {
                        self.hours.push(range);
                    }
                }
                TokenClass::DaysOfWeek => {
                    self.advance(TokenClass::DaysOfWeek);
                    if let Some(mask) = token.day_mask() {
                        self.days.push(mask);
                    }
                }
                TokenClass::Dates => {
                    if matches!(self.state, GroupState::CollectingSecondClass(_)) {
                        self.flush(FlushKind::Block);
                        self.state = GroupState::AwaitingFirstClass;
                    }
                    if let Some(span) = token.date_span() {
                        self.dates.push(span);
                    }
                }
                TokenClass::Meta => {}
            },
        }
    }

    fn advance(&mut self, class: TokenClass) {
        let (next, flush_first) = self.state.advance(class);
        if flush_first {
            self.flush(FlushKind::Block);
        }
        self.state = next;
    }

    /// Flush what is pending and produce the schedule, if any rules were made.
    pub fn finish(mut self) -> Assembly {
        if !self.hours.is_empty() && self.days.is_empty() {
            self.days.push(DayMask::ALL_WEEK);
        }
        self.flush(FlushKind::StatementEnd);

        let schedule = if self.positive.is_empty() && self.negative.is_empty() {
            log::debug!("no rules produced");
            None
        } else {
            Some(Schedule::new(self.positive, self.negative))
        };
        Assembly { schedule, ignored: self.ignored }
    }

    fn flush(&mut self, kind: FlushKind) {
        if self.days.is_empty() && self.hours.is_empty() {
            if kind == FlushKind::StatementEnd && !self.dates.is_empty() {
                self.emit(vec![ScheduleRule::all_day(DayMask::ALL_WEEK)]);
            }
            return;
        }

        let mask = if self.days.is_empty() {
            self.last_mask.unwrap_or(DayMask::ALL_WEEK)
        } else {
            self.days.drain(..).fold(DayMask::empty(), |acc, m| acc | m)
        };

        let rules = if self.hours.is_empty() {
            vec![ScheduleRule::all_day(mask)]
        } else {
            self.hours.drain(..).rev().map(|(start, end)| ScheduleRule::new(mask, start, end)).collect()
        };

        self.last_mask = Some(mask);
        self.emit(rules);
    }

    fn emit(&mut self, rules: Vec<ScheduleRule>) {
        let dates = std::mem::take(&mut self.dates);
        let span = ScheduleRuleSpan::new(Some(dates), rules);
        log::debug!("{} {}", if self.mode == Mode::Open { "open" } else { "closed" }, span);
        match self.mode {
            Mode::Open => self.positive.push(span),
            Mode::Closed => self.negative.push(span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lexer::tokenize;

    fn assemble(input: &str) -> Option<Schedule> {
        let lexed = tokenize(input).unwrap();
        Assembler::assemble(&lexed.lexemes).schedule
    }

    fn hm(h: u32, m: u32) -> MinuteOfDay {
        MinuteOfDay::from_hm(h, m).unwrap()
    }

    fn rules(spans: &[ScheduleRuleSpan]) -> Vec<ScheduleRule> {
        spans.iter().flat_map(|s| s.rules().iter().copied()).collect()
    }

    #[test]
    fn state_machine_days_first() {
        let s = GroupState::AwaitingFirstClass;
        let (s, flush) = s.advance(TokenClass::DaysOfWeek);
        assert_eq!((s, flush), (GroupState::CollectingFirstClass(TokenClass::DaysOfWeek), false));
        let (s, flush) = s.advance(TokenClass::DaysOfWeek);
        assert_eq!((s, flush), (GroupState::CollectingFirstClass(TokenClass::DaysOfWeek), false));
        let (s, flush) = s.advance(TokenClass::Hours);
        assert_eq!((s, flush), (GroupState::CollectingSecondClass(TokenClass::DaysOfWeek), false));
        let (s, flush) = s.advance(TokenClass::Hours);
        assert_eq!((s, flush), (GroupState::CollectingSecondClass(TokenClass::DaysOfWeek), false));
        let (s, flush) = s.advance(TokenClass::DaysOfWeek);
        assert_eq!((s, flush), (GroupState::CollectingFirstClass(TokenClass::DaysOfWeek), true));
    }

    #[test]
    fn state_machine_hours_first() {
        let (s, _) = GroupState::AwaitingFirstClass.advance(TokenClass::Hours);
        let (s, flush) = s.advance(TokenClass::DaysOfWeek);
        assert!(!flush);
        let (s, flush) = s.advance(TokenClass::Hours);
        assert!(flush);
        assert_eq!(s, GroupState::CollectingFirstClass(TokenClass::Hours));
    }

    #[test]
    fn days_before_hours() {
        let schedule = assemble("Mon-Fri 9am-5pm").unwrap();
        assert_eq!(rules(schedule.positive()), vec![ScheduleRule::new(DayMask::WEEKDAYS, hm(9, 0), hm(17, 0))]);
        assert!(schedule.negative().is_empty());
    }

    #[test]
    fn hours_before_days() {
        let schedule = assemble("9-5 Mon-Fri").unwrap();
        assert_eq!(rules(schedule.positive()), vec![ScheduleRule::new(DayMask::WEEKDAYS, hm(9, 0), hm(17, 0))]);
    }

    #[test]
    fn consecutive_groups_split() {
        let schedule = assemble("Mon-Fri 9am-5pm, Sat 10-2, closed Sun").unwrap();
        assert_eq!(
            rules(schedule.positive()),
            vec![
                ScheduleRule::new(DayMask::WEEKDAYS, hm(9, 0), hm(17, 0)),
                ScheduleRule::new(DayMask::SATURDAY, hm(10, 0), hm(14, 0)),
            ]
        );
        assert_eq!(rules(schedule.negative()), vec![ScheduleRule::all_day(DayMask::SUNDAY)]);
    }

    #[test]
    fn hours_first_groups_split() {
        let schedule = assemble("9-5 Mon-Fri 10-2 Sat").unwrap();
        assert_eq!(
            rules(schedule.positive()),
            vec![
                ScheduleRule::new(DayMask::WEEKDAYS, hm(9, 0), hm(17, 0)),
                ScheduleRule::new(DayMask::SATURDAY, hm(10, 0), hm(14, 0)),
            ]
        );
    }

    #[test]
    fn several_hour_ranges_share_days_in_reverse_push_order() {
        let schedule = assemble("Sat 8-11, 1pm-5pm").unwrap();
        assert_eq!(
            rules(schedule.positive()),
            vec![
                ScheduleRule::new(DayMask::SATURDAY, hm(13, 0), hm(17, 0)),
                ScheduleRule::new(DayMask::SATURDAY, hm(8, 0), hm(11, 0)),
            ]
        );
    }

    #[test]
    fn day_lists_union() {
        let schedule = assemble("Mon, Wed & Fri 9-5").unwrap();
        let expected = DayMask::MONDAY | DayMask::WEDNESDAY | DayMask::FRIDAY;
        assert_eq!(rules(schedule.positive()), vec![ScheduleRule::new(expected, hm(9, 0), hm(17, 0))]);
    }

    #[test]
    fn bare_hours_apply_all_week() {
        let schedule = assemble("10pm-2am").unwrap();
        assert_eq!(rules(schedule.positive()), vec![ScheduleRule::new(DayMask::ALL_WEEK, hm(22, 0), hm(2, 0))]);
    }

    #[test]
    fn days_without_hours_are_all_day() {
        let schedule = assemble("weekends").unwrap();
        assert_eq!(rules(schedule.positive()), vec![ScheduleRule::all_day(DayMask::WEEKENDS)]);
    }

    #[test]
    fn closed_after_hours_closes_following_days() {
        let schedule = assemble("Mon-Fri 9-5, closed Wed").unwrap();
        assert_eq!(rules(schedule.positive()), vec![ScheduleRule::new(DayMask::WEEKDAYS, hm(9, 0), hm(17, 0))]);
        assert_eq!(rules(schedule.negative()), vec![ScheduleRule::all_day(DayMask::WEDNESDAY)]);
    }

    #[test]
    fn trailing_closed_closes_preceding_days() {
        let schedule = assemble("Mon-Fri 9-5, Sat closed").unwrap();
        assert_eq!(rules(schedule.positive()), vec![ScheduleRule::new(DayMask::WEEKDAYS, hm(9, 0), hm(17, 0))]);
        assert_eq!(rules(schedule.negative()), vec![ScheduleRule::all_day(DayMask::SATURDAY)]);
    }

    #[test]
    fn separator_resets_mode_to_open() {
        let schedule = assemble("closed Sun; Mon-Fri 9-5; open; 12pm-1pm").unwrap();
        assert_eq!(rules(schedule.negative()), vec![ScheduleRule::all_day(DayMask::SUNDAY)]);
        assert_eq!(rules(schedule.positive())[0], ScheduleRule::new(DayMask::WEEKDAYS, hm(9, 0), hm(17, 0)));
        // The trailing bare hours are seeded with the whole week at end of input.
        assert_eq!(rules(schedule.positive())[1], ScheduleRule::new(DayMask::ALL_WEEK, hm(12, 0), hm(13, 0)));
    }

    #[test]
    fn mid_stream_flush_reuses_previous_mask() {
        let schedule = assemble("Mon-Fri 9-5 closed 12pm-1pm open Sat").unwrap();
        assert_eq!(rules(schedule.negative()), vec![ScheduleRule::new(DayMask::WEEKDAYS, hm(12, 0), hm(13, 0))]);
    }

    #[test]
    fn dates_gate_the_next_flush() {
        let schedule = assemble("Jan 1-Jan 15 closed").unwrap();
        assert!(schedule.positive().is_empty());
        let span = &schedule.negative()[0];
        assert_eq!(span.rules(), &[ScheduleRule::all_day(DayMask::ALL_WEEK)]);
        assert_eq!(span.dates().map(|d| d.len()), Some(1));
    }

    #[test]
    fn dated_hours() {
        let schedule = assemble("Mon-Fri 9-5; Dec 24 10am-2pm").unwrap();
        assert!(!schedule.positive()[0].is_date_gated());
        let gated = &schedule.positive()[1];
        assert!(gated.is_date_gated());
        assert_eq!(gated.rules(), &[ScheduleRule::new(DayMask::ALL_WEEK, hm(10, 0), hm(14, 0))]);
    }

    #[test]
    fn lone_times_are_ignored() {
        let lexed = tokenize("Mon-Fri 9-5, last entry 4:30pm").unwrap();
        let assembly = Assembler::assemble(&lexed.lexemes);
        assert_eq!(assembly.ignored, vec![2]);
        assert_eq!(rules(assembly.schedule.unwrap().positive()).len(), 1);
    }

    #[test]
    fn no_rules_yields_no_schedule() {
        assert!(assemble("call for details").is_none());
        assert!(assemble("closed").is_none());
        assert!(assemble("").is_none());
    }
}
