//! Composite-pattern lexer.
//!
//! The input is normalized (lowercased, dotted meridiems collapsed, dash
//! variants folded) and then scanned left to right with one composite regex.
//! Each alternative of the regex is one phrase shape; at any position the first
//! alternative that matches wins, so overlapping shapes are ordered longest
//! first:
//!
//! ```text
//! hours       9am-5pm | 10:30 to 2 | noon-midnight | 9am-teatime (fails: unknown named time)
//! until       until 10pm | till midnight
//! allday      24 hours | 24/7
//! day_words   daily | every day | 7 days a week | weekdays | weekends
//! day_range   mon-fri | mon-xday (fails: unknown day name)
//! day         sat
//! month_range beginning of june - end of august
//! date_range  dec 24 - jan 2 2025
//! date        jan 1st
//! year_date   xmas 25, 2024 (fails: unknown month name)
//! month       april
//! single_hour 5pm | 17:30
//! sep / closed / open
//! ```
//!
//! Text between matches is noise. It is not an error here; fragments that
//! contain more than filler words are returned as [`Skipped`] so the caller
//! can warn about (or reject) them.
//!
//! Named groups must be unique across the whole regex, so the time/date
//! fragments are templates stamped out with a per-use prefix.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{ParseError, parse_number};
use crate::lexicon::{self, is_filler, last_day_of_month, meridiem_from_text, month_from_name, named_time};
use crate::schedule::{CalendarDate, DayMask};
use crate::token::{ClockTime, ScheduleToken};
use crate::{Range, Skipped};

const DELIM: &str = r"\s*(?:-|to|till|til|until|through|thru)\s*";

const TIME: &str = r"(?:\b(?P<{p}_h>\d{1,2})(?::(?P<{p}_m>\d{2}))?\s*(?P<{p}_ap>am|pm|a|p)?\b|\b(?P<{p}_n>noon|midday|midnight|morning|evening|dusk|sunset|dawn|sunrise|night|[a-z]+(?:time|noon))\b)";

const DAY: &str =
    r"\b(?:(?:mo|tu|we|th|fr|sa|su)[a-z]{0,6}days?|mon|tues?|weds?|thu|thur|thurs|fri|sat|sun)\b\.?";

const MONTH: &str = r"\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t|tember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?";

/// A bare month on its own; "may" is left out since it is far more often the verb.
const LONE_MONTH: &str = r"\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|june?|july?|aug(?:ust)?|sep(?:t|tember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?";

const MONTH_PREFIX: &str = r"(?:(?P<{p}>(?:the\s+)?(?:beginning|start)\s+of|mid|(?:the\s+)?end\s+of)[\s-]*)?";

const DATE: &str =
    r"(?P<{p}_mo>{month})\s*(?P<{p}_d>\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s*(?P<{p}_y>\d{4})\b)?";

const DATE_END: &str =
    r"(?:(?P<{p}_mo>{month})\s*)?(?P<{p}_d>\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s*(?P<{p}_y>\d{4})\b)?";

/// Any word followed by a day and a year is taken to be a month name.
const YEAR_DATE: &str =
    r"\b(?P<{p}_mo>[a-z]{3,9})\.?\s+(?P<{p}_d>\d{1,2})(?:st|nd|rd|th)?\b,?\s+(?P<{p}_y>(?:19|20)\d{2})\b";

fn stamp(template: &str, prefix: &str) -> String {
    template.replace("{p}", prefix).replace("{month}", MONTH)
}

fn composite_pattern() -> String {
    let alternatives = [
        format!("(?P<hours>{}{DELIM}{})", stamp(TIME, "hs"), stamp(TIME, "he")),
        format!(r"(?P<until>\b(?:until|till|til|to)\s+{})", stamp(TIME, "ut")),
        r"(?P<allday>\b24\s*/\s*7\b|\b24\s*(?:hours|hrs|hr|h)\b|/\s*7\b)".to_string(),
        r"(?P<day_words>\bdaily\b|\bevery\s*day\b|\b(?:seven|7)\s+days(?:\s+a\s+week)?\b|\bweek\s*days?\b|\bweek\s*ends?\b)"
            .to_string(),
        format!(r"(?P<day_range>(?P<dr_s>{DAY})\s*(?:-|to|through|thru|till|until)\s*(?P<dr_e>{DAY}|[a-z]+days?\b))"),
        format!("(?P<day>{DAY})"),
        format!(
            "(?P<month_range>{}(?P<mr_s>{MONTH}){DELIM}{}(?P<mr_e>{MONTH}))",
            stamp(MONTH_PREFIX, "mr_sp"),
            stamp(MONTH_PREFIX, "mr_ep")
        ),
        format!("(?P<date_range>{}{DELIM}{})", stamp(DATE, "ds"), stamp(DATE_END, "de")),
        format!("(?P<date>{})", stamp(DATE, "sd")),
        format!("(?P<year_date>{})", stamp(YEAR_DATE, "yd")),
        format!("(?P<month>{LONE_MONTH})"),
        r"(?P<single_hour>\b(?P<sh_h>\d{1,2})(?::(?P<sh_m>\d{2})\s*(?P<sh_ap>am|pm|a|p)?|\s*(?P<sh_ap2>am|pm|a|p))\b)"
            .to_string(),
        r"(?P<sep>;|\n)".to_string(),
        r"(?P<closed>\bclosed\b)".to_string(),
        r"(?P<open>\bopen\b)".to_string(),
    ];
    alternatives.join("|")
}

/// The composite phrase pattern, built once per process.
pub(crate) static LEXER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&composite_pattern()).expect("composite lexer pattern must compile"));

/// A token together with the byte range it was read from (in normalized text).
#[derive(Debug, Clone)]
pub struct Lexeme {
    pub token: ScheduleToken,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct LexOutput {
    /// The normalized text that ranges refer to.
    pub normalized: String,
    pub lexemes: Vec<Lexeme>,
    pub skipped: Vec<Skipped>,
}

/// Lowercase, collapse "a.m."/"p.m." to "am"/"pm", and fold dash variants.
pub fn normalize(input: &str) -> String {
    let lower = input.to_lowercase().replace("\r\n", "\n").replace(['\u{2013}', '\u{2014}', '\u{2212}'], "-");
    let lower = regex!(r"(^|[^a-z])a\.\s?m\b\.?").replace_all(&lower, "${1}am");
    regex!(r"(^|[^a-z])p\.\s?m\b\.?").replace_all(&lower, "${1}pm").into_owned()
}

/// Tokenize `input`. Fails only on a lexicon or numeric error inside a match.
pub fn tokenize(input: &str) -> Result<LexOutput, ParseError> {
    let normalized = normalize(input);
    let mut lexemes = Vec::new();
    let mut skipped = Vec::new();
    let mut cursor = 0;

    for caps in LEXER_PATTERN.captures_iter(&normalized) {
        let Some(whole) = caps.get(0) else { continue };
        // A match that yields no token stays part of the surrounding gap.
        let Some(token) = build_token(&caps)? else { continue };
        note_gap(&normalized, cursor, whole.start(), &mut skipped);
        cursor = whole.end();

        log::trace!("lexed {:?} from '{}'", token, whole.as_str());
        lexemes.push(Lexeme { token, range: Range { start: whole.start(), end: whole.end() } });
    }
    note_gap(&normalized, cursor, normalized.len(), &mut skipped);

    Ok(LexOutput { normalized, lexemes, skipped })
}

fn note_gap(text: &str, start: usize, end: usize, skipped: &mut Vec<Skipped>) {
    if start >= end {
        return;
    }
    let gap = &text[start..end];
    let meaningful = gap
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .any(|w| !w.is_empty() && !is_filler(w));
    if !meaningful {
        return;
    }

    // Report the fragment without the separators around it.
    let edge = |c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '&' | '+');
    let lead = gap.len() - gap.trim_start_matches(edge).len();
    let trimmed = gap.trim_matches(edge);
    skipped.push(Skipped { start: start + lead, end: start + lead + trimmed.len(), text: trimmed.to_string() });
}

/// Token for one match. A lone time that is not a valid clock reading ("12:75",
/// "30pm") yields `None` and is left as skipped text.
fn build_token(caps: &Captures) -> Result<Option<ScheduleToken>, ParseError> {
    if caps.name("single_hour").is_some() {
        return Ok(lone_time(caps));
    }
    phrase_token(caps).map(Some)
}

fn lone_time(caps: &Captures) -> Option<ScheduleToken> {
    let hour = bounded(group(caps, "sh_h"), "hour", 24).ok()?;
    let minute = match caps.name("sh_m") {
        Some(m) => bounded(m.as_str(), "minute", 59).ok()?,
        None => 0,
    };
    let meridiem = caps.name("sh_ap").or_else(|| caps.name("sh_ap2")).and_then(|m| meridiem_from_text(m.as_str()));
    Some(ScheduleToken::SingleHour { at: ClockTime::new(hour, minute, meridiem) })
}

fn phrase_token(caps: &Captures) -> Result<ScheduleToken, ParseError> {
    if caps.name("hours").is_some() {
        return Ok(ScheduleToken::HourRange { start: clock_time(caps, "hs")?, end: clock_time(caps, "he")? });
    }
    if caps.name("until").is_some() {
        return Ok(ScheduleToken::Until { end: clock_time(caps, "ut")? });
    }
    if caps.name("allday").is_some() {
        return Ok(ScheduleToken::AllDay);
    }
    if let Some(m) = caps.name("day_words") {
        return Ok(ScheduleToken::SingleDay { days: day_word_mask(m.as_str()) });
    }
    if caps.name("day_range").is_some() {
        let start = lexicon::weekday_from_name(group(caps, "dr_s"))?;
        if lexicon::is_not_day_name(group(caps, "dr_e")) {
            return Ok(ScheduleToken::SingleDay { days: DayMask::from_weekday(start) });
        }
        let end = lexicon::weekday_from_name(group(caps, "dr_e"))?;
        return Ok(ScheduleToken::DayRange { start, end });
    }
    if let Some(m) = caps.name("day") {
        let day = lexicon::weekday_from_name(m.as_str())?;
        return Ok(ScheduleToken::SingleDay { days: DayMask::from_weekday(day) });
    }
    if caps.name("month_range").is_some() {
        let start_month = month_from_name(group(caps, "mr_s"))?;
        let end_month = month_from_name(group(caps, "mr_e"))?;
        let start_day = caps.name("mr_sp").map_or(1, |p| prefix_day(p.as_str(), start_month));
        let end_day =
            caps.name("mr_ep").map_or(last_day_of_month(end_month), |p| prefix_day(p.as_str(), end_month));
        return Ok(ScheduleToken::MonthRange {
            start: CalendarDate::new(start_month, start_day, None),
            end: CalendarDate::new(end_month, end_day, None),
        });
    }
    if caps.name("date_range").is_some() {
        let start = calendar_date(caps, "ds", None)?;
        let end = calendar_date(caps, "de", Some(start.month))?;
        return Ok(ScheduleToken::DateRange { start, end });
    }
    if caps.name("date").is_some() {
        return Ok(ScheduleToken::SingleDate { date: calendar_date(caps, "sd", None)? });
    }
    if caps.name("year_date").is_some() {
        return Ok(ScheduleToken::SingleDate { date: calendar_date(caps, "yd", None)? });
    }
    if let Some(m) = caps.name("month") {
        return Ok(ScheduleToken::SingleMonth { month: month_from_name(m.as_str())? });
    }
    if caps.name("sep").is_some() {
        return Ok(ScheduleToken::Separator);
    }
    if caps.name("closed").is_some() {
        return Ok(ScheduleToken::Closed);
    }
    Ok(ScheduleToken::Open)
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str())
}

fn bounded(text: &str, field: &'static str, max: u32) -> Result<u32, ParseError> {
    let value = parse_number(text)?;
    if value > max {
        return Err(ParseError::OutOfRange { field, value });
    }
    Ok(value)
}

fn clock_time(caps: &Captures, prefix: &str) -> Result<ClockTime, ParseError> {
    if let Some(name) = caps.name(&format!("{prefix}_n")) {
        let (hour, minute) = named_time(name.as_str())?;
        return Ok(ClockTime::named(hour, minute));
    }

    let hour = bounded(group(caps, &format!("{prefix}_h")), "hour", 24)?;
    let minute = caps.name(&format!("{prefix}_m")).map(|m| bounded(m.as_str(), "minute", 59)).transpose()?.unwrap_or(0);
    let meridiem = caps.name(&format!("{prefix}_ap")).and_then(|m| meridiem_from_text(m.as_str()));
    Ok(ClockTime::new(hour, minute, meridiem))
}

fn calendar_date(caps: &Captures, prefix: &str, default_month: Option<u8>) -> Result<CalendarDate, ParseError> {
    let month = match (caps.name(&format!("{prefix}_mo")), default_month) {
        (Some(m), _) => month_from_name(m.as_str())?,
        (None, Some(month)) => month,
        (None, None) => return Err(ParseError::UnknownMonthName(String::new())),
    };

    let day = parse_number(group(caps, &format!("{prefix}_d")))?;
    if day == 0 || day > u32::from(last_day_of_month(month)) {
        return Err(ParseError::OutOfRange { field: "day of month", value: day });
    }

    let year = caps.name(&format!("{prefix}_y")).map(|y| parse_number(y.as_str())).transpose()?.map(|y| y as i32);
    Ok(CalendarDate::new(month, day as u8, year))
}

/// Day of month selected by a month prefix: beginning = 1, mid = 15, end = last.
fn prefix_day(prefix: &str, month: u8) -> u8 {
    if prefix.starts_with("mid") {
        15
    } else if prefix.contains("end") {
        last_day_of_month(month)
    } else {
        1
    }
}

fn day_word_mask(word: &str) -> DayMask {
    if word.starts_with("week") {
        if word.contains("end") { DayMask::WEEKENDS } else { DayMask::WEEKDAYS }
    } else {
        DayMask::ALL_WEEK
    }
}
