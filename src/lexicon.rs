//! Fixed word tables: day names, month names, meridiems and named times.
//!
//! Day and month spellings are resolved by their leading letters rather than by
//! exact lookup, so abbreviations and common misspellings ("thurs", "tues",
//! "sept", "wednsday") all land on the right value.

use std::collections::HashMap;

use chrono::Weekday;
use once_cell::sync::Lazy;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Meridiem {
    Am,
    Pm,
}

/// Fixed hour for each named time of day.
pub(crate) static NAMED_TIMES: Lazy<HashMap<&'static str, (u32, u32)>> = Lazy::new(|| {
    HashMap::from([
        ("noon", (12, 0)),
        ("midday", (12, 0)),
        ("afternoon", (12, 0)),
        ("midnight", (0, 0)),
        ("morning", (7, 0)),
        ("evening", (18, 0)),
        ("dusk", (17, 0)),
        ("sunset", (17, 0)),
        ("dawn", (6, 0)),
        ("sunrise", (6, 0)),
        ("night", (20, 0)),
    ])
});

/// Words that carry no schedule meaning when left between recognized phrases.
pub(crate) static FILLER_WORDS: &[&str] = &[
    "and", "from", "on", "at", "the", "of", "a", "an", "hours", "hour", "hrs", "is", "are", "we", "re", "only", "also",
    "every", "except", "by", "appointment", "week", "through", "thru", "&", "+",
];

/// Words ending in "day" that sit where a day name could, but are not one.
pub(crate) static NOT_DAY_NAMES: &[&str] = &["holiday", "holidays", "today"];

/// Resolve a day-name spelling by its first one or two letters.
///
/// 't' is Tuesday when followed by 'u' and Thursday otherwise. 's' needs a
/// second letter of 'a' or 'u'.
pub fn weekday_from_name(name: &str) -> Result<Weekday, ParseError> {
    let mut chars = name.trim().chars().map(|c| c.to_ascii_lowercase());
    let first = chars.next();
    let second = chars.next();

    let day = match (first, second) {
        (Some('m'), _) => Weekday::Mon,
        (Some('t'), Some('u')) => Weekday::Tue,
        (Some('t'), _) => Weekday::Thu,
        (Some('w'), _) => Weekday::Wed,
        (Some('f'), _) => Weekday::Fri,
        (Some('s'), Some('a')) => Weekday::Sat,
        (Some('s'), Some('u')) => Weekday::Sun,
        _ => return Err(ParseError::UnknownDayName(name.to_string())),
    };
    Ok(day)
}

/// Resolve a month-name spelling (1-12) by its leading letters.
///
/// 'j' is July when an 'l' follows, January when the second letter is 'a',
/// and June otherwise.
pub fn month_from_name(name: &str) -> Result<u8, ParseError> {
    let lower = name.trim().trim_end_matches('.').to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let unknown = || ParseError::UnknownMonthName(name.to_string());

    let month = match bytes.first().ok_or_else(unknown)? {
        b'j' => {
            if bytes[1..].contains(&b'l') {
                7
            } else if bytes.get(1) == Some(&b'a') {
                1
            } else {
                6
            }
        }
        b'f' => 2,
        b'm' => match (bytes.get(1), bytes.get(2)) {
            (Some(b'a'), Some(b'r')) => 3,
            (Some(b'a'), Some(b'y')) => 5,
            _ => return Err(unknown()),
        },
        b'a' => match bytes.get(1) {
            Some(b'p') => 4,
            Some(b'u') => 8,
            _ => return Err(unknown()),
        },
        b's' => 9,
        b'o' => 10,
        b'n' => 11,
        b'd' => 12,
        _ => return Err(unknown()),
    };
    Ok(month)
}

/// Number of days in `month`, counting February as 29 so year-less spans
/// ending "end of February" include leap days.
pub fn last_day_of_month(month: u8) -> u8 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn meridiem_from_text(text: &str) -> Option<Meridiem> {
    match text.trim().to_ascii_lowercase().as_str() {
        "am" | "a" => Some(Meridiem::Am),
        "pm" | "p" => Some(Meridiem::Pm),
        _ => None,
    }
}

/// Fixed (hour, minute) for a named time such as "noon" or "dusk".
pub fn named_time(name: &str) -> Result<(u32, u32), ParseError> {
    let key = name.trim().to_ascii_lowercase();
    NAMED_TIMES.get(key.as_str()).copied().ok_or_else(|| ParseError::UnknownNamedTime(name.to_string()))
}

pub(crate) fn is_not_day_name(word: &str) -> bool {
    NOT_DAY_NAMES.contains(&word.trim_end_matches('.'))
}

pub(crate) fn is_filler(word: &str) -> bool {
    FILLER_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_disambiguation_by_leading_letters() {
        let cases = [
            ("mon", Weekday::Mon),
            ("Monday", Weekday::Mon),
            ("tues", Weekday::Tue),
            ("tuesday", Weekday::Tue),
            ("thurs", Weekday::Thu),
            ("thu", Weekday::Thu),
            ("wednsday", Weekday::Wed),
            ("fri", Weekday::Fri),
            ("sat", Weekday::Sat),
            ("sundays", Weekday::Sun),
        ];
        for (input, expected) in cases {
            assert_eq!(weekday_from_name(input).unwrap(), expected, "input '{input}'");
        }
    }

    #[test]
    fn leading_letter_table_has_catch_all_branches() {
        assert_eq!(weekday_from_name("tx").unwrap(), Weekday::Thu);
        assert_eq!(weekday_from_name("t").unwrap(), Weekday::Thu);
        assert_eq!(month_from_name("jx").unwrap(), 6);
        assert_eq!(month_from_name("j").unwrap(), 6);
    }

    #[test]
    fn unknown_day_name_is_an_error() {
        let err = weekday_from_name("today").unwrap_err();
        assert!(matches!(err, ParseError::UnknownDayName(ref s) if s == "today"));
        assert!(weekday_from_name("").is_err());
    }

    #[test]
    fn month_disambiguation() {
        let cases = [
            ("jan", 1),
            ("january", 1),
            ("feb", 2),
            ("march", 3),
            ("apr", 4),
            ("may", 5),
            ("june", 6),
            ("jul", 7),
            ("july", 7),
            ("aug", 8),
            ("sept", 9),
            ("oct.", 10),
            ("nov", 11),
            ("december", 12),
        ];
        for (input, expected) in cases {
            assert_eq!(month_from_name(input).unwrap(), expected, "input '{input}'");
        }
    }

    #[test]
    fn unknown_month_name_is_an_error() {
        assert!(matches!(month_from_name("mad"), Err(ParseError::UnknownMonthName(_))));
        assert!(matches!(month_from_name("xyz"), Err(ParseError::UnknownMonthName(_))));
    }

    #[test]
    fn named_times_have_fixed_hours() {
        assert_eq!(named_time("noon").unwrap(), (12, 0));
        assert_eq!(named_time("midnight").unwrap(), (0, 0));
        assert_eq!(named_time("morning").unwrap(), (7, 0));
        assert_eq!(named_time("evening").unwrap(), (18, 0));
        assert_eq!(named_time("dusk").unwrap(), (17, 0));
        assert_eq!(named_time("dawn").unwrap(), (6, 0));
        assert_eq!(named_time("night").unwrap(), (20, 0));
        assert!(matches!(named_time("teatime"), Err(ParseError::UnknownNamedTime(_))));
    }

    #[test]
    fn meridiem_spellings() {
        assert_eq!(meridiem_from_text("am"), Some(Meridiem::Am));
        assert_eq!(meridiem_from_text("P"), Some(Meridiem::Pm));
        assert_eq!(meridiem_from_text("xm"), None);
    }
}
