//! Recover calendar dates from free-text deadline phrases
//!
//! Fallback only: used when the model returned deadline text but no
//! structured events. Model-supplied events are never overridden.

use chrono::NaiveDate;
use docket_domain::{AnalysisRecord, DeadlineEvent};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::ops::Range;

/// Title used when nothing is left of the phrase once the date is removed
pub const FALLBACK_TITLE: &str = "Deadline";

const MONTHS: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

static YEAR_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").expect("valid regex"));

static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b{}\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b", MONTHS))
        .expect("valid regex")
});

static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{}\.?,?\s+(\d{{4}})\b", MONTHS))
        .expect("valid regex")
});

/// Turn deadline phrases into dated events, deduplicated by `(date, lowercased title)`
///
/// Phrases without a recognisable, valid date are skipped.
pub fn normalize_deadlines<S: AsRef<str>>(phrases: &[S]) -> Vec<DeadlineEvent> {
    let events = phrases.iter().filter_map(|p| event_from_phrase(p.as_ref()));
    dedupe_events(events)
}

/// Fill `deadline_events` from `deadlines` when the model supplied none
pub fn fill_missing_events(mut record: AnalysisRecord) -> AnalysisRecord {
    if record.deadline_events.is_empty() && !record.deadlines.is_empty() {
        record.deadline_events = normalize_deadlines(&record.deadlines);
    }
    record
}

/// Keep the first event for every `(date, lowercased title)`
pub fn dedupe_events<I: IntoIterator<Item = DeadlineEvent>>(events: I) -> Vec<DeadlineEvent> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|event| seen.insert(event.dedup_key()))
        .collect()
}

/// Find a date in `phrase`: year-month-day, then month-day-year, then day-month-year
pub fn find_date(phrase: &str) -> Option<(NaiveDate, Range<usize>)> {
    if let Some(found) = first_valid(&YEAR_MONTH_DAY, phrase, |c| {
        ymd(c.get(1)?.as_str().parse().ok()?, c.get(2)?.as_str().parse().ok()?, c.get(3)?.as_str().parse().ok()?)
    }) {
        return Some(found);
    }
    if let Some(found) = first_valid(&MONTH_DAY_YEAR, phrase, |c| {
        ymd(c.get(3)?.as_str().parse().ok()?, month_number(c.get(1)?.as_str())?, c.get(2)?.as_str().parse().ok()?)
    }) {
        return Some(found);
    }
    first_valid(&DAY_MONTH_YEAR, phrase, |c| {
        ymd(c.get(3)?.as_str().parse().ok()?, month_number(c.get(2)?.as_str())?, c.get(1)?.as_str().parse().ok()?)
    })
}

fn event_from_phrase(phrase: &str) -> Option<DeadlineEvent> {
    let (date, span) = find_date(phrase)?;
    let remainder = format!("{} {}", &phrase[..span.start], &phrase[span.end..]);
    let title = clean_title(&remainder);
    let title = if title.is_empty() { FALLBACK_TITLE.to_string() } else { title };
    DeadlineEvent::new(title, date, Some(phrase.to_string()))
}

fn first_valid<F>(pattern: &Regex, phrase: &str, to_date: F) -> Option<(NaiveDate, Range<usize>)>
where
    F: Fn(&Captures<'_>) -> Option<NaiveDate>,
{
    pattern.captures_iter(phrase).find_map(|caps| {
        let date = to_date(&caps)?;
        let whole = caps.get(0)?;
        Some((date, whole.range()))
    })
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Collapse whitespace and trim punctuation from both ends
fn clean_title(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_date_phrase() {
        let events = normalize_deadlines(&["Final payment due 2025-03-15"]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Final payment due");
        assert_eq!(events[0].date, date(2025, 3, 15));
        assert_eq!(events[0].note.as_deref(), Some("Final payment due 2025-03-15"));
    }

    #[test]
    fn test_long_form_date_phrase() {
        let events = normalize_deadlines(&["Renewal notice required by March 15, 2025"]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, date(2025, 3, 15));
        assert_eq!(events[0].title, "Renewal notice required by");
    }

    #[test]
    fn test_day_month_year_phrase() {
        let events = normalize_deadlines(&["Lease ends on the 1st of July 2026."]);
        assert_eq!(events[0].date, date(2026, 7, 1));
        assert_eq!(events[0].title, "Lease ends on the");
    }

    #[test]
    fn test_abbreviated_month() {
        let events = normalize_deadlines(&["Deposit returned by Sept. 3rd, 2025"]);
        assert_eq!(events[0].date, date(2025, 9, 3));
    }

    #[test]
    fn test_vague_phrase_yields_nothing() {
        assert!(normalize_deadlines(&["sometime next quarter"]).is_empty());
    }

    #[test]
    fn test_invalid_date_discarded() {
        assert!(normalize_deadlines(&["Payment due February 30, 2025"]).is_empty());
        assert!(normalize_deadlines(&["Due 2025-13-01"]).is_empty());
    }

    #[test]
    fn test_numeric_form_wins_over_prose() {
        let events = normalize_deadlines(&["Invoice (sent March 1, 2025) payable 2025-04-01"]);
        assert_eq!(events[0].date, date(2025, 4, 1));
    }

    #[test]
    fn test_bare_date_gets_fallback_title() {
        let events = normalize_deadlines(&["2025-12-31."]);
        assert_eq!(events[0].title, FALLBACK_TITLE);
    }

    #[test]
    fn test_mid_phrase_date_removed_cleanly() {
        let events = normalize_deadlines(&["Pay on 2025-03-15 at noon"]);
        assert_eq!(events[0].title, "Pay on at noon");
    }

    #[test]
    fn test_dedup_by_date_and_title() {
        let events = normalize_deadlines(&[
            "Rent due 2025-01-01",
            "rent due January 1, 2025",
            "Rent due 2025-02-01",
        ]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].note.as_deref(), Some("Rent due 2025-01-01"));
    }

    #[test]
    fn test_fill_missing_events_respects_model_events() {
        let model_event = DeadlineEvent::new("From model", date(2030, 1, 1), None).unwrap();
        let record = AnalysisRecord {
            deadlines: vec!["Pay 2025-03-15".to_string()],
            deadline_events: vec![model_event.clone()],
            ..Default::default()
        };
        let filled = fill_missing_events(record);
        assert_eq!(filled.deadline_events, vec![model_event]);
    }

    #[test]
    fn test_fill_missing_events_from_text() {
        let record = AnalysisRecord {
            deadlines: vec!["Pay 2025-03-15".to_string(), "soon".to_string()],
            ..Default::default()
        };
        let filled = fill_missing_events(record);
        assert_eq!(filled.deadline_events.len(), 1);
        assert_eq!(filled.deadline_events[0].title, "Pay");
    }
}
