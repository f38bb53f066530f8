//! iCalendar export of deadline events

use chrono::{DateTime, Utc};
use docket_domain::DeadlineEvent;
use uuid::Uuid;

/// Product identifier written to every calendar
pub const PRODID: &str = "-//Docket//Contract Deadlines//EN";

const CRLF: &str = "\r\n";

/// Longest content line, in octets, before folding
const MAX_LINE_OCTETS: usize = 75;

/// Render `events` as an RFC 5545 calendar of all-day events
///
/// Every event gets a fresh UUIDv7 `UID`; `generated_at` becomes each `DTSTAMP`.
pub fn to_ics(events: &[DeadlineEvent], generated_at: DateTime<Utc>) -> String {
    let stamp = generated_at.format("%Y%m%dT%H%M%SZ").to_string();

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];

    for event in events {
        let description = match event.note.as_deref() {
            Some(note) => format!("Source note: {}", note),
            None => "Deadline extracted from the analyzed document.".to_string(),
        };
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}@docket", Uuid::now_v7()));
        lines.push(format!("DTSTAMP:{}", stamp));
        lines.push(format!("DTSTART;VALUE=DATE:{}", event.date.format("%Y%m%d")));
        lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
        lines.push(format!("DESCRIPTION:{}", escape_text(&description)));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());

    let mut ics = lines.iter().map(|line| fold_line(line)).collect::<Vec<_>>().join(CRLF);
    ics.push_str(CRLF);
    ics
}

/// Fold a content line at 75 octets; continuation lines start with a space
///
/// Splits only on char boundaries so multi-byte characters stay intact.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for c in line.chars() {
        if width + c.len_utf8() > MAX_LINE_OCTETS {
            folded.push_str(CRLF);
            folded.push(' ');
            width = 1;
        }
        folded.push(c);
        width += c.len_utf8();
    }
    folded
}

/// Escape a TEXT value
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    fn event(title: &str, note: Option<&str>) -> DeadlineEvent {
        let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        DeadlineEvent::new(title, date, note.map(str::to_string)).unwrap()
    }

    #[test]
    fn test_calendar_envelope() {
        let ics = to_ics(&[], generated_at());
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.contains(&format!("PRODID:{}\r\n", PRODID)));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(!ics.contains("BEGIN:VEVENT"));
    }

    #[test]
    fn test_all_day_event() {
        let ics = to_ics(&[event("Final payment due", Some("Final payment due 2025-03-15"))], generated_at());
        assert!(ics.contains("DTSTART;VALUE=DATE:20250315\r\n"));
        assert!(ics.contains("DTSTAMP:20250102T030405Z\r\n"));
        assert!(ics.contains("SUMMARY:Final payment due\r\n"));
        assert!(ics.contains("DESCRIPTION:Source note: Final payment due 2025-03-15\r\n"));
    }

    #[test]
    fn test_uids_are_unique() {
        let ics = to_ics(&[event("One", None), event("Two", None)], generated_at());
        let uids: Vec<&str> = ics.lines().filter(|l| l.starts_with("UID:")).collect();
        assert_eq!(uids.len(), 2);
        assert_ne!(uids[0], uids[1]);
    }

    #[test]
    fn test_text_values_escaped() {
        let ics = to_ics(&[event("Rent; late fee, penalty", Some("line one\nline \\ two"))], generated_at());
        assert!(ics.contains("SUMMARY:Rent\\; late fee\\, penalty\r\n"));
        assert!(ics.contains("DESCRIPTION:Source note: line one\\nline \\\\ two\r\n"));
    }

    #[test]
    fn test_long_lines_folded() {
        let title = "Deliver the signed renewal notice to the landlord at the registered office address";
        let note = "é".repeat(100);
        let ics = to_ics(&[event(title, Some(&note))], generated_at());

        assert!(ics.split("\r\n").all(|line| line.len() <= 75));
        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("SUMMARY:{}\r\n", title)));
        assert!(unfolded.contains(&format!("DESCRIPTION:Source note: {}\r\n", note)));
    }

    #[test]
    fn test_short_line_not_folded() {
        let line = format!("SUMMARY:{}", "x".repeat(67));
        assert_eq!(line.len(), 75);
        assert_eq!(fold_line(&line), line);
    }

    #[test]
    fn test_no_bare_line_feeds() {
        let ics = to_ics(&[event("A", Some("x\r\ny"))], generated_at());
        assert_eq!(ics.matches('\n').count(), ics.matches("\r\n").count());
    }
}
