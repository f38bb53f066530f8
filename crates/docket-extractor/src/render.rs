//! Plain-text report rendering

use docket_domain::AnalysisRecord;
use std::fmt::Write;

/// Placeholder bullet for an empty section
pub const NONE_IDENTIFIED: &str = "None identified.";

/// Section headings, in report order
pub const SECTION_TITLES: [&str; 4] = [
    "Plain-English summary",
    "Key obligations",
    "Risks or red flags",
    "Important dates or deadlines",
];

/// Render the final record as a bulleted report
///
/// The deadlines section lists the free-text deadlines; when there are
/// none it falls back to the structured events as `YYYY-MM-DD: title`.
pub fn render_report(record: &AnalysisRecord) -> String {
    let event_lines: Vec<String> = record
        .deadline_events
        .iter()
        .map(|event| format!("{}: {}", event.date.format("%Y-%m-%d"), event.title))
        .collect();
    let deadlines = if record.deadlines.is_empty() {
        &event_lines
    } else {
        &record.deadlines
    };

    let sections: [&[String]; 4] = [
        &record.plain_summary,
        &record.obligations,
        &record.risks,
        deadlines,
    ];

    let mut report = String::new();
    for (idx, (title, items)) in SECTION_TITLES.iter().zip(sections).enumerate() {
        if idx > 0 {
            report.push('\n');
        }
        let _ = writeln!(report, "{}:", title);
        if items.is_empty() {
            let _ = writeln!(report, "- {}", NONE_IDENTIFIED);
        }
        for item in items {
            let _ = writeln!(report, "- {}", item);
        }
    }

    let note = record.uncertainty_note.trim();
    if !note.is_empty() {
        let _ = write!(report, "\nNote: {}\n", note);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use docket_domain::DeadlineEvent;

    #[test]
    fn test_empty_record_renders_placeholders() {
        let report = render_report(&AnalysisRecord::empty());
        for title in SECTION_TITLES {
            assert!(report.contains(&format!("{}:\n- None identified.", title)));
        }
        assert!(!report.contains("Note:"));
    }

    #[test]
    fn test_bullets_in_order() {
        let record = AnalysisRecord {
            plain_summary: vec!["A one-year lease".into(), "Rent is $1,200".into()],
            obligations: vec!["Pay rent by the 1st".into()],
            ..Default::default()
        };
        let report = render_report(&record);
        assert!(report.starts_with("Plain-English summary:\n- A one-year lease\n- Rent is $1,200\n"));
        assert!(report.contains("Key obligations:\n- Pay rent by the 1st\n"));
        assert!(report.contains("Risks or red flags:\n- None identified.\n"));
    }

    #[test]
    fn test_note_appended() {
        let record = AnalysisRecord {
            uncertainty_note: "Page 4 is missing.".into(),
            ..Default::default()
        };
        assert!(render_report(&record).ends_with("\nNote: Page 4 is missing.\n"));
    }

    #[test]
    fn test_events_listed_when_no_deadline_text() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let record = AnalysisRecord {
            deadline_events: vec![DeadlineEvent::new("Renewal notice", date, None).unwrap()],
            ..Default::default()
        };
        assert!(render_report(&record).contains("Important dates or deadlines:\n- 2025-03-15: Renewal notice\n"));
    }

    #[test]
    fn test_deadline_text_preferred_over_events() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let record = AnalysisRecord {
            deadlines: vec!["Renewal notice by March 15, 2025".into()],
            deadline_events: vec![DeadlineEvent::new("Renewal notice", date, None).unwrap()],
            ..Default::default()
        };
        let report = render_report(&record);
        assert!(report.contains("- Renewal notice by March 15, 2025"));
        assert!(!report.contains("2025-03-15:"));
    }
}
