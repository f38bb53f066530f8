//! Analysis record - the unit produced per chunk and merged across chunks

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A deadline with a concrete calendar date
///
/// Identity for deduplication is `(date, lowercased title)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineEvent {
    /// Short description of what is due; never blank
    pub title: String,

    /// Calendar date, no time component
    pub date: NaiveDate,

    /// Original text the event was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DeadlineEvent {
    /// Create an event, rejecting blank titles
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use docket_domain::DeadlineEvent;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
    /// assert!(DeadlineEvent::new("Final payment", date, None).is_some());
    /// assert!(DeadlineEvent::new("   ", date, None).is_none());
    /// ```
    pub fn new(title: impl Into<String>, date: NaiveDate, note: Option<String>) -> Option<Self> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return None;
        }
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        Some(Self { title, date, note })
    }

    /// Deduplication key
    pub fn dedup_key(&self) -> (NaiveDate, String) {
        (self.date, self.title.trim().to_lowercase())
    }
}

/// Structured extraction result
///
/// A record with every field empty doubles as the "nothing extracted"
/// sentinel: mid-pipeline it signals a failed extraction, at the end of a run
/// it is a legitimate "nothing found" answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRecord {
    /// Plain-language summary bullets
    pub plain_summary: Vec<String>,

    /// Obligations imposed by the document
    pub obligations: Vec<String>,

    /// Risks or red flags
    pub risks: Vec<String>,

    /// Free-text deadline mentions, with or without a parseable date
    pub deadlines: Vec<String>,

    /// Deadlines with concrete dates
    pub deadline_events: Vec<DeadlineEvent>,

    /// Caveats about the analysis; empty when nothing is uncertain
    pub uncertainty_note: String,
}

impl AnalysisRecord {
    /// The empty sentinel
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when every list is empty and the note is blank
    pub fn is_empty(&self) -> bool {
        self.plain_summary.is_empty()
            && self.obligations.is_empty()
            && self.risks.is_empty()
            && self.deadlines.is_empty()
            && self.deadline_events.is_empty()
            && self.uncertainty_note.trim().is_empty()
    }

    /// Number of entries across all list fields
    pub fn item_count(&self) -> usize {
        self.plain_summary.len()
            + self.obligations.len()
            + self.risks.len()
            + self.deadlines.len()
            + self.deadline_events.len()
    }
}
