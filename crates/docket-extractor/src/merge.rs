//! Deterministic local merge, used when a merge call yields nothing usable

use crate::deadlines::dedupe_events;
use docket_domain::AnalysisRecord;
use std::collections::HashSet;

/// Merge records without a model call
///
/// List fields are unioned in input order with blank and duplicate (after
/// trimming) entries removed. Deadline events are deduplicated by
/// `(date, lowercased title)`, first seen wins. Distinct non-empty
/// uncertainty notes are joined with a space.
pub fn merge_locally(records: &[AnalysisRecord]) -> AnalysisRecord {
    AnalysisRecord {
        plain_summary: union(records.iter().map(|r| &r.plain_summary)),
        obligations: union(records.iter().map(|r| &r.obligations)),
        risks: union(records.iter().map(|r| &r.risks)),
        deadlines: union(records.iter().map(|r| &r.deadlines)),
        deadline_events: dedupe_events(records.iter().flat_map(|r| r.deadline_events.iter().cloned())),
        uncertainty_note: union(records.iter().map(|r| std::slice::from_ref(&r.uncertainty_note))).join(" "),
    }
}

fn union<'a, I, L>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a L>,
    L: AsRef<[String]> + ?Sized + 'a,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for list in lists {
        for item in list.as_ref() {
            let item = item.trim();
            if !item.is_empty() && seen.insert(item.to_string()) {
                merged.push(item.to_string());
            }
        }
    }
    merged
}
