//! Parse LLM output into an analysis record
//!
//! The model is asked for strict JSON but does not always comply. Parsing is
//! best effort: anything unusable becomes the empty record, never an error.

use chrono::NaiveDate;
use docket_domain::{AnalysisRecord, DeadlineEvent};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Parse a raw model response into an [`AnalysisRecord`]
///
/// Returns the empty record when the response is blank, holds no JSON
/// object, or fails to parse.
pub fn parse_analysis(response: &str) -> AnalysisRecord {
    if response.trim().is_empty() {
        return AnalysisRecord::empty();
    }

    for candidate in json_object_spans(response) {
        if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(candidate) {
            return coerce_record(&obj);
        }
    }

    // No balanced object found: try the whole (unfenced) text
    match serde_json::from_str::<Value>(strip_code_fence(response)) {
        Ok(Value::Object(obj)) => coerce_record(&obj),
        Ok(_) => {
            debug!("Response parsed but is not a JSON object");
            AnalysisRecord::empty()
        }
        Err(e) => {
            warn!("Unparseable model response ({} chars): {}", response.len(), e);
            AnalysisRecord::empty()
        }
    }
}

/// Balanced `{...}` spans in order of their opening brace, found lazily
///
/// Braces inside JSON string literals are ignored.
fn json_object_spans(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('{')
        .filter_map(move |(open, _)| matching_brace(&text[open..]).map(|close| &text[open..open + close + 1]))
}

/// Byte offset of the brace closing the one at offset 0
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the language tag line (```json)
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn coerce_record(obj: &Map<String, Value>) -> AnalysisRecord {
    AnalysisRecord {
        plain_summary: string_list(obj.get("plain_summary")),
        obligations: string_list(obj.get("obligations")),
        risks: string_list(obj.get("risks")),
        deadlines: string_list(obj.get("deadlines")),
        deadline_events: event_list(obj.get("deadline_events")),
        uncertainty_note: obj
            .get("uncertainty_note")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Only real arrays count; elements are coerced to text, nulls and blanks dropped
fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn event_list(value: Option<&Value>) -> Vec<DeadlineEvent> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    let events: Vec<DeadlineEvent> = items.iter().filter_map(parse_event).collect();
    if events.len() < items.len() {
        warn!("Dropped {} invalid deadline events", items.len() - events.len());
    }
    events
}

fn parse_event(value: &Value) -> Option<DeadlineEvent> {
    let obj = value.as_object()?;
    let title = obj.get("title")?.as_str()?;
    let date_str = obj.get("date")?.as_str()?.trim();
    if !ISO_DATE.is_match(date_str) {
        return None;
    }
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
    let note = obj.get("note").and_then(Value::as_str).map(str::to_string);
    DeadlineEvent::new(title, date, note)
}
