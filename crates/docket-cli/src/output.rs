//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::*;
use docket_domain::DeadlineEvent;
use docket_extractor::{PipelineOutput, SECTION_TITLES};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a pipeline result.
    pub fn format_output(&self, output: &PipelineOutput) -> Result<String> {
        match self.format {
            CliFormat::Json => Ok(serde_json::to_string_pretty(output)?),
            CliFormat::Text => Ok(self.format_text(output)),
        }
    }

    /// Report text with highlighted headings, an events table and a coverage line.
    fn format_text(&self, output: &PipelineOutput) -> String {
        let mut text = String::new();

        for line in output.report_text.lines() {
            let heading = line
                .strip_suffix(':')
                .is_some_and(|title| SECTION_TITLES.contains(&title));
            if heading {
                text.push_str(&self.colorize(line, "cyan"));
            } else if line.starts_with("Note:") {
                text.push_str(&self.colorize(line, "yellow"));
            } else {
                text.push_str(line);
            }
            text.push('\n');
        }

        if !output.analysis.deadline_events.is_empty() {
            text.push('\n');
            text.push_str(&self.events_table(&output.analysis.deadline_events));
            text.push('\n');
        }

        text.push('\n');
        let coverage = format!(
            "Analyzed {} of {} sections",
            output.analyzed_chunk_count, output.total_chunk_count
        );
        if output.truncated {
            text.push_str(&self.warning(&format!("{} (document truncated)", coverage)));
        } else {
            text.push_str(&self.info(&coverage));
        }
        if output.usage.total() > 0 {
            text.push_str(&format!(", {} tokens", output.usage.total()));
        }
        text.push('\n');

        text
    }

    /// Format deadline events as a table.
    pub fn events_table(&self, events: &[DeadlineEvent]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Date", "Title", "Source"]);

        for event in events {
            builder.push_record([
                event.date.format("%Y-%m-%d").to_string(),
                event.title.clone(),
                event.note.clone().unwrap_or_default(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().bold().to_string(),
            _ => text.to_string(),
        }
    }
}
