//! LLM prompt engineering for section analysis and merging

use crate::error::ExtractorError;
use docket_domain::{AnalysisRecord, Chunk};

/// Builds the analysis prompt for one chunk
pub struct ChunkPrompt<'a> {
    chunk: &'a Chunk,
}

impl<'a> ChunkPrompt<'a> {
    /// Create a prompt builder for `chunk`
    pub fn new(chunk: &'a Chunk) -> Self {
        Self { chunk }
    }

    /// Build the complete analysis prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Role and task
        prompt.push_str(ANALYSIS_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Position, so the model knows the text is partial
        prompt.push_str(&format!(
            "Section {} of {}:\n",
            self.chunk.ordinal, self.chunk.total
        ));
        if self.chunk.total > 1 {
            prompt.push_str("This is one part of a longer document. Report only what this section says.\n");
        }

        // 3. The text to analyze
        prompt.push_str("---\n");
        prompt.push_str(&self.chunk.text);
        prompt.push_str("\n---\n\n");

        // 4. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

/// Builds the prompt that merges several partial records into one
pub struct MergePrompt<'a> {
    records: &'a [AnalysisRecord],
}

impl<'a> MergePrompt<'a> {
    /// Create a prompt builder for a merge group
    pub fn new(records: &'a [AnalysisRecord]) -> Self {
        Self { records }
    }

    /// Build the complete merge prompt
    pub fn build(&self) -> Result<String, ExtractorError> {
        let partials = serde_json::to_string_pretty(self.records)?;

        let mut prompt = String::new();
        prompt.push_str(MERGE_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("Partial results ({}):\n", self.records.len()));
        prompt.push_str(&partials);
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        Ok(prompt)
    }
}

const ANALYSIS_INSTRUCTIONS: &str = r#"You are a legal assistant.

Analyze this contract section and extract:
1. Plain-English summary (2-4 bullets)
2. Key obligations
3. Risks or red flags
4. Important dates or deadlines, as written in the text

Rules:
- Keep each bullet short and concrete
- Only add a deadline_events entry when the text gives a concrete calendar date; use format YYYY-MM-DD
- Leave a field as an empty list rather than inventing content
- Use uncertainty_note for anything unclear, cut off or ambiguous; otherwise leave it empty"#;

const MERGE_INSTRUCTIONS: &str = r#"You are a legal assistant.

Combine the partial analyses below, each covering part of the same document, into one result.

Rules:
- Remove duplicates, including items that say the same thing in different words
- Keep concrete details: amounts, parties, notice periods
- Keep every concrete date and every deadline_events entry
- Do not add anything that is not in the partial analyses
- Combine the uncertainty notes into one short note, or leave it empty"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (one JSON object only, no additional text):
{
  "plain_summary": ["..."],
  "obligations": ["..."],
  "risks": ["..."],
  "deadlines": ["..."],
  "deadline_events": [{"title": "...", "date": "YYYY-MM-DD", "note": "..."}],
  "uncertainty_note": ""
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;
