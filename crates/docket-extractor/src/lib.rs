//! Docket Extractor
//!
//! Turns a long plain-text contract into a structured analysis and a
//! readable report, even when the document is far larger than a single
//! model request and the provider throttles.
//!
//! # Architecture
//!
//! ```text
//! Text → Chunker → [Chunk] → ChunkAnalyzer (bounded pool) → [AnalysisRecord]
//!      → HierarchicalReducer (rounds of grouped merges) → AnalysisRecord
//!      → deadline fill-in → Renderer → report
//! ```
//!
//! Every remote call goes through one [`RetryPolicy`]: throttling and
//! per-call timeouts are retried with linear backoff, everything else fails
//! the run. Model output goes through [`parse_analysis`], which never fails:
//! an unusable response is the empty record, and an empty merge falls back
//! to [`merge_locally`].
//!
//! # Example Usage
//!
//! ```no_run
//! use docket_extractor::{Pipeline, PipelineConfig, PipelineRequest};
//! use docket_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::new(r#"{"obligations": ["Pay rent by the 1st"]}"#);
//! let pipeline = Pipeline::new(provider, PipelineConfig::default())?;
//!
//! let text = std::fs::read_to_string("lease.txt")?;
//! let output = pipeline.run(PipelineRequest::new(text, true)).await?;
//!
//! println!("{}", output.report_text);
//! println!("Analyzed {} of {} chunks", output.analyzed_chunk_count, output.total_chunk_count);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod types;
mod prompt;
mod chunking;
mod retry;
mod parser;
mod deadlines;
mod merge;
mod pool;
mod analyzer;
mod reducer;
mod render;
mod calendar;
mod usage;
mod pipeline;


pub use error::ExtractorError;
pub use config::PipelineConfig;
pub use types::{PipelineOutput, PipelineRequest, ANONYMOUS_USER};
pub use prompt::{ChunkPrompt, MergePrompt};
pub use chunking::{chunk_text, TextChunker};
pub use retry::{classify_provider_error, Disposition, RetryPolicy};
pub use parser::parse_analysis;
pub use deadlines::{dedupe_events, fill_missing_events, find_date, normalize_deadlines, FALLBACK_TITLE};
pub use merge::merge_locally;
pub use pool::run_bounded;
pub use analyzer::ChunkAnalyzer;
pub use reducer::{HierarchicalReducer, Reduction};
pub use render::{render_report, NONE_IDENTIFIED, SECTION_TITLES};
pub use calendar::{to_ics, PRODID};
pub use usage::{InMemoryRecorder, NoopRecorder, ANALYZE_EVENT};
pub use pipeline::Pipeline;
