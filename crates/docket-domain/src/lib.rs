//! Docket Domain Layer
//!
//! Value types and seam traits shared by every Docket crate. Nothing here
//! performs I/O; providers, recorders and the pipeline itself live in the
//! infrastructure and application crates.
//!
//! ## Key Concepts
//!
//! - **Chunk**: a bounded, overlapping window of the source document
//! - **AnalysisRecord**: the structured extraction result that is produced per
//!   chunk and merged until one remains
//! - **DeadlineEvent**: a calendar-ready deadline with a concrete date
//! - **CompletionProvider**: the single network dependency of the pipeline
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture:
//! - Only serialization and calendar-date crates as dependencies
//! - Pure value types, no side effects
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod completion;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use chunk::Chunk;
pub use completion::{Completion, CompletionRequest, ResponseFormat, TokenUsage};
pub use record::{AnalysisRecord, DeadlineEvent};
pub use traits::{CompletionProvider, ProviderError, UsageEvent, UsageRecorder};
