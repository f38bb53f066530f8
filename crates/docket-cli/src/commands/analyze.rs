//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::{Config, ProviderKind};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chrono::Utc;
use docket_domain::{CompletionProvider, DeadlineEvent};
use docket_extractor::{
    to_ics, InMemoryRecorder, Pipeline, PipelineConfig, PipelineOutput, PipelineRequest, ANONYMOUS_USER,
};
use docket_llm::{OllamaProvider, OpenAiProvider};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info};

/// Execute the analyze command.
pub async fn execute_analyze(args: AnalyzeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = read_document(&args.file)?;
    if text.trim().is_empty() {
        return Err(CliError::InvalidInput(format!(
            "{} contains no text; extract the document text first",
            args.file.display()
        )));
    }

    let mut pipeline_config = config.pipeline.clone();
    args.tuning.apply(&mut pipeline_config);

    let user = args.user.unwrap_or_else(|| ANONYMOUS_USER.to_string());
    // Local runs have no quota check
    let request = PipelineRequest::new(text, true).with_user(user);

    let settings = &config.provider;
    let model = settings.model_or_default();
    let endpoint = settings.endpoint_or_default();
    info!("Using {:?} provider, model {} at {}", settings.kind, model, endpoint);

    let output = match settings.kind {
        ProviderKind::OpenAi => {
            let provider = OpenAiProvider::from_env(&settings.api_key_env, model)?.with_endpoint(endpoint);
            run_pipeline(provider, pipeline_config, request).await?
        }
        ProviderKind::Ollama => {
            let provider = OllamaProvider::new(endpoint, model)?;
            run_pipeline(provider, pipeline_config, request).await?
        }
    };

    println!("{}", formatter.format_output(&output)?);

    if let Some(path) = args.ics {
        let written = write_calendar(&path, &output.analysis.deadline_events)?;
        eprintln!(
            "{}",
            formatter.success(&format!("Wrote {} deadline event(s) to {}", written, path.display()))
        );
    }

    Ok(())
}

/// Build a pipeline for `provider` and run one request through it.
pub async fn run_pipeline<P>(provider: P, config: PipelineConfig, request: PipelineRequest) -> Result<PipelineOutput>
where
    P: CompletionProvider + 'static,
{
    let pipeline = Pipeline::new(provider, config)?.with_recorder(InMemoryRecorder::new());
    let output = pipeline.run(request).await?;

    for (user, event) in pipeline.recorder().events() {
        debug!("Usage for {}: {} ({:?})", user, event.event_name, event.token_counts);
    }
    Ok(output)
}

/// Write `events` as an iCalendar file, returning how many were written.
pub fn write_calendar(path: &Path, events: &[DeadlineEvent]) -> Result<usize> {
    fs::write(path, to_ics(events, Utc::now()))?;
    Ok(events.len())
}

fn read_document(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    Ok(fs::read_to_string(path)?)
}
