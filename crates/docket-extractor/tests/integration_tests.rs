//! Integration tests for docket-extractor
//!
//! These tests drive the public API the way the CLI does: build a pipeline
//! once, run documents through it, and export the result.

use docket_domain::AnalysisRecord;
use docket_extractor::{
    chunk_text, merge_locally, normalize_deadlines, parse_analysis, render_report, to_ics, ExtractorError,
    Pipeline, PipelineConfig, PipelineOutput, PipelineRequest,
};
use docket_llm::MockProvider;

fn small_config() -> PipelineConfig {
    PipelineConfig {
        chunk_size: 200,
        chunk_overlap: 20,
        reduce_batch_size: 3,
        base_delay_ms: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_pipeline_reused_across_runs() {
    let provider = MockProvider::new(r#"{"plain_summary": ["A residential lease"]}"#);
    let pipeline = Pipeline::new(provider.clone(), small_config()).unwrap();

    for _ in 0..3 {
        let output = pipeline
            .run(PipelineRequest::new("The tenant leases the premises.", true))
            .await
            .unwrap();
        assert_eq!(output.analysis.plain_summary, vec!["A residential lease".to_string()]);
    }
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_long_document_reduces_to_one_record() {
    let provider = MockProvider::new(r#"{"obligations": ["Keep the premises clean"]}"#);
    let pipeline = Pipeline::new(provider.clone(), small_config()).unwrap();
    let text = "The tenant shall keep the premises clean and in good repair. ".repeat(60);

    let output = pipeline.run(PipelineRequest::new(text.clone(), true)).await.unwrap();

    let expected_chunks = chunk_text(&text, 200, 20).unwrap().len();
    assert_eq!(output.total_chunk_count, expected_chunks);
    assert_eq!(output.analyzed_chunk_count, expected_chunks);
    assert_eq!(output.analysis.obligations, vec!["Keep the premises clean".to_string()]);
}

#[tokio::test]
async fn test_output_serializes_to_json() {
    let provider = MockProvider::new(r#"{"deadlines": ["Rent due 2025-01-01"], "uncertainty_note": "Draft copy."}"#);
    let pipeline = Pipeline::new(provider, small_config()).unwrap();

    let output = pipeline.run(PipelineRequest::new("Rent is due.", true)).await.unwrap();
    let json = serde_json::to_string(&output).unwrap();
    let back: PipelineOutput = serde_json::from_str(&json).unwrap();

    assert_eq!(back, output);
    assert!(json.contains("\"date\":\"2025-01-01\""));
    assert!(json.contains("\"truncated\":false"));
}

#[tokio::test]
async fn test_denied_request_never_reaches_provider() {
    let provider = MockProvider::new("{}");
    let pipeline = Pipeline::new(provider.clone(), small_config()).unwrap();

    let err = pipeline
        .run(PipelineRequest::new("text", false).with_user("over-quota"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractorError::UsageDenied));
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn test_parse_then_render() {
    let record = parse_analysis(
        "Sure! ```json\n{\"risks\": [\"Late fee of 10%\"], \"uncertainty_note\": \"Page 2 is blurry.\"}\n```",
    );
    let report = render_report(&record);
    assert!(report.contains("Risks or red flags:\n- Late fee of 10%"));
    assert!(report.contains("Note: Page 2 is blurry."));
}

#[test]
fn test_local_merge_and_calendar_export() {
    let a = AnalysisRecord {
        deadlines: vec!["Final payment due 2025-03-15".to_string()],
        deadline_events: normalize_deadlines(&["Final payment due 2025-03-15"]),
        ..Default::default()
    };
    let merged = merge_locally(&[a.clone(), a]);
    assert_eq!(merged.deadline_events.len(), 1);

    let ics = to_ics(&merged.deadline_events, chrono::Utc::now());
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    assert!(ics.contains("SUMMARY:Final payment due"));
}
