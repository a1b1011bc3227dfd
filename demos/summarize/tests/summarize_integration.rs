//! End-to-end run of the summarize demo on the test environment.

use retrace_workflow::PromiseState;
use retrace_testsuite::{init_test_tracing, TestEnvironment};
use summarize_demo::{download_and_summarize, SUMMARY_PROMISE_ID, SUMMARY_TEXT};

#[tokio::test]
async fn full_run_records_every_step_as_a_promise() {
    init_test_tracing();

    let mut env = TestEnvironment::new();
    env.register_workflow("download_and_summarize", download_and_summarize);

    let summary: String = env
        .execute_workflow_with_id(
            "download_and_summarize",
            "it-run",
            "https://example.com/article".to_string(),
        )
        .await
        .expect("unlimited retries always complete");
    assert_eq!(summary, SUMMARY_TEXT);

    // The run promise, the auto-id download step and the explicit-id
    // summarize step are all recorded as resolved.
    for id in ["run:it-run", "it-run.0", SUMMARY_PROMISE_ID] {
        let promise = env.store().get(id).unwrap_or_else(|| panic!("missing promise '{}'", id));
        assert!(
            matches!(promise.state, PromiseState::Resolved(_)),
            "promise '{}' not resolved",
            id
        );
    }
}

#[tokio::test]
async fn distinct_runs_share_the_explicit_summary_promise() {
    let mut env = TestEnvironment::new();
    env.register_workflow("download_and_summarize", download_and_summarize);

    let first: String = env
        .execute_workflow("download_and_summarize", "https://example.com/a".to_string())
        .await
        .unwrap();

    // The second run downloads again (fresh auto id) but replays the
    // already-resolved "summary" promise instead of summarizing again.
    let second: String = env
        .execute_workflow("download_and_summarize", "https://example.com/b".to_string())
        .await
        .unwrap();

    assert_eq!(first, SUMMARY_TEXT);
    assert_eq!(second, SUMMARY_TEXT);
    assert!(env.store().get("test-run-0.0").is_some());
    assert!(env.store().get("test-run-1.0").is_some());
}
