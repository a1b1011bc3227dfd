//! Workflow implementation for the summarize demo.

use crate::activities::{download, summarize};
use retrace_core::InvocationOptions;
use retrace_workflow::{Context, WorkflowResult};
use std::time::Duration;
use tracing::info;

/// Explicit promise id for the summarize step
pub const SUMMARY_PROMISE_ID: &str = "summary";

/// Window between the two steps for simulating a crash from the outside
pub const CRASH_WINDOW: Duration = Duration::from_secs(10);

/// Download the content behind a URL, then summarize it
pub async fn download_and_summarize(ctx: Context, url: String) -> WorkflowResult<String> {
    info!("Downloading and summarizing content from {}", url);

    // Download the content from the provided URL
    let content: String = ctx.lfc(download, url).await?;

    // Pause so you have time to simulate a failure between the steps
    ctx.sleep(CRASH_WINDOW).await;

    // Summarize the downloaded content under an explicit promise id
    let summary: String = ctx
        .lfc(summarize, content)
        .with_options(InvocationOptions::new().promise_id(SUMMARY_PROMISE_ID))
        .await?;

    Ok(summary)
}
