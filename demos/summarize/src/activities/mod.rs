//! Flaky demo functions.
//!
//! Both functions sleep to simulate work and fail roughly half the time
//! so the retry machinery has something to recover from.

use rand::Rng;
use retrace_core::FunctionError;
use retrace_workflow::FunctionContext;
use std::time::Duration;
use tracing::{info, warn};

/// Fixed content returned by a successful download
pub const DOWNLOADED_CONTENT: &str = "This is the text of the page that was downloaded";

/// Fixed summary returned by a successful summarization
pub const SUMMARY_TEXT: &str = "This is the summary of the page that was downloaded";

/// How long each step pretends to work
pub const STEP_DELAY: Duration = Duration::from_millis(2500);

/// Random draw in 0..=100; failure when above 50
pub fn flaky_failure() -> bool {
    rand::thread_rng().gen_range(0..=100) > 50
}

/// Download the content from the provided URL (flaky)
pub async fn download(ctx: FunctionContext, url: String) -> Result<String, FunctionError> {
    info!("Downloading data from {} (attempt {})", url, ctx.info().attempt);
    ctx.sleep(STEP_DELAY).await;

    if flaky_failure() {
        warn!("Download failed");
        return Err(FunctionError::Failed("Failed to download data".to_string()));
    }

    info!("Download successful");
    Ok(DOWNLOADED_CONTENT.to_string())
}

/// Summarize the downloaded content (flaky)
pub async fn summarize(ctx: FunctionContext, content: String) -> Result<String, FunctionError> {
    info!(
        "Summarizing {} bytes of content (attempt {})",
        content.len(),
        ctx.info().attempt
    );
    ctx.sleep(STEP_DELAY).await;

    if flaky_failure() {
        warn!("Summarization failed");
        return Err(FunctionError::Failed(
            "Failed to summarize content".to_string(),
        ));
    }

    info!("Summarization successful");
    Ok(SUMMARY_TEXT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrace_testsuite::TestEnvironment;

    #[test]
    fn failure_rate_approaches_one_half() {
        let draws = 10_000;
        let failures = (0..draws).filter(|_| flaky_failure()).count();
        let rate = failures as f64 / draws as f64;
        assert!(
            (0.40..=0.60).contains(&rate),
            "failure rate {} outside expected band",
            rate
        );
    }

    #[tokio::test]
    async fn successful_download_returns_fixed_content() {
        let env = TestEnvironment::new();
        // Flaky by design; try until the draw cooperates
        loop {
            match env
                .execute_function(download, "https://example.com".to_string())
                .await
            {
                Ok(content) => {
                    assert_eq!(content, DOWNLOADED_CONTENT);
                    break;
                }
                Err(FunctionError::Failed(reason)) => {
                    assert_eq!(reason, "Failed to download data");
                }
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
    }

    #[tokio::test]
    async fn successful_summarize_returns_fixed_summary() {
        let env = TestEnvironment::new();
        loop {
            match env
                .execute_function(summarize, DOWNLOADED_CONTENT.to_string())
                .await
            {
                Ok(summary) => {
                    assert_eq!(summary, SUMMARY_TEXT);
                    break;
                }
                Err(FunctionError::Failed(reason)) => {
                    assert_eq!(reason, "Failed to summarize content");
                }
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
    }
}
