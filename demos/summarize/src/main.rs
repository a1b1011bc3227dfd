//! # Summarize demo
//!
//! Runs the download-and-summarize workflow against the in-process
//! engine. Each step fails roughly half the time, so watch the logs for
//! retries; the retry policy keeps going until both steps resolve.
//!
//! ```bash
//! cargo run -p summarize-demo
//! ```

use retrace_engine::Engine;
use summarize_demo::download_and_summarize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut engine = Engine::new();
    engine.register_workflow("download_and_summarize", download_and_summarize);

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com/article".to_string());

    let summary: String = engine
        .run_workflow_with_id("download_and_summarize", "summarize-demo", url)
        .await?;

    println!("{}", summary);
    Ok(())
}
