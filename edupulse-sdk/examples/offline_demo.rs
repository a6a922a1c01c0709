//! Offline Fallback Demo
//!
//! This example points a session at an unreachable backend to show how
//! retries, error normalization and the offline mock mode work together.
//!
//! Run with `EDUPULSE_API_BASE_URL` set to a live backend to see the
//! online path instead.

use std::sync::Arc;
use std::time::Duration;

use edupulse_sdk::{
    diet::AggregateFilter,
    error::Result,
    resilience::{call_with, ApiResponse},
    EduPulse, EduPulseConfig, MemoryStore, QueryDraft, SharedStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    println!("EduPulse Offline Demo");
    println!("=====================\n");

    // Step 1: retry schedule on its own
    println!("RETRY DEMONSTRATION");
    println!("-------------------");

    let response: ApiResponse<()> = call_with(
        || async { Err(edupulse_sdk::ServiceError::network("connection refused")) },
        2,
        Duration::from_millis(100),
    )
    .await;
    println!("After 3 attempts: {:?}\n", response.error());

    // Step 2: a session against a backend that is not there
    println!("OFFLINE FALLBACK DEMONSTRATION");
    println!("------------------------------");

    let mut config = EduPulseConfig::from_env()?;
    if std::env::var("EDUPULSE_API_BASE_URL").is_err() {
        config.base_url = "http://127.0.0.1:9".to_string();
        config.retries = 0;
    }

    let store: SharedStore = Arc::new(MemoryStore::new());
    let session = EduPulse::open(config, store).await?;

    let draft = QueryDraft::new("My students keep forgetting to borrow when subtracting");
    for attempt in 1..=3 {
        let response = session.submit_query(draft.clone()).await?;
        match response.into_result() {
            Ok(served) => println!(
                "Attempt {}: [{}] {}",
                attempt, served.source, served.data.advice
            ),
            Err(message) => println!("Attempt {}: failed with \"{}\"", attempt, message),
        }
        println!("  state: {}", session.state().await);
    }

    // Step 3: the dashboard always has something to show
    println!("\nDASHBOARD");
    println!("---------");

    let dashboard = session.load_dashboard(&AggregateFilter::new()).await?;
    println!(
        "[{}] {} queries across {} topics and {} clusters",
        dashboard.source,
        dashboard.data.total_queries,
        dashboard.data.active_topics(),
        dashboard.data.active_clusters()
    );

    session.disable_mock_mode().await?;
    println!("\nMock mode disabled, state: {}", session.state().await);

    Ok(())
}
