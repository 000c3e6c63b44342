//! Rebill Background Worker
//!
//! Handles scheduled jobs:
//! - Due scheduled-rebill processing (every minute)
//! - Health check heartbeat (every 5 minutes)
//! - Finished queue row cleanup (daily at 3:00 AM UTC)

mod rebill_processor;

use std::time::Duration;

use rebill_billing::{PgRebillScheduler, RebillingService};
use sqlx::postgres::PgPoolOptions;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

/// Create a database connection pool
async fn create_db_pool() -> anyhow::Result<sqlx::PgPool> {
    #[allow(clippy::expect_used)] // Fail-fast on startup if required config is missing
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    info!("Database pool created");
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    info!("Starting Rebill Worker");

    // Create database pool
    let pool = create_db_pool().await?;

    // Rebilling service and the queue it consumes
    let rebilling = RebillingService::from_env(pool.clone());
    let queue = PgRebillScheduler::new(pool.clone());

    // Create scheduler
    let scheduler = JobScheduler::new().await?;

    // Job 1: Process due scheduled rebills (every minute)
    let job_queue = queue.clone();
    let job_rebilling = rebilling.clone();
    scheduler
        .add(Job::new_async("0 * * * * *", move |_uuid, _l| {
            let queue = job_queue.clone();
            let rebilling = job_rebilling.clone();
            Box::pin(async move {
                let summary = rebill_processor::process_due_rebills(&queue, &rebilling).await;
                if summary.processed > 0 || summary.failed > 0 {
                    info!(
                        processed = summary.processed,
                        failed = summary.failed,
                        "Scheduled rebill cycle complete"
                    );
                }
            })
        })?)
        .await?;
    info!("Scheduled: Due rebill processing (every minute)");

    // Job 2: Health check heartbeat (every 5 minutes)
    scheduler
        .add(Job::new_async("0 */5 * * * *", |_uuid, _l| {
            Box::pin(async move {
                info!("Worker heartbeat - all systems operational");
            })
        })?)
        .await?;
    info!("Scheduled: Health check heartbeat (every 5 minutes)");

    // Job 3: Cleanup finished queue rows (daily at 3:00 AM UTC)
    let cleanup_queue = queue.clone();
    scheduler
        .add(Job::new_async("0 0 3 * * *", move |_uuid, _l| {
            let queue = cleanup_queue.clone();
            Box::pin(async move {
                info!("Running scheduled rebill cleanup");
                rebill_processor::cleanup_old_rebills(&queue, 30).await; // Keep 30 days
            })
        })?)
        .await?;
    info!("Scheduled: Scheduled rebill cleanup (daily at 3:00 AM)");

    // Start the scheduler
    info!("Starting job scheduler");
    scheduler.start().await?;

    info!("Rebill Worker started successfully with {} scheduled jobs", 3);

    // Keep the main task running
    // The scheduler runs jobs in background tasks
    loop {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }
}
