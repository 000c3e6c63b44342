//! Scheduled rebill queue processing
//!
//! Claims due rows from `scheduled_rebills` and re-runs the rebilling
//! workflow with each row's stored `(subscription_id, amount,
//! scheduled_count)` triple - the delayed counterpart of the HTTP
//! trigger. A workflow failure marks the row failed with its message;
//! any further retry policy belongs to whatever supervises this worker.

use rebill_billing::{ChargeOutcome, PgRebillScheduler, RebillingService};
use rust_decimal::Decimal;

const CLAIM_BATCH_SIZE: i64 = 50;

/// Outcome counters for one processing cycle.
#[derive(Debug, Default)]
pub struct CycleSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Process all currently due scheduled rebills.
pub async fn process_due_rebills(
    queue: &PgRebillScheduler,
    rebilling: &RebillingService,
) -> CycleSummary {
    let mut summary = CycleSummary::default();

    let due = match queue.claim_due(CLAIM_BATCH_SIZE).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Failed to claim due rebills");
            return summary;
        }
    };

    if due.is_empty() {
        return summary;
    }

    tracing::info!(count = due.len(), "Processing due scheduled rebills");

    for job in due {
        match rebilling
            .rebill(&job.subscription_id, job.amount, job.scheduled_count)
            .await
        {
            Ok(report) => {
                let uncharged = match &report.outcome {
                    Some(ChargeOutcome::Succeeded { amount }) => job.amount - *amount,
                    Some(ChargeOutcome::InsufficientFunds) => job.amount,
                    None => Decimal::ZERO,
                };
                if uncharged > Decimal::ZERO && report.rescheduled.is_none() {
                    // Generation cap reached: nothing will retry this remainder.
                    tracing::warn!(
                        subscription_id = %job.subscription_id,
                        uncharged = %uncharged,
                        scheduled_count = job.scheduled_count,
                        "Rebill generation cap reached - remaining balance not recovered"
                    );
                }

                tracing::info!(
                    subscription_id = %job.subscription_id,
                    scheduled_count = job.scheduled_count,
                    result = %report.message(),
                    "Scheduled rebill complete"
                );

                if let Err(e) = queue.mark_completed(job.id).await {
                    tracing::error!(id = %job.id, error = %e, "Failed to mark rebill completed");
                }
                summary.processed += 1;
            }
            Err(e) => {
                tracing::error!(
                    subscription_id = %job.subscription_id,
                    scheduled_count = job.scheduled_count,
                    error = %e,
                    "Scheduled rebill failed"
                );

                if let Err(mark_err) = queue.mark_failed(job.id, &e.to_string()).await {
                    tracing::error!(id = %job.id, error = %mark_err, "Failed to mark rebill failed");
                }
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Delete finished queue rows older than `keep_days`.
pub async fn cleanup_old_rebills(queue: &PgRebillScheduler, keep_days: i64) {
    match queue.purge_finished(keep_days).await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!(deleted = deleted, "Purged finished scheduled rebills");
            }
        }
        Err(e) => tracing::error!(error = %e, "Scheduled rebill cleanup failed"),
    }
}
