//! Rebill scheduler and delayed-delivery queue
//!
//! A reschedule is a row in `scheduled_rebills` carrying the exact
//! `(subscription_id, amount, scheduled_count)` triple the workflow must
//! be re-run with, due one week after enqueue. The worker claims due rows
//! and feeds them back into the same workflow entry point, making the
//! delayed trigger structurally identical to the HTTP one.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::RebillResult;

/// Delay between a reschedule decision and its re-invocation.
pub const REBILL_DELAY: Duration = Duration::weeks(1);

/// One queued rebill re-invocation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ScheduledRebill {
    pub id: Uuid,
    pub subscription_id: String,
    pub amount: Decimal,
    pub scheduled_count: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub run_at: OffsetDateTime,
    pub status: String,
    pub last_error: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

/// Seam between the workflow and the delayed re-invocation mechanism.
#[allow(async_fn_in_trait)]
pub trait RebillScheduler {
    /// Fire-and-forget: arrange a workflow re-invocation after one week
    /// with exactly these arguments.
    async fn schedule_one_week(
        &self,
        subscription_id: &str,
        amount: Decimal,
        scheduled_count: i32,
    ) -> RebillResult<()>;
}

/// Postgres-backed scheduler. The enqueue side implements
/// [`RebillScheduler`]; the claim/mark operations below are the worker's
/// consumer side of the same queue.
#[derive(Debug, Clone)]
pub struct PgRebillScheduler {
    pool: PgPool,
}

impl PgRebillScheduler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Claim up to `limit` due pending rows, marking them `processing`.
    ///
    /// SKIP LOCKED keeps concurrent workers from double-claiming a row.
    pub async fn claim_due(&self, limit: i64) -> RebillResult<Vec<ScheduledRebill>> {
        let claimed = sqlx::query_as::<_, ScheduledRebill>(
            r#"
            UPDATE scheduled_rebills
            SET status = 'processing'
            WHERE id IN (
                SELECT id FROM scheduled_rebills
                WHERE status = 'pending' AND run_at <= NOW()
                ORDER BY run_at
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING
                id,
                subscription_id,
                amount,
                scheduled_count,
                run_at,
                status,
                last_error,
                created_at,
                completed_at
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(claimed)
    }

    pub async fn mark_completed(&self, id: Uuid) -> RebillResult<()> {
        sqlx::query(
            r#"
            UPDATE scheduled_rebills
            SET status = 'completed', completed_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Terminal failure for this queue: retry/dead-letter policy beyond
    /// this point belongs to the hosting job system, not the core.
    pub async fn mark_failed(&self, id: Uuid, error: &str) -> RebillResult<()> {
        sqlx::query(
            r#"
            UPDATE scheduled_rebills
            SET status = 'failed', last_error = $2, completed_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete completed/failed rows older than `older_than_days`.
    pub async fn purge_finished(&self, older_than_days: i64) -> RebillResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM scheduled_rebills
            WHERE status IN ('completed', 'failed')
              AND completed_at < NOW() - make_interval(days => $1::int)
            "#,
        )
        .bind(older_than_days)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

impl RebillScheduler for PgRebillScheduler {
    async fn schedule_one_week(
        &self,
        subscription_id: &str,
        amount: Decimal,
        scheduled_count: i32,
    ) -> RebillResult<()> {
        let run_at = OffsetDateTime::now_utc() + REBILL_DELAY;

        sqlx::query(
            r#"
            INSERT INTO scheduled_rebills (
                subscription_id,
                amount,
                scheduled_count,
                run_at
            )
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(subscription_id)
        .bind(amount)
        .bind(scheduled_count)
        .bind(run_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            subscription_id = %subscription_id,
            amount = %amount,
            scheduled_count = scheduled_count,
            run_at = %run_at,
            "Scheduled partial rebill in one week"
        );

        Ok(())
    }
}
