//! Attempt ledger
//!
//! Durable, append-only record of every tranche charge attempt. Rows are
//! written immediately after the gateway answers and before the outcome is
//! interpreted, so failure outcomes never lose attempt history. No code
//! path updates or deletes a prior attempt.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::error::RebillResult;

/// One tranche attempt, as persisted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentAttempt {
    pub id: i64,
    pub subscription_id: String,
    pub amount: Decimal,
    /// Raw gateway status, including unrecognized values.
    pub status: String,
    /// Per-invocation attempt index (1-based, not cumulative across
    /// reschedules).
    pub attempt_count: i32,
    /// Reschedule generation at the time of the attempt.
    pub scheduled_count: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Seam between the workflow and the durable attempt store.
#[allow(async_fn_in_trait)]
pub trait AttemptLedger {
    async fn record(
        &self,
        subscription_id: &str,
        amount: Decimal,
        status: &str,
        attempt_count: i32,
        scheduled_count: i32,
    ) -> RebillResult<()>;
}

/// Postgres-backed attempt ledger.
#[derive(Debug, Clone)]
pub struct PgAttemptLedger {
    pool: PgPool,
}

impl PgAttemptLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All attempts for one subscription's saga, in write order across
    /// every invocation (original call plus reschedules).
    pub async fn history(&self, subscription_id: &str) -> RebillResult<Vec<PaymentAttempt>> {
        let attempts = sqlx::query_as::<_, PaymentAttempt>(
            r#"
            SELECT
                id,
                subscription_id,
                amount,
                status,
                attempt_count,
                scheduled_count,
                created_at,
                updated_at
            FROM payment_attempts
            WHERE subscription_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(subscription_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }
}

impl AttemptLedger for PgAttemptLedger {
    async fn record(
        &self,
        subscription_id: &str,
        amount: Decimal,
        status: &str,
        attempt_count: i32,
        scheduled_count: i32,
    ) -> RebillResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_attempts (
                subscription_id,
                amount,
                status,
                attempt_count,
                scheduled_count
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(subscription_id)
        .bind(amount)
        .bind(status)
        .bind(attempt_count)
        .bind(scheduled_count)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            subscription_id = %subscription_id,
            amount = %amount,
            status = %status,
            attempt_count = attempt_count,
            scheduled_count = scheduled_count,
            "Attempted charge recorded"
        );

        Ok(())
    }
}
