// Billing crate clippy configuration
// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Rebill Billing Core
//!
//! Implements the subscription rebilling workflow: a target amount is
//! attempted in decreasing percentage tranches (100/75/50/25) against the
//! payment gateway, every attempt is appended to a durable ledger, and an
//! uncharged remainder is handed to the rebill scheduler for a one-week
//! retry, up to three reschedules per saga.
//!
//! ## Components
//!
//! - **Workflow**: the tranche loop and its termination/escalation rules
//! - **Gateway**: HTTP or simulated payment gateway client
//! - **Ledger**: append-only `payment_attempts` audit trail
//! - **Scheduler**: durable delayed-delivery queue (`scheduled_rebills`)
//!   consumed by the background worker

pub mod error;
pub mod gateway;
pub mod ledger;
pub mod scheduler;
pub mod workflow;

#[cfg(test)]
mod edge_case_tests;

// Error
pub use error::{RebillError, RebillResult};

// Gateway
pub use gateway::{
    GatewayError, HttpPaymentGateway, PaymentGateway, PaymentGatewayClient, PaymentIntentResponse,
    SimulatedPaymentGateway,
};

// Ledger
pub use ledger::{AttemptLedger, PaymentAttempt, PgAttemptLedger};

// Scheduler
pub use scheduler::{PgRebillScheduler, RebillScheduler, ScheduledRebill, REBILL_DELAY};

// Workflow
pub use workflow::{
    ChargeOutcome, RebillReport, RebillingWorkflow, MAX_SCHEDULED_REBILLS, RETRY_PERCENTAGES,
};

use rust_decimal::Decimal;
use sqlx::PgPool;

/// Production rebilling service: the workflow wired to the configured
/// gateway client and the Postgres-backed ledger and scheduler.
#[derive(Debug, Clone)]
pub struct RebillingService {
    workflow: RebillingWorkflow<PaymentGatewayClient, PgAttemptLedger, PgRebillScheduler>,
    ledger: PgAttemptLedger,
}

impl RebillingService {
    /// Create a rebilling service with the gateway selected from the
    /// environment (`GATEWAY_BASE_URL`, simulated when unset).
    pub fn from_env(pool: PgPool) -> Self {
        Self::new(PaymentGatewayClient::from_env(), pool)
    }

    pub fn new(gateway: PaymentGatewayClient, pool: PgPool) -> Self {
        let ledger = PgAttemptLedger::new(pool.clone());
        Self {
            workflow: RebillingWorkflow::new(
                gateway,
                ledger.clone(),
                PgRebillScheduler::new(pool),
            ),
            ledger,
        }
    }

    /// Run one rebilling invocation. Both entry points (HTTP trigger and
    /// the delayed-job worker) come through here with the same three
    /// inputs.
    pub async fn rebill(
        &self,
        subscription_id: &str,
        amount: Decimal,
        scheduled_count: i32,
    ) -> RebillResult<RebillReport> {
        self.workflow.run(subscription_id, amount, scheduled_count).await
    }

    /// The saga's full attempt history, across all invocations.
    pub async fn attempt_history(
        &self,
        subscription_id: &str,
    ) -> RebillResult<Vec<PaymentAttempt>> {
        self.ledger.history(subscription_id).await
    }
}
