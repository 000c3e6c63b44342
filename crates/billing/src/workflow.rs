//! Rebilling workflow
//!
//! Attempts to charge a target amount in decreasing percentage tranches
//! against the payment gateway, persisting every attempt to the ledger,
//! and schedules a follow-up rebill when funds remain uncharged after all
//! tranches are tried, up to a bounded number of reschedules.

use rust_decimal::Decimal;

use crate::error::{RebillError, RebillResult};
use crate::gateway::PaymentGateway;
use crate::ledger::AttemptLedger;
use crate::scheduler::RebillScheduler;

/// Ordered tranche percentages of the original amount.
pub const RETRY_PERCENTAGES: [u32; 4] = [100, 75, 50, 25];

/// Cap on how many times one saga may be rescheduled. Once a request
/// arrives with this generation, any remaining balance is dropped.
pub const MAX_SCHEDULED_REBILLS: i32 = 3;

/// Request-scoped context threaded through the tranche loop.
///
/// Carries the running counters for one invocation; nothing here survives
/// across reschedules except what is re-sent through the queue.
#[derive(Debug)]
struct RebillRequest {
    subscription_id: String,
    original_amount: Decimal,
    remaining_balance: Decimal,
    scheduled_count: i32,
    attempt_count: i32,
}

impl RebillRequest {
    fn new(subscription_id: &str, amount: Decimal, scheduled_count: i32) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            original_amount: amount,
            remaining_balance: amount,
            scheduled_count,
            attempt_count: 0,
        }
    }
}

/// Terminal charge outcome of the tranche loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// One tranche went through; `amount` is the charged tranche amount.
    Succeeded { amount: Decimal },
    /// Every attempted tranche came back with insufficient funds.
    InsufficientFunds,
}

/// Result of one workflow invocation.
///
/// Tagged result plus a boundary formatting step, instead of the legacy
/// single result string; `message()` renders the exact legacy wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebillReport {
    /// `None` when no tranche was ever attempted (amount <= 0).
    pub outcome: Option<ChargeOutcome>,
    /// Remaining balance handed to the scheduler, when a reschedule was
    /// issued.
    pub rescheduled: Option<Decimal>,
}

impl RebillReport {
    /// Human-readable result text.
    pub fn message(&self) -> String {
        let mut message = match &self.outcome {
            Some(ChargeOutcome::Succeeded { amount }) => {
                format!("Success. Charged amount: {}.", format_amount(*amount))
            }
            Some(ChargeOutcome::InsufficientFunds) => "Insufficient Funds.".to_string(),
            None => String::new(),
        };

        if let Some(amount) = self.rescheduled {
            message.push_str(&format!(
                " Rescheduled rebilling with amount: {}",
                format_amount(amount)
            ));
        }

        message
    }
}

/// Render an amount with at least one fractional digit, trimming any
/// further trailing zeros: `75` -> "75.0", `25.50` -> "25.5".
pub(crate) fn format_amount(amount: Decimal) -> String {
    let normalized = amount.normalize();
    if normalized.scale() == 0 {
        format!("{normalized}.0")
    } else {
        normalized.to_string()
    }
}

/// The rebilling workflow, generic over its three collaborators.
#[derive(Debug, Clone)]
pub struct RebillingWorkflow<G, L, S> {
    gateway: G,
    ledger: L,
    scheduler: S,
}

impl<G, L, S> RebillingWorkflow<G, L, S>
where
    G: PaymentGateway,
    L: AttemptLedger,
    S: RebillScheduler,
{
    pub fn new(gateway: G, ledger: L, scheduler: S) -> Self {
        Self {
            gateway,
            ledger,
            scheduler,
        }
    }

    /// Run one rebilling invocation.
    ///
    /// Iterates [`RETRY_PERCENTAGES`] while a balance remains: computes
    /// the tranche from the original amount, charges it, records the
    /// attempt, then interprets the outcome. A `success` stops the loop;
    /// `insufficient_funds` moves to the next tranche; `failed` and any
    /// unrecognized status abort the invocation with a typed error after
    /// the ledger row is already durable. After a normal loop exit, a
    /// remaining balance below the generation cap is handed to the
    /// scheduler for a one-week retry at generation + 1.
    pub async fn run(
        &self,
        subscription_id: &str,
        amount: Decimal,
        scheduled_count: i32,
    ) -> RebillResult<RebillReport> {
        let mut request = RebillRequest::new(subscription_id, amount, scheduled_count);
        let mut outcome = None;

        for percentage in RETRY_PERCENTAGES {
            if request.remaining_balance <= Decimal::ZERO {
                break;
            }

            // Tranche is a percentage of the original amount, never of
            // the remaining balance.
            let tranche =
                request.original_amount * Decimal::from(percentage) / Decimal::from(100u32);

            let response = self
                .gateway
                .create_payment_intent(tranche, &request.subscription_id)
                .await?;

            request.attempt_count += 1;
            self.ledger
                .record(
                    &request.subscription_id,
                    tranche,
                    &response.status,
                    request.attempt_count,
                    request.scheduled_count,
                )
                .await?;

            match response.status.as_str() {
                "success" => {
                    request.remaining_balance -= tranche;
                    outcome = Some(ChargeOutcome::Succeeded { amount: tranche });
                    break;
                }
                "insufficient_funds" => {
                    outcome = Some(ChargeOutcome::InsufficientFunds);
                }
                "failed" => {
                    return Err(RebillError::PaymentFailed {
                        subscription_id: request.subscription_id,
                        attempt: request.attempt_count,
                    });
                }
                other => {
                    return Err(RebillError::UnexpectedPaymentStatus {
                        status: other.to_string(),
                    });
                }
            }
        }

        let rescheduled = if request.remaining_balance > Decimal::ZERO
            && request.scheduled_count < MAX_SCHEDULED_REBILLS
        {
            self.scheduler
                .schedule_one_week(
                    &request.subscription_id,
                    request.remaining_balance,
                    request.scheduled_count + 1,
                )
                .await?;
            Some(request.remaining_balance)
        } else {
            None
        };

        Ok(RebillReport {
            outcome,
            rescheduled,
        })
    }
}
