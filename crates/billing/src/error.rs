//! Rebilling error types

use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors raised by the rebilling workflow.
///
/// `PaymentFailed` and `UnexpectedPaymentStatus` are the only business
/// failures: both halt the invocation immediately, skip the reschedule
/// evaluation, and leave already-written ledger rows intact. The other
/// variants are infrastructure failures from the collaborators.
#[derive(Debug, Error)]
pub enum RebillError {
    /// The gateway explicitly reported a failed charge. Non-retriable
    /// within this invocation.
    #[error("Failed payment for subscription {subscription_id} on attempt {attempt}")]
    PaymentFailed {
        subscription_id: String,
        attempt: i32,
    },

    /// The gateway returned a status outside the known outcome set.
    /// Carries the offending raw value for diagnostics.
    #[error("Received unexpected payment status: {status}")]
    UnexpectedPaymentStatus { status: String },

    /// Transport-level failure from the payment gateway client.
    #[error("payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Ledger or scheduler write failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RebillResult<T> = Result<T, RebillError>;
