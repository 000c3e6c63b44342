//! Payment gateway client
//!
//! The gateway is an external collaborator: given an amount and a
//! subscription id it answers with a raw status string. Only
//! `success`, `insufficient_funds` and `failed` are meaningful; anything
//! else is passed through untouched so the workflow can surface it as an
//! unexpected status. A value outside the known set is the workflow's
//! problem, never a client error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw gateway answer for one payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentResponse {
    pub status: String,
}

/// Transport-level gateway client failure.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Seam between the workflow and the external payment system.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn create_payment_intent(
        &self,
        amount: Decimal,
        subscription_id: &str,
    ) -> Result<PaymentIntentResponse, GatewayError>;
}

#[derive(Debug, Serialize)]
struct PaymentIntentRequest<'a> {
    subscription_id: &'a str,
    amount: Decimal,
}

/// HTTP-backed gateway client.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl PaymentGateway for HttpPaymentGateway {
    async fn create_payment_intent(
        &self,
        amount: Decimal,
        subscription_id: &str,
    ) -> Result<PaymentIntentResponse, GatewayError> {
        let url = format!("{}/payment_intents", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&PaymentIntentRequest {
                subscription_id,
                amount,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<PaymentIntentResponse>()
            .await?;

        Ok(response)
    }
}

/// Simulated gateway: samples one of the three known statuses at random,
/// like a sandbox payment API. Used when no gateway URL is configured.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPaymentGateway;

const SIMULATED_STATUSES: [&str; 3] = ["success", "insufficient_funds", "failed"];

impl SimulatedPaymentGateway {
    pub fn new() -> Self {
        Self
    }
}

impl PaymentGateway for SimulatedPaymentGateway {
    async fn create_payment_intent(
        &self,
        _amount: Decimal,
        _subscription_id: &str,
    ) -> Result<PaymentIntentResponse, GatewayError> {
        use rand::prelude::IndexedRandom;

        let status = SIMULATED_STATUSES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or("failed");

        Ok(PaymentIntentResponse {
            status: status.to_string(),
        })
    }
}

/// Production gateway client, selected from the environment.
#[derive(Debug, Clone)]
pub enum PaymentGatewayClient {
    Http(HttpPaymentGateway),
    Simulated(SimulatedPaymentGateway),
}

impl PaymentGatewayClient {
    /// Build from `GATEWAY_BASE_URL`; falls back to the simulated gateway
    /// when it is unset.
    pub fn from_env() -> Self {
        match std::env::var("GATEWAY_BASE_URL") {
            Ok(url) if !url.is_empty() => {
                tracing::info!(base_url = %url, "Payment gateway client initialized");
                Self::Http(HttpPaymentGateway::new(url))
            }
            _ => {
                tracing::warn!(
                    "GATEWAY_BASE_URL not set - using simulated payment gateway"
                );
                Self::Simulated(SimulatedPaymentGateway::new())
            }
        }
    }
}

impl PaymentGateway for PaymentGatewayClient {
    async fn create_payment_intent(
        &self,
        amount: Decimal,
        subscription_id: &str,
    ) -> Result<PaymentIntentResponse, GatewayError> {
        match self {
            Self::Http(gateway) => gateway.create_payment_intent(amount, subscription_id).await,
            Self::Simulated(gateway) => {
                gateway.create_payment_intent(amount, subscription_id).await
            }
        }
    }
}
