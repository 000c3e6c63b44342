//! Application state

use rebill_billing::{PaymentGatewayClient, RebillingService};
use sqlx::PgPool;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub rebilling: RebillingService,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let gateway = match &config.gateway_base_url {
            Some(url) => {
                tracing::info!(base_url = %url, "Payment gateway client initialized");
                PaymentGatewayClient::Http(rebill_billing::HttpPaymentGateway::new(url.clone()))
            }
            None => {
                tracing::warn!("GATEWAY_BASE_URL not set - using simulated payment gateway");
                PaymentGatewayClient::Simulated(rebill_billing::SimulatedPaymentGateway::new())
            }
        };

        let rebilling = RebillingService::new(gateway, pool.clone());
        tracing::info!("Rebilling service initialized");

        Self {
            pool,
            config,
            rebilling,
        }
    }
}
