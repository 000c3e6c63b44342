//! Server configuration

/// Configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Direct (non-pooled) URL for running migrations, when it differs
    /// from `database_url`.
    pub database_direct_url: Option<String>,
    pub bind_address: String,
    /// Payment gateway base URL; the simulated gateway is used when unset.
    pub gateway_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        Ok(Self {
            database_url,
            database_direct_url: std::env::var("DATABASE_DIRECT_URL").ok(),
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            gateway_base_url: std::env::var("GATEWAY_BASE_URL").ok().filter(|v| !v.is_empty()),
        })
    }
}
