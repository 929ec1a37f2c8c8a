use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

pub const DEFAULT_APPROVAL_URL: &str = "https://auth.privy.io/apps/x402-authorize";

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub frontend_origin: String,
    pub approval_url: String,
    pub payments_app_id: Option<String>,
    pub payments_api_key: Option<String>,
    pub payments_base_url: String,
    pub messaging_webhook_url: Option<String>,
    pub rpc_url: String,
    pub rpc_chain: String,
    pub rpc_token: String,
    pub storage_network: String,
    pub storage_api_key: Option<String>,
    pub scheduler_enabled: bool,
    pub http_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("frontend_origin", &self.frontend_origin)
            .field("approval_url", &self.approval_url)
            .field("payments_app_id", &self.payments_app_id)
            .field("payments_api_key", &self.payments_api_key.as_ref().map(|_| "<redacted>"))
            .field("payments_base_url", &self.payments_base_url)
            .field("messaging_webhook_url", &self.messaging_webhook_url.as_ref().map(|_| "<redacted>"))
            .field("rpc_url", &"<redacted>")
            .field("rpc_chain", &self.rpc_chain)
            .field("rpc_token", &self.rpc_token)
            .field("storage_network", &self.storage_network)
            .field("storage_api_key", &self.storage_api_key.as_ref().map(|_| "<redacted>"))
            .field("scheduler_enabled", &self.scheduler_enabled)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(4000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            frontend_origin: env::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            approval_url: env::var("AUTOPAY_APPROVAL_URL").unwrap_or_else(|_| DEFAULT_APPROVAL_URL.to_string()),
            payments_app_id: optional("PAYMENTS_APP_ID"),
            payments_api_key: optional("PAYMENTS_API_KEY"),
            payments_base_url: env::var("PAYMENTS_BASE_URL")
                .unwrap_or_else(|_| "https://auth.privy.io/api/v1".to_string()),
            messaging_webhook_url: optional("MESSAGING_WEBHOOK_URL"),
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| "https://rpc.ankr.com/eth".to_string()),
            rpc_chain: env::var("RPC_CHAIN").unwrap_or_else(|_| "ethereum".to_string()),
            rpc_token: env::var("RPC_TOKEN").unwrap_or_else(|_| "ETH".to_string()),
            storage_network: env::var("STORAGE_NETWORK").unwrap_or_else(|_| "mainnet".to_string()),
            storage_api_key: optional("STORAGE_API_KEY"),
            scheduler_enabled: env::var("SCHEDULER_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            http_timeout: Duration::from_secs(
                env::var("HTTP_CLIENT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15),
            ),
        }
    }

    /// Charges go to the real provider only when both credentials are set.
    pub fn payment_credentials(&self) -> Option<(&str, &str)> {
        match (&self.payments_app_id, &self.payments_api_key) {
            (Some(app_id), Some(api_key)) => Some((app_id.as_str(), api_key.as_str())),
            _ => None,
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
