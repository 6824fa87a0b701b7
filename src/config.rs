use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Chain gateway URL (JSON-RPC style endpoint fronting the contract).
    pub gateway_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// REST backend base URL (comments, raffles, news, search).
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Wallet bridge URL (eth_requestAccounts and friends).
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,
    /// Balance refresh interval in seconds.
    #[serde(default = "default_balance_poll")]
    pub balance_poll_secs: u64,
    /// Token price refresh interval in seconds.
    #[serde(default = "default_price_poll")]
    pub price_poll_secs: u64,
    /// Settle delay before issuing a connect prompt, in milliseconds.
    /// Lets a just-resolved previous prompt propagate at the bridge.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    /// How often the notification pump polls the bridge for account or
    /// chain changes, in seconds.
    #[serde(default = "default_notify_poll")]
    pub notify_poll_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:8546".to_string()
}

fn default_balance_poll() -> u64 {
    30
}

fn default_price_poll() -> u64 {
    60
}

fn default_settle_delay() -> u64 {
    300
}

fn default_notify_poll() -> u64 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            bridge_url: default_bridge_url(),
            balance_poll_secs: default_balance_poll(),
            price_poll_secs: default_price_poll(),
            settle_delay_ms: default_settle_delay(),
            notify_poll_secs: default_notify_poll(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}
