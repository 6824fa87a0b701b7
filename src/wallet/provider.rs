use crate::api::rpc_call;
use crate::error::ClientError;
use alloy_primitives::Address;
use serde_json::{json, Value};
use std::future::Future;

/// The wallet bridge surface this crate consumes. One implementation talks
/// JSON-RPC to the real bridge; tests substitute fakes.
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet to expose accounts. Opens a prompt at the wallet:
    /// one call, one prompt.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, ClientError>> + Send;

    /// Currently exposed accounts, without prompting.
    fn accounts(&self) -> impl Future<Output = Result<Vec<Address>, ClientError>> + Send;

    /// Active chain id.
    fn chain_id(&self) -> impl Future<Output = Result<u64, ClientError>> + Send;

    /// Balance of an address in wei.
    fn balance(&self, address: Address) -> impl Future<Output = Result<u128, ClientError>> + Send;
}

/// Wallet bridge client over the JSON-RPC envelope.
#[derive(Debug, Clone)]
pub struct RpcWalletProvider {
    http: reqwest::Client,
    bridge_url: String,
}

impl RpcWalletProvider {
    pub fn new(bridge_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            bridge_url: bridge_url.into(),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        rpc_call(&self.http, &self.bridge_url, method, params).await
    }
}

impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError> {
        let result = self.call("eth_requestAccounts", json!([])).await?;
        serde_json::from_value(result)
            .map_err(|e| ClientError::Malformed(format!("eth_requestAccounts: {e}")))
    }

    async fn accounts(&self) -> Result<Vec<Address>, ClientError> {
        let result = self.call("eth_accounts", json!([])).await?;
        serde_json::from_value(result)
            .map_err(|e| ClientError::Malformed(format!("eth_accounts: {e}")))
    }

    async fn chain_id(&self) -> Result<u64, ClientError> {
        let result = self.call("eth_chainId", json!([])).await?;
        parse_quantity(&result)
    }

    async fn balance(&self, address: Address) -> Result<u128, ClientError> {
        let result = self.call("eth_getBalance", json!([address, "latest"])).await?;
        parse_wide_quantity(&result)
    }
}

/// Quantities arrive as 0x-prefixed hex (the eth convention), a decimal
/// string, or a bare number.
fn parse_quantity(value: &Value) -> Result<u64, ClientError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ClientError::Malformed(format!("negative quantity: {n}"))),
        Value::String(s) => {
            if let Some(hex) = s.strip_prefix("0x") {
                u64::from_str_radix(hex, 16)
                    .map_err(|_| ClientError::Malformed(format!("bad hex quantity: {s:?}")))
            } else {
                s.parse::<u64>()
                    .map_err(|_| ClientError::Malformed(format!("bad quantity: {s:?}")))
            }
        }
        other => Err(ClientError::Malformed(format!(
            "expected quantity, got {other}"
        ))),
    }
}

/// Balances can exceed u64; parse the same shapes at u128 width.
fn parse_wide_quantity(value: &Value) -> Result<u128, ClientError> {
    match value {
        Value::String(s) => {
            if let Some(hex) = s.strip_prefix("0x") {
                u128::from_str_radix(hex, 16)
                    .map_err(|_| ClientError::Malformed(format!("bad hex quantity: {s:?}")))
            } else {
                s.parse::<u128>()
                    .map_err(|_| ClientError::Malformed(format!("bad quantity: {s:?}")))
            }
        }
        other => parse_quantity(other).map(u128::from),
    }
}
