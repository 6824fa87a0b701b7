pub mod backend;
pub mod chain;

pub use backend::BackendClient;
pub use chain::{ChainClient, ChainEvent, RpcChainClient};

use crate::error::ClientError;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

static RPC_ID: AtomicU64 = AtomicU64::new(1);

#[derive(serde::Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// One round trip against a JSON-RPC style endpoint. Both the chain gateway
/// and the wallet bridge speak this envelope.
pub(crate) async fn rpc_call(
    http: &reqwest::Client,
    url: &str,
    method: &str,
    params: Value,
) -> Result<Value, ClientError> {
    let request = RpcRequest {
        jsonrpc: "2.0",
        id: RPC_ID.fetch_add(1, Ordering::Relaxed),
        method,
        params,
    };

    let response: RpcResponse = http.post(url).json(&request).send().await?.json().await?;

    if let Some(err) = response.error {
        return Err(ClientError::from_rpc(err.code, err.message));
    }

    response
        .result
        .ok_or_else(|| ClientError::Malformed(format!("{method}: response had no result")))
}
