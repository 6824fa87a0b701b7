use crate::api::rpc_call;
use crate::error::ClientError;
use crate::state::NewEvent;
use alloy_primitives::Address;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;

/// Read surface of the betting contract, as exposed through the gateway.
/// The aggregator only ever reads; writes live on [`RpcChainClient`].
pub trait ChainClient: Send + Sync {
    /// Next unassigned event id. Valid ids are `1..next_event_id`.
    fn next_event_id(&self) -> impl Future<Output = Result<u64, ClientError>> + Send;

    fn get_event(&self, id: u64) -> impl Future<Output = Result<ChainEvent, ClientError>> + Send;

    fn get_event_options(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;

    /// Total staked on an event across all options, in wei.
    fn get_total_bets_for_event(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<u128, ClientError>> + Send;

    /// Total staked on one option of an event, in wei.
    fn get_bets_for_option(
        &self,
        id: u64,
        option: &str,
    ) -> impl Future<Output = Result<u128, ClientError>> + Send;
}

/// Event metadata as the contract stores it. Options and odds are fetched
/// separately; off-chain enrichment (category) comes from the backend.
#[derive(Debug, Clone)]
pub struct ChainEvent {
    pub event_id: u64,
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Unix seconds. Always `start_time < end_time` on chain.
    pub start_time: i64,
    pub end_time: i64,
    pub is_completed: bool,
    /// Set only once the event completed; always one of the options.
    pub winning_option: Option<String>,
    /// Prize pool in wei.
    pub prize_pool: u128,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(rename = "eventId")]
    event_id: u64,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "imageURL", default)]
    image_url: String,
    #[serde(rename = "startTime")]
    start_time: i64,
    #[serde(rename = "endTime")]
    end_time: i64,
    #[serde(rename = "isCompleted", default)]
    is_completed: bool,
    // Empty string while the event is still open.
    #[serde(rename = "winningOption", default)]
    winning_option: String,
    #[serde(rename = "prizePool", default)]
    prize_pool: Value,
}

impl EventPayload {
    fn into_chain_event(self) -> Result<ChainEvent, ClientError> {
        Ok(ChainEvent {
            event_id: self.event_id,
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            start_time: self.start_time,
            end_time: self.end_time,
            is_completed: self.is_completed,
            winning_option: if self.winning_option.is_empty() {
                None
            } else {
                Some(self.winning_option)
            },
            prize_pool: wei_from_value(&self.prize_pool)?,
        })
    }
}

/// Wei amounts arrive either as a decimal string (the usual case, since
/// they exceed JSON's safe integer range) or as a plain number.
fn wei_from_value(value: &Value) -> Result<u128, ClientError> {
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| ClientError::Malformed(format!("negative wei amount: {n}"))),
        Value::String(s) if s.is_empty() => Ok(0),
        Value::String(s) => s
            .parse::<u128>()
            .map_err(|_| ClientError::Malformed(format!("unparseable wei amount: {s:?}"))),
        other => Err(ClientError::Malformed(format!(
            "expected wei amount, got {other}"
        ))),
    }
}

/// Chain gateway client speaking the JSON-RPC envelope over HTTP.
#[derive(Debug, Clone)]
pub struct RpcChainClient {
    http: reqwest::Client,
    gateway_url: String,
}

impl RpcChainClient {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            gateway_url: gateway_url.into(),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        rpc_call(&self.http, &self.gateway_url, method, params).await
    }

    /// Contract admin address.
    pub async fn admin(&self) -> Result<Address, ClientError> {
        let result = self.call("admin", json!([])).await?;
        serde_json::from_value(result)
            .map_err(|e| ClientError::Malformed(format!("admin: {e}")))
    }

    /// Accumulated admin profit in wei. Feeds the PDF report query.
    pub async fn total_admin_profit(&self) -> Result<u128, ClientError> {
        let result = self.call("totalAdminProfit", json!([])).await?;
        wei_from_value(&result)
    }

    /// Stake `amount_wei` on an option. Returns the transaction hash.
    pub async fn place_bet(
        &self,
        from: Address,
        event_id: u64,
        option: &str,
        amount_wei: u128,
    ) -> Result<String, ClientError> {
        if amount_wei == 0 {
            return Err(ClientError::Validation(
                "Bet amount must be greater than zero".to_string(),
            ));
        }
        let result = self
            .call(
                "placeBet",
                json!([{
                    "from": from,
                    "eventId": event_id,
                    "option": option,
                    "value": amount_wei.to_string(),
                }]),
            )
            .await?;
        tx_hash(result)
    }

    /// Create an event on chain. Returns the assigned event id.
    pub async fn create_event(&self, from: Address, params: &NewEvent) -> Result<u64, ClientError> {
        params.validate()?;
        let result = self
            .call(
                "createEvent",
                json!([{
                    "from": from,
                    "name": params.name,
                    "description": params.description,
                    "imageURL": params.image_url,
                    "options": params.options,
                    "startTime": params.start_time,
                    "endTime": params.end_time,
                }]),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| ClientError::Malformed(format!("createEvent: {e}")))
    }

    /// Settle an event. The caller must have checked the option is one of
    /// the event's options (validation, not a chain round trip).
    pub async fn declare_winner(
        &self,
        from: Address,
        event_id: u64,
        option: &str,
    ) -> Result<String, ClientError> {
        let result = self
            .call(
                "declareWinner",
                json!([{
                    "from": from,
                    "eventId": event_id,
                    "option": option,
                }]),
            )
            .await?;
        tx_hash(result)
    }
}

fn tx_hash(result: Value) -> Result<String, ClientError> {
    match result {
        Value::String(hash) => Ok(hash),
        other => Err(ClientError::Malformed(format!(
            "expected transaction hash, got {other}"
        ))),
    }
}

impl ChainClient for RpcChainClient {
    async fn next_event_id(&self) -> Result<u64, ClientError> {
        let result = self.call("nextEventId", json!([])).await?;
        serde_json::from_value(result)
            .map_err(|e| ClientError::Malformed(format!("nextEventId: {e}")))
    }

    async fn get_event(&self, id: u64) -> Result<ChainEvent, ClientError> {
        let result = self.call("getEvent", json!([id])).await?;
        let payload: EventPayload = serde_json::from_value(result)
            .map_err(|e| ClientError::Malformed(format!("getEvent({id}): {e}")))?;
        payload.into_chain_event()
    }

    async fn get_event_options(&self, id: u64) -> Result<Vec<String>, ClientError> {
        let result = self.call("getEventOptions", json!([id])).await?;
        serde_json::from_value(result)
            .map_err(|e| ClientError::Malformed(format!("getEventOptions({id}): {e}")))
    }

    async fn get_total_bets_for_event(&self, id: u64) -> Result<u128, ClientError> {
        let result = self.call("getTotalBetsForEvent", json!([id])).await?;
        wei_from_value(&result)
    }

    async fn get_bets_for_option(&self, id: u64, option: &str) -> Result<u128, ClientError> {
        let result = self.call("getBetsForOption", json!([id, option])).await?;
        wei_from_value(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_payload_open_event() {
        let payload: EventPayload = serde_json::from_value(json!({
            "eventId": 3,
            "name": "Premier League Final",
            "description": "Who lifts the trophy",
            "imageURL": "https://img.example/3.png",
            "startTime": 1_700_000_000,
            "endTime": 1_700_100_000,
            "isCompleted": false,
            "winningOption": "",
            "prizePool": "2500000000000000000"
        }))
        .unwrap();

        let event = payload.into_chain_event().unwrap();
        assert_eq!(event.event_id, 3);
        assert_eq!(event.winning_option, None);
        assert_eq!(event.prize_pool, 2_500_000_000_000_000_000);
        assert!(!event.is_completed);
    }

    #[test]
    fn test_event_payload_completed_event() {
        let payload: EventPayload = serde_json::from_value(json!({
            "eventId": 1,
            "name": "Election",
            "startTime": 100,
            "endTime": 200,
            "isCompleted": true,
            "winningOption": "Candidate A",
            "prizePool": 0
        }))
        .unwrap();

        let event = payload.into_chain_event().unwrap();
        assert_eq!(event.winning_option.as_deref(), Some("Candidate A"));
        assert_eq!(event.prize_pool, 0);
    }

    #[test]
    fn test_wei_from_value_shapes() {
        assert_eq!(wei_from_value(&json!("42")).unwrap(), 42);
        assert_eq!(wei_from_value(&json!(42)).unwrap(), 42);
        assert_eq!(wei_from_value(&json!("")).unwrap(), 0);
        assert_eq!(wei_from_value(&Value::Null).unwrap(), 0);
        assert_eq!(
            wei_from_value(&json!("340282366920938463463374607431768211455")).unwrap(),
            u128::MAX
        );
    }

    #[test]
    fn test_wei_from_value_rejects_garbage() {
        assert!(matches!(
            wei_from_value(&json!("not-a-number")),
            Err(ClientError::Malformed(_))
        ));
        assert!(matches!(
            wei_from_value(&json!(-5)),
            Err(ClientError::Malformed(_))
        ));
        assert!(matches!(
            wei_from_value(&json!({"wei": 1})),
            Err(ClientError::Malformed(_))
        ));
    }
}
