use crate::error::ClientError;
use crate::state::comment::{CommentRecord, NewComment};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attempts for the news feed. The one retry loop in the crate; everything
/// else fails on first error.
const NEWS_FETCH_ATTEMPTS: u32 = 3;

/// Free-text / category search request. The backend owns search truth;
/// the chain owns existence and odds.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub search_term: Option<String>,
    pub categories: Vec<String>,
    pub is_new: bool,
}

impl SearchFilter {
    /// An inactive filter short-circuits: no backend round trip at all.
    pub fn is_active(&self) -> bool {
        self.search_term.as_deref().is_some_and(|t| !t.is_empty())
            || !self.categories.is_empty()
            || self.is_new
    }
}

/// One row of the search response. Carries the off-chain enrichment that
/// gets merged onto the chain-sourced event.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "eventId")]
    pub event_id: u64,
    #[serde(default)]
    pub category: Option<String>,
}

/// Off-chain event metadata, posted after a successful on-chain create.
#[derive(Debug, Clone, Serialize)]
pub struct EventMetadata {
    #[serde(rename = "eventId")]
    pub event_id: u64,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Raffle {
    #[serde(rename = "raffleId")]
    pub raffle_id: u64,
    pub title: String,
    pub prize: String,
    #[serde(rename = "endsAt")]
    pub ends_at: i64,
    #[serde(default)]
    pub entrants: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRaffle {
    pub title: String,
    pub prize: String,
    #[serde(rename = "endsAt")]
    pub ends_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Deserialize)]
struct PriceResponse {
    usd: Decimal,
}

/// REST backend client: search, comments, raffles, news, report.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Read a response body, turning any non-2xx status into a recoverable
    /// `Backend` error rather than a parse failure further down.
    async fn read_json(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Backend {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Search events by free text / category / recency. Returns the
    /// matching ids plus their off-chain enrichment.
    pub async fn search_events(&self, filter: &SearchFilter) -> Result<Vec<SearchHit>, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(term) = filter.search_term.as_deref() {
            if !term.is_empty() {
                query.push(("searchTerm", term.to_string()));
            }
        }
        if !filter.categories.is_empty() {
            query.push(("categories", filter.categories.join(",")));
        }
        if filter.is_new {
            query.push(("isNew", "true".to_string()));
        }

        let response = self
            .http
            .get(self.url("/api/events/search"))
            .query(&query)
            .send()
            .await?;
        let payload = Self::read_json(response).await?;
        parse_search_payload(payload)
    }

    pub async fn create_event_metadata(&self, meta: &EventMetadata) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/api/events"))
            .json(meta)
            .send()
            .await?;
        Self::read_json(response).await?;
        Ok(())
    }

    pub async fn get_comments(&self, event_id: u64) -> Result<Vec<CommentRecord>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/comments/{event_id}")))
            .send()
            .await?;
        let payload = Self::read_json(response).await?;
        serde_json::from_value(payload)
            .map_err(|e| ClientError::Malformed(format!("comments: {e}")))
    }

    pub async fn post_comment(&self, comment: &NewComment) -> Result<CommentRecord, ClientError> {
        let response = self
            .http
            .post(self.url("/api/comments"))
            .json(comment)
            .send()
            .await?;
        let payload = Self::read_json(response).await?;
        serde_json::from_value(payload)
            .map_err(|e| ClientError::Malformed(format!("post comment: {e}")))
    }

    /// Tombstone a comment. The node stays in the thread, flagged deleted.
    pub async fn delete_comment(&self, comment_id: u64) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/comments/{comment_id}")))
            .send()
            .await?;
        Self::read_json(response).await?;
        Ok(())
    }

    pub async fn set_comment_liked(&self, comment_id: u64, liked: bool) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/api/comments/{comment_id}/like")))
            .json(&serde_json::json!({ "liked": liked }))
            .send()
            .await?;
        Self::read_json(response).await?;
        Ok(())
    }

    pub async fn get_raffles(&self) -> Result<Vec<Raffle>, ClientError> {
        let response = self.http.get(self.url("/api/raffles")).send().await?;
        let payload = Self::read_json(response).await?;
        serde_json::from_value(payload)
            .map_err(|e| ClientError::Malformed(format!("raffles: {e}")))
    }

    pub async fn create_raffle(&self, raffle: &NewRaffle) -> Result<Raffle, ClientError> {
        let response = self
            .http
            .post(self.url("/api/raffles"))
            .json(raffle)
            .send()
            .await?;
        let payload = Self::read_json(response).await?;
        serde_json::from_value(payload)
            .map_err(|e| ClientError::Malformed(format!("create raffle: {e}")))
    }

    /// News feed, retried a fixed number of times. No backoff between
    /// attempts.
    pub async fn get_news(&self) -> Result<Vec<NewsItem>, ClientError> {
        let mut last_err = None;
        for attempt in 1..=NEWS_FETCH_ATTEMPTS {
            match self.fetch_news_once().await {
                Ok(items) => return Ok(items),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "news fetch failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| ClientError::Malformed("news: no attempts".to_string())))
    }

    async fn fetch_news_once(&self) -> Result<Vec<NewsItem>, ClientError> {
        let response = self.http.get(self.url("/api/news")).send().await?;
        let payload = Self::read_json(response).await?;
        serde_json::from_value(payload).map_err(|e| ClientError::Malformed(format!("news: {e}")))
    }

    /// Admin profit report as PDF bytes.
    pub async fn report_pdf(&self, admin_profit_wei: u128) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/report/pdf"))
            .query(&[("adminProfit", admin_profit_wei.to_string())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Backend {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Current token price in USD, for the fiat display next to balances.
    pub async fn get_token_price(&self) -> Result<Decimal, ClientError> {
        let response = self.http.get(self.url("/api/price")).send().await?;
        let payload = Self::read_json(response).await?;
        let price: PriceResponse = serde_json::from_value(payload)
            .map_err(|e| ClientError::Malformed(format!("price: {e}")))?;
        Ok(price.usd)
    }
}

/// The search endpoint must answer with an array. Anything else (an error
/// object, a bare string) is treated as "no matches" upstream, surfaced as
/// a recoverable error here.
pub fn parse_search_payload(payload: Value) -> Result<Vec<SearchHit>, ClientError> {
    match payload {
        Value::Array(_) => serde_json::from_value(payload)
            .map_err(|e| ClientError::Malformed(format!("search: {e}"))),
        other => Err(ClientError::Malformed(format!(
            "search: expected array, got {other}"
        ))),
    }
}
