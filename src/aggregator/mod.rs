pub mod odds;

pub use odds::{compute_odds, uniform_odds, zero_odds};

use crate::api::backend::{BackendClient, SearchFilter, SearchHit};
use crate::api::chain::ChainClient;
use crate::error::ClientError;
use crate::state::{BettingEvent, ListingKind, OddsEntry};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Builds display-ready event listings: enumerate the chain's id range,
/// compute odds per event, merge backend search results.
pub struct EventAggregator<C> {
    chain: C,
}

impl<C: ChainClient> EventAggregator<C> {
    pub fn new(chain: C) -> Self {
        Self { chain }
    }

    /// Load every event matching the listing, odds included.
    pub async fn load_listing(&self, kind: ListingKind) -> Result<Vec<BettingEvent>, ClientError> {
        self.load_listing_at(kind, chrono::Utc::now().timestamp())
            .await
    }

    /// Same as [`load_listing`](Self::load_listing) with an injected clock.
    ///
    /// Ids are visited sequentially in increasing order. A failing id is
    /// skipped, not fatal: partial results beat an empty page because one
    /// event is unreadable.
    pub async fn load_listing_at(
        &self,
        kind: ListingKind,
        now: i64,
    ) -> Result<Vec<BettingEvent>, ClientError> {
        let next_id = self.chain.next_event_id().await?;
        let mut events = Vec::new();

        for id in 1..next_id {
            let chain_event = match self.chain.get_event(id).await {
                Ok(event) => event,
                Err(e) => {
                    warn!(id, error = %e, "skipping event: metadata fetch failed");
                    continue;
                }
            };

            if !kind.includes(chain_event.start_time, now) {
                continue;
            }

            let options = match self.chain.get_event_options(id).await {
                Ok(options) => options,
                Err(e) => {
                    warn!(id, error = %e, "skipping event: options fetch failed");
                    continue;
                }
            };

            let odds = self.load_odds(id, &options).await;
            events.push(BettingEvent::from_chain(chain_event, options, odds));
        }

        kind.sort(&mut events);
        debug!(kind = ?kind, count = events.len(), "listing loaded");
        Ok(events)
    }

    /// One event with fresh odds, for the detail page. Unlike the listing
    /// path, a missing event here is an error the caller surfaces.
    pub async fn load_event(&self, id: u64) -> Result<BettingEvent, ClientError> {
        let chain_event = self.chain.get_event(id).await?;
        let options = self.chain.get_event_options(id).await?;
        let odds = self.load_odds(id, &options).await;
        Ok(BettingEvent::from_chain(chain_event, options, odds))
    }

    /// Odds for one event. Fail-soft: any per-option failure flattens the
    /// whole event to zeros rather than erroring out of the listing.
    async fn load_odds(&self, id: u64, options: &[String]) -> Vec<OddsEntry> {
        let total = match self.chain.get_total_bets_for_event(id).await {
            Ok(total) => total,
            Err(e) => {
                warn!(id, error = %e, "total bets fetch failed, odds fall back to 0");
                return zero_odds(options);
            }
        };

        if total == 0 {
            return uniform_odds(options);
        }

        let mut per_option = Vec::with_capacity(options.len());
        for option in options {
            match self.chain.get_bets_for_option(id, option).await {
                Ok(bets) => per_option.push(bets),
                Err(e) => {
                    warn!(id, option = %option, error = %e, "option bets fetch failed, odds fall back to 0");
                    return zero_odds(options);
                }
            }
        }

        compute_odds(options, &per_option, total)
    }

    /// Narrow a loaded listing by search. With no active filter the listing
    /// passes through untouched; otherwise the backend decides which ids
    /// match and the chain-sourced list is intersected with them.
    pub async fn apply_filters(
        &self,
        backend: &BackendClient,
        events: Vec<BettingEvent>,
        filter: &SearchFilter,
    ) -> Result<Vec<BettingEvent>, ClientError> {
        if !filter.is_active() {
            return Ok(events);
        }
        let hits = backend.search_events(filter).await?;
        Ok(intersect_with_hits(events, hits))
    }
}

/// Keep only events the search matched, in their existing order, merging
/// the backend's category enrichment onto each survivor.
pub fn intersect_with_hits(events: Vec<BettingEvent>, hits: Vec<SearchHit>) -> Vec<BettingEvent> {
    let by_id: HashMap<u64, Option<String>> = hits
        .into_iter()
        .map(|hit| (hit.event_id, hit.category))
        .collect();

    events
        .into_iter()
        .filter_map(|mut event| {
            let category = by_id.get(&event.event_id)?;
            if event.category.is_none() {
                event.category = category.clone();
            }
            Some(event)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::chain::ChainEvent;
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct FakeChain {
        next_id: u64,
        events: HashMap<u64, ChainEvent>,
        options: HashMap<u64, Vec<String>>,
        totals: HashMap<u64, u128>,
        bets: HashMap<(u64, String), u128>,
        broken_events: HashSet<u64>,
        broken_option_bets: HashSet<u64>,
    }

    impl FakeChain {
        fn add_event(&mut self, id: u64, start_time: i64, options: &[&str]) {
            self.events.insert(
                id,
                ChainEvent {
                    event_id: id,
                    name: format!("event-{id}"),
                    description: String::new(),
                    image_url: String::new(),
                    start_time,
                    end_time: start_time + 3600,
                    is_completed: false,
                    winning_option: None,
                    prize_pool: 0,
                },
            );
            self.options
                .insert(id, options.iter().map(|s| s.to_string()).collect());
            self.next_id = self.next_id.max(id + 1);
        }

        fn stake(&mut self, id: u64, option: &str, amount: u128) {
            *self.bets.entry((id, option.to_string())).or_default() += amount;
            *self.totals.entry(id).or_default() += amount;
        }
    }

    fn unreachable_err() -> ClientError {
        ClientError::Rpc {
            code: -32000,
            message: "boom".to_string(),
        }
    }

    impl ChainClient for FakeChain {
        async fn next_event_id(&self) -> Result<u64, ClientError> {
            Ok(self.next_id)
        }

        async fn get_event(&self, id: u64) -> Result<ChainEvent, ClientError> {
            if self.broken_events.contains(&id) {
                return Err(unreachable_err());
            }
            self.events.get(&id).cloned().ok_or_else(unreachable_err)
        }

        async fn get_event_options(&self, id: u64) -> Result<Vec<String>, ClientError> {
            self.options.get(&id).cloned().ok_or_else(unreachable_err)
        }

        async fn get_total_bets_for_event(&self, id: u64) -> Result<u128, ClientError> {
            Ok(self.totals.get(&id).copied().unwrap_or(0))
        }

        async fn get_bets_for_option(&self, id: u64, option: &str) -> Result<u128, ClientError> {
            if self.broken_option_bets.contains(&id) {
                return Err(unreachable_err());
            }
            Ok(self
                .bets
                .get(&(id, option.to_string()))
                .copied()
                .unwrap_or(0))
        }
    }

    const NOW: i64 = 1_000_000;

    #[tokio::test]
    async fn test_failed_id_is_skipped_not_fatal() {
        let mut chain = FakeChain::default();
        for id in 1..=5 {
            chain.add_event(id, NOW - 100, &["Yes", "No"]);
        }
        chain.broken_events.insert(3);

        let aggregator = EventAggregator::new(chain);
        let events = aggregator
            .load_listing_at(ListingKind::Current, NOW)
            .await
            .unwrap();

        let mut ids: Vec<u64> = events.iter().map(|e| e.event_id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 4, 5]);
    }

    #[tokio::test]
    async fn test_current_listing_filters_and_sorts_descending() {
        let mut chain = FakeChain::default();
        chain.add_event(1, NOW - 500, &["Yes", "No"]);
        chain.add_event(2, NOW - 100, &["Yes", "No"]);
        chain.add_event(3, NOW + 500, &["Yes", "No"]);

        let aggregator = EventAggregator::new(chain);
        let events = aggregator
            .load_listing_at(ListingKind::Current, NOW)
            .await
            .unwrap();

        let ids: Vec<u64> = events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_upcoming_listing_is_soonest_first() {
        let mut chain = FakeChain::default();
        chain.add_event(1, NOW + 900, &["Yes", "No"]);
        chain.add_event(2, NOW + 100, &["Yes", "No"]);
        chain.add_event(3, NOW - 100, &["Yes", "No"]);

        let aggregator = EventAggregator::new(chain);
        let events = aggregator
            .load_listing_at(ListingKind::Upcoming, NOW)
            .await
            .unwrap();

        let ids: Vec<u64> = events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_unstaked_event_gets_uniform_odds() {
        let mut chain = FakeChain::default();
        chain.add_event(1, NOW - 100, &["Yes", "No"]);

        let aggregator = EventAggregator::new(chain);
        let events = aggregator
            .load_listing_at(ListingKind::Current, NOW)
            .await
            .unwrap();

        assert_eq!(events[0].odds[0].percentage, dec!(50.00));
        assert_eq!(events[0].odds[1].percentage, dec!(50.00));
    }

    #[tokio::test]
    async fn test_staked_event_gets_proportional_odds() {
        let mut chain = FakeChain::default();
        chain.add_event(1, NOW - 100, &["A", "B", "C"]);
        chain.stake(1, "A", 10);
        chain.stake(1, "B", 10);
        chain.stake(1, "C", 10);

        let aggregator = EventAggregator::new(chain);
        let event = aggregator.load_event(1).await.unwrap();

        for entry in &event.odds {
            assert_eq!(entry.percentage, dec!(33.33));
        }
    }

    #[tokio::test]
    async fn test_option_fetch_failure_flattens_odds_to_zero() {
        let mut chain = FakeChain::default();
        chain.add_event(1, NOW - 100, &["Yes", "No"]);
        chain.stake(1, "Yes", 70);
        chain.stake(1, "No", 30);
        chain.broken_option_bets.insert(1);

        let aggregator = EventAggregator::new(chain);
        let events = aggregator
            .load_listing_at(ListingKind::Current, NOW)
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert!(events[0]
            .odds
            .iter()
            .all(|e| e.percentage == rust_decimal::Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_empty_chain_yields_empty_listing() {
        let mut chain = FakeChain::default();
        chain.next_id = 1;

        let aggregator = EventAggregator::new(chain);
        let events = aggregator
            .load_listing_at(ListingKind::Current, NOW)
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_intersect_keeps_order_and_merges_category() {
        let mut chain = FakeChain::default();
        chain.add_event(1, NOW - 300, &["Yes", "No"]);
        chain.add_event(2, NOW - 200, &["Yes", "No"]);
        chain.add_event(3, NOW - 100, &["Yes", "No"]);

        let events: Vec<BettingEvent> = [3u64, 2, 1]
            .iter()
            .map(|id| {
                BettingEvent::from_chain(
                    chain.events[id].clone(),
                    chain.options[id].clone(),
                    Vec::new(),
                )
            })
            .collect();

        let hits = vec![
            SearchHit {
                event_id: 1,
                category: Some("sports".to_string()),
            },
            SearchHit {
                event_id: 3,
                category: None,
            },
        ];

        let filtered = intersect_with_hits(events, hits);
        let ids: Vec<u64> = filtered.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(filtered[1].category.as_deref(), Some("sports"));
    }

    #[tokio::test]
    async fn test_inactive_filter_is_a_passthrough() {
        let mut chain = FakeChain::default();
        chain.add_event(1, NOW - 100, &["Yes", "No"]);

        let aggregator = EventAggregator::new(chain);
        let events = aggregator
            .load_listing_at(ListingKind::Current, NOW)
            .await
            .unwrap();

        // No active filter: no backend round trip happens at all, so the
        // unreachable URL is never contacted.
        let backend = BackendClient::new("http://127.0.0.1:1");
        let out = aggregator
            .apply_filters(&backend, events.clone(), &SearchFilter::default())
            .await
            .unwrap();
        assert_eq!(out.len(), events.len());
    }
}
