use crate::api::chain::ChainEvent;
use crate::error::ClientError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

/// Which listing a page is showing. Inclusion and sort order are display
/// policy, not storage invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    /// Events already underway: `start_time <= now`, soonest-started last.
    Current,
    /// Events yet to start: `start_time > now`, soonest-first.
    Upcoming,
}

impl ListingKind {
    pub fn includes(&self, start_time: i64, now: i64) -> bool {
        match self {
            Self::Current => start_time <= now,
            Self::Upcoming => start_time > now,
        }
    }

    pub fn sort(&self, events: &mut [BettingEvent]) {
        match self {
            Self::Current => events.sort_by(|a, b| b.start_time.cmp(&a.start_time)),
            Self::Upcoming => events.sort_by(|a, b| a.start_time.cmp(&b.start_time)),
        }
    }
}

/// Relative odds for one option, as a percentage rounded to 2 decimals.
/// Entries for an event sum to roughly 100; rounding drift is accepted and
/// never renormalized away.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsEntry {
    pub option: String,
    pub percentage: Decimal,
}

/// A display-ready event: chain metadata, chain-derived odds, backend
/// enrichment. Odds are recomputed on every load, never cached.
#[derive(Debug, Clone)]
pub struct BettingEvent {
    pub event_id: u64,
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Off-chain enrichment from the backend, when search supplied it.
    pub category: Option<String>,
    pub options: Vec<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub is_completed: bool,
    pub winning_option: Option<String>,
    pub prize_pool: u128,
    pub odds: Vec<OddsEntry>,
}

impl BettingEvent {
    pub fn from_chain(chain: ChainEvent, options: Vec<String>, odds: Vec<OddsEntry>) -> Self {
        Self {
            event_id: chain.event_id,
            name: chain.name,
            description: chain.description,
            image_url: chain.image_url,
            category: None,
            options,
            start_time: chain.start_time,
            end_time: chain.end_time,
            is_completed: chain.is_completed,
            winning_option: chain.winning_option,
            prize_pool: chain.prize_pool,
            odds,
        }
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Prize pool in whole tokens, for display.
    pub fn prize_pool_tokens(&self) -> Decimal {
        wei_to_tokens(self.prize_pool)
    }
}

/// Parameters for an on-chain event creation, validated before any network
/// traffic is issued.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub category: String,
    pub options: Vec<String>,
    pub start_time: i64,
    pub end_time: i64,
}

impl NewEvent {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty() {
            return Err(ClientError::Validation("Event name is required".to_string()));
        }
        if self.options.len() < 2 {
            return Err(ClientError::Validation(
                "An event needs at least 2 options".to_string(),
            ));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(ClientError::Validation(
                "Option labels must not be empty".to_string(),
            ));
        }
        let distinct: HashSet<&str> = self.options.iter().map(String::as_str).collect();
        if distinct.len() != self.options.len() {
            return Err(ClientError::Validation(
                "Option labels must be distinct".to_string(),
            ));
        }
        if self.start_time >= self.end_time {
            return Err(ClientError::Validation(
                "Start time must be before end time".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bet preconditions, checked client-side so no failing transaction is ever
/// submitted for an input mistake.
pub fn validate_bet(event: &BettingEvent, option: &str, amount_wei: u128) -> Result<(), ClientError> {
    if event.is_completed {
        return Err(ClientError::Validation(
            "This event has already been settled".to_string(),
        ));
    }
    if !event.has_option(option) {
        return Err(ClientError::Validation(format!(
            "\"{option}\" is not an option of this event"
        )));
    }
    if amount_wei == 0 {
        return Err(ClientError::Validation(
            "Bet amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// The declared winner must be one of the event's options.
pub fn validate_winner(event: &BettingEvent, option: &str) -> Result<(), ClientError> {
    if !event.has_option(option) {
        return Err(ClientError::Validation(format!(
            "\"{option}\" is not an option of this event"
        )));
    }
    Ok(())
}

/// Wei to whole tokens. Pure display transform at the UI edge, never used
/// for arithmetic.
pub fn wei_to_tokens(wei: u128) -> Decimal {
    match Decimal::try_from(wei) {
        Ok(d) => d / dec!(1_000_000_000_000_000_000),
        // Beyond Decimal's mantissa; saturate rather than lie with a wrap.
        Err(_) => Decimal::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(event_id: u64, start_time: i64) -> BettingEvent {
        BettingEvent {
            event_id,
            name: format!("event-{event_id}"),
            description: String::new(),
            image_url: String::new(),
            category: None,
            options: vec!["Yes".to_string(), "No".to_string()],
            start_time,
            end_time: start_time + 3600,
            is_completed: false,
            winning_option: None,
            prize_pool: 0,
            odds: Vec::new(),
        }
    }

    #[test]
    fn test_listing_inclusion() {
        let now = 1_000;
        assert!(ListingKind::Current.includes(900, now));
        assert!(ListingKind::Current.includes(1_000, now));
        assert!(!ListingKind::Current.includes(1_001, now));

        assert!(ListingKind::Upcoming.includes(1_001, now));
        assert!(!ListingKind::Upcoming.includes(1_000, now));
    }

    #[test]
    fn test_current_sorts_descending() {
        let mut events = vec![sample_event(1, 100), sample_event(2, 300), sample_event(3, 200)];
        ListingKind::Current.sort(&mut events);
        let ids: Vec<u64> = events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_upcoming_sorts_ascending() {
        let mut events = vec![sample_event(1, 300), sample_event(2, 100), sample_event(3, 200)];
        ListingKind::Upcoming.sort(&mut events);
        let ids: Vec<u64> = events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_new_event_validation() {
        let good = NewEvent {
            name: "Derby".to_string(),
            description: String::new(),
            image_url: String::new(),
            category: "sports".to_string(),
            options: vec!["Home".to_string(), "Away".to_string()],
            start_time: 100,
            end_time: 200,
        };
        assert!(good.validate().is_ok());

        let mut bad = good.clone();
        bad.name = "  ".to_string();
        assert!(matches!(bad.validate(), Err(ClientError::Validation(_))));

        let mut bad = good.clone();
        bad.options = vec!["Home".to_string()];
        assert!(matches!(bad.validate(), Err(ClientError::Validation(_))));

        let mut bad = good.clone();
        bad.options = vec!["Home".to_string(), "Home".to_string()];
        assert!(matches!(bad.validate(), Err(ClientError::Validation(_))));

        let mut bad = good.clone();
        bad.start_time = 200;
        bad.end_time = 200;
        assert!(matches!(bad.validate(), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_bet_validation() {
        let event = sample_event(1, 100);
        assert!(validate_bet(&event, "Yes", 1).is_ok());
        assert!(matches!(
            validate_bet(&event, "Maybe", 1),
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            validate_bet(&event, "Yes", 0),
            Err(ClientError::Validation(_))
        ));

        let mut settled = sample_event(2, 100);
        settled.is_completed = true;
        settled.winning_option = Some("No".to_string());
        assert!(matches!(
            validate_bet(&settled, "Yes", 1),
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn test_winner_validation() {
        let event = sample_event(1, 100);
        assert!(validate_winner(&event, "No").is_ok());
        assert!(matches!(
            validate_winner(&event, "Draw"),
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn test_wei_to_tokens() {
        use rust_decimal_macros::dec;
        assert_eq!(wei_to_tokens(1_000_000_000_000_000_000), dec!(1));
        assert_eq!(wei_to_tokens(2_500_000_000_000_000_000), dec!(2.5));
        assert_eq!(wei_to_tokens(0), dec!(0));
    }
}
