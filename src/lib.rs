//! Client core for a decentralized event-betting platform.
//!
//! Talks to three external systems through their interfaces and nothing
//! more: a chain gateway fronting the betting contract, a REST backend for
//! off-chain persistence (search, comments, raffles, news), and a wallet
//! bridge for the user's accounts. The two pieces with real invariants are
//! the [`aggregator`] (event enumeration and odds computation) and the
//! [`wallet`] connector (a guarded, race-free connect flow).

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod state;
pub mod sync;
pub mod wallet;
