use alloy_primitives::Address;
use rust_decimal::Decimal;

/// Wallet connection lifecycle. `Connecting` is entered by `connect()` only;
/// notifications can move the session between `Idle` and `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
}

/// The one wallet session of the application. Owned behind a lock by
/// `WalletConnector`; everything else sees snapshots.
#[derive(Debug, Clone)]
pub struct WalletSession {
    pub connection: ConnectionState,
    /// Guard for the connect flow. Tracked separately from `connection` so
    /// a re-entrant `connect()` is refused even before the state renders.
    pub(crate) connecting: bool,
    pub address: Option<Address>,
    pub balance_wei: u128,
    pub token_price_usd: Option<Decimal>,
}

impl Default for WalletSession {
    fn default() -> Self {
        Self {
            connection: ConnectionState::Idle,
            connecting: false,
            address: None,
            balance_wei: 0,
            token_price_usd: None,
        }
    }
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pollers only run against a logged-in session.
    pub fn is_logged_in(&self) -> bool {
        self.connection == ConnectionState::Connected && self.address.is_some()
    }

    pub fn set_connected(&mut self, address: Address) {
        self.connection = ConnectionState::Connected;
        self.address = Some(address);
    }

    /// Back to a clean disconnected state.
    pub fn reset(&mut self) {
        self.connection = ConnectionState::Idle;
        self.address = None;
        self.balance_wei = 0;
    }

    /// Apply an `accountsChanged` notification. Zero accounts means the
    /// wallet dropped us.
    pub fn apply_accounts(&mut self, accounts: &[Address]) {
        match accounts.first() {
            Some(address) => self.set_connected(*address),
            None => self.reset(),
        }
    }
}
