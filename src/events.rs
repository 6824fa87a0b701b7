use alloy_primitives::Address;
use rust_decimal::Decimal;

/// Events flowing into the main loop. Wallet notifications and the refresh
/// pollers all funnel through this one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A connect flow finished and the session holds this address.
    Connected { address: Address },

    /// The wallet bridge reported a new account set (may be empty).
    AccountsChanged { accounts: Vec<Address> },

    /// The wallet switched chains; the application must restart wholesale.
    ChainChanged { chain_id: u64 },

    /// The wallet bridge dropped the session.
    WalletDisconnected,

    /// Balance poller read a fresh balance (wei).
    BalanceRefreshed { wei: u128 },

    /// Price poller read a fresh token price (USD).
    PriceRefreshed { usd: Decimal },

    /// Full restart requested (chain switch). No reconciliation of
    /// in-flight reads is attempted.
    ReloadRequired,

    /// Periodic listing refresh timer.
    Tick,

    /// Ctrl+C or kill signal.
    Shutdown,
}
