use anyhow::Context;
use betboard_rs::aggregator::EventAggregator;
use betboard_rs::api::{BackendClient, ChainClient, RpcChainClient};
use betboard_rs::config::Config;
use betboard_rs::events::AppEvent;
use betboard_rs::state::event::wei_to_tokens;
use betboard_rs::state::ListingKind;
use betboard_rs::wallet::{
    spawn_balance_poller, spawn_notification_pump, spawn_price_poller, RpcWalletProvider,
    WalletConnector,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    let config = Config::load("betboard.toml").context("failed to load betboard.toml")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(gateway = %config.chain.gateway_url, backend = %config.backend.base_url, "starting betboard");

    let chain = RpcChainClient::new(config.chain.gateway_url.clone());
    let backend = BackendClient::new(config.backend.base_url.clone());
    let provider = RpcWalletProvider::new(config.wallet.bridge_url.clone());
    let connector = WalletConnector::new(
        provider,
        Duration::from_millis(config.wallet.settle_delay_ms),
    );
    let aggregator = EventAggregator::new(chain.clone());

    // Create the event channel
    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);

    // Connect the wallet. Browsing stays available read-only on failure.
    match connector.connect().await {
        Ok(address) => {
            let _ = tx.send(AppEvent::Connected { address }).await;
        }
        Err(e) => warn!(error = %e, "{}", e.user_message()),
    }

    spawn_notification_pump(
        connector.clone(),
        tx.clone(),
        Duration::from_secs(config.wallet.notify_poll_secs),
    );
    spawn_balance_poller(
        connector.provider(),
        connector.session_handle(),
        tx.clone(),
        Duration::from_secs(config.wallet.balance_poll_secs),
    );
    spawn_price_poller(
        backend.clone(),
        connector.session_handle(),
        tx.clone(),
        Duration::from_secs(config.wallet.price_poll_secs),
    );

    // Listing refresh timer.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).await.is_err() {
                    return;
                }
            }
        });
    }

    // Ctrl+C handler.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(AppEvent::Shutdown).await;
            }
        });
    }

    show_listings(&aggregator).await;

    // Main event loop
    while let Some(event) = rx.recv().await {
        match event {
            AppEvent::Connected { address } => {
                info!(%address, "session ready");
                // Admins get their accumulated profit on login.
                if let Ok(admin) = chain.admin().await {
                    if admin == address {
                        match chain.total_admin_profit().await {
                            Ok(profit) => {
                                info!(profit = %wei_to_tokens(profit).round_dp(4), "admin profit")
                            }
                            Err(e) => warn!(error = %e, "could not read admin profit"),
                        }
                    }
                }
            }
            AppEvent::AccountsChanged { accounts } => {
                info!(count = accounts.len(), "wallet accounts changed");
            }
            AppEvent::WalletDisconnected => info!("wallet disconnected"),
            AppEvent::BalanceRefreshed { wei } => {
                info!(balance = %wei_to_tokens(wei).round_dp(4), "balance refreshed");
            }
            AppEvent::PriceRefreshed { usd } => info!(%usd, "price refreshed"),
            AppEvent::ChainChanged { chain_id } => warn!(chain_id, "wallet switched chains"),
            AppEvent::ReloadRequired => {
                // Chain-switch policy is a wholesale restart; nothing tries
                // to reconcile reads across the switch.
                warn!("chain switched, exiting for a clean restart");
                break;
            }
            AppEvent::Tick => show_listings(&aggregator).await,
            AppEvent::Shutdown => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Log the current and upcoming listings with their computed odds.
async fn show_listings<C: ChainClient>(aggregator: &EventAggregator<C>) {
    for kind in [ListingKind::Current, ListingKind::Upcoming] {
        match aggregator.load_listing(kind).await {
            Ok(events) => {
                info!(kind = ?kind, count = events.len(), "listing loaded");
                for event in &events {
                    let odds: Vec<String> = event
                        .odds
                        .iter()
                        .map(|entry| format!("{} {}%", entry.option, entry.percentage))
                        .collect();
                    info!(
                        id = event.event_id,
                        name = %event.name,
                        prize = %event.prize_pool_tokens().round_dp(4),
                        odds = %odds.join(" | "),
                        "event"
                    );
                }
            }
            Err(e) => warn!(error = %e, "{}", e.user_message()),
        }
    }
}
