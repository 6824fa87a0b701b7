//! Balance and price refreshers. Independent timers with no coordination
//! against the connect flow beyond reading the latest address; they only do
//! work while a session is logged in.

use crate::api::backend::BackendClient;
use crate::events::AppEvent;
use crate::state::WalletSession;
use crate::wallet::WalletProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

/// Refresh the connected account's balance on a fixed interval.
pub fn spawn_balance_poller<P>(
    provider: Arc<P>,
    session: Arc<Mutex<WalletSession>>,
    tx: mpsc::Sender<AppEvent>,
    every: Duration,
) -> JoinHandle<()>
where
    P: WalletProvider + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;

            let address = {
                let session = session.lock().await;
                if !session.is_logged_in() {
                    continue;
                }
                session.address
            };
            let Some(address) = address else { continue };

            match provider.balance(address).await {
                Ok(wei) => {
                    session.lock().await.balance_wei = wei;
                    if tx.send(AppEvent::BalanceRefreshed { wei }).await.is_err() {
                        return;
                    }
                }
                Err(e) => debug!(error = %e, "balance refresh failed"),
            }
        }
    })
}

/// Refresh the token's USD price on a fixed interval.
pub fn spawn_price_poller(
    backend: BackendClient,
    session: Arc<Mutex<WalletSession>>,
    tx: mpsc::Sender<AppEvent>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;

            if !session.lock().await.is_logged_in() {
                continue;
            }

            match backend.get_token_price().await {
                Ok(usd) => {
                    session.lock().await.token_price_usd = Some(usd);
                    if tx.send(AppEvent::PriceRefreshed { usd }).await.is_err() {
                        return;
                    }
                }
                Err(e) => debug!(error = %e, "price refresh failed"),
            }
        }
    })
}
