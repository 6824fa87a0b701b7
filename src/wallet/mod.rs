pub mod poller;
pub mod provider;

pub use poller::{spawn_balance_poller, spawn_price_poller};
pub use provider::{RpcWalletProvider, WalletProvider};

use crate::error::ClientError;
use crate::events::AppEvent;
use crate::state::{ConnectionState, WalletSession};
use alloy_primitives::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The one wallet session of the application, with a guarded connect flow.
///
/// `connect()` is the only way into `Connecting`; the guard refuses a second
/// overlapping call, so at most one prompt is ever open at the wallet.
pub struct WalletConnector<P> {
    provider: Arc<P>,
    session: Arc<Mutex<WalletSession>>,
    settle_delay: Duration,
}

impl<P> Clone for WalletConnector<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            session: Arc::clone(&self.session),
            settle_delay: self.settle_delay,
        }
    }
}

impl<P: WalletProvider> WalletConnector<P> {
    pub fn new(provider: P, settle_delay: Duration) -> Self {
        Self {
            provider: Arc::new(provider),
            session: Arc::new(Mutex::new(WalletSession::new())),
            settle_delay,
        }
    }

    /// Shared session handle for the refresh pollers.
    pub fn session_handle(&self) -> Arc<Mutex<WalletSession>> {
        Arc::clone(&self.session)
    }

    /// Shared provider handle, e.g. for the balance poller.
    pub fn provider(&self) -> Arc<P> {
        Arc::clone(&self.provider)
    }

    pub async fn snapshot(&self) -> WalletSession {
        self.session.lock().await.clone()
    }

    pub async fn address(&self) -> Option<Address> {
        self.session.lock().await.address
    }

    /// Connect the wallet. Exactly one prompt reaches the wallet per flow;
    /// a call arriving while another is in flight gets `RequestPending`
    /// without touching the provider.
    pub async fn connect(&self) -> Result<Address, ClientError> {
        {
            let mut session = self.session.lock().await;
            if session.connecting {
                return Err(ClientError::RequestPending);
            }
            session.connecting = true;
            session.connection = ConnectionState::Connecting;
        }

        // Let a just-resolved previous prompt settle at the bridge before
        // opening a new one.
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let result = self.provider.request_accounts().await;

        let mut session = self.session.lock().await;
        session.connecting = false;
        match result {
            Ok(accounts) => match accounts.first().copied() {
                Some(address) => {
                    session.set_connected(address);
                    info!(%address, "wallet connected");
                    Ok(address)
                }
                None => {
                    session.reset();
                    Err(ClientError::Malformed(
                        "wallet returned no accounts".to_string(),
                    ))
                }
            },
            Err(e) => {
                session.reset();
                Err(e)
            }
        }
    }

    pub async fn disconnect(&self) {
        self.session.lock().await.reset();
        info!("wallet disconnected");
    }

    /// Apply an external account notification. Ignored while a connect flow
    /// owns the session. Returns the event the main loop should see, if the
    /// notification changed anything.
    pub async fn apply_external_accounts(&self, accounts: &[Address]) -> Option<AppEvent> {
        let mut session = self.session.lock().await;
        if session.connecting {
            return None;
        }
        let previous = session.address;
        session.apply_accounts(accounts);

        if accounts.is_empty() {
            previous.is_some().then_some(AppEvent::WalletDisconnected)
        } else if session.address != previous {
            Some(AppEvent::AccountsChanged {
                accounts: accounts.to_vec(),
            })
        } else {
            None
        }
    }
}

/// Poll the bridge for account and chain changes, translating diffs into
/// `AppEvent`s. A chain switch additionally requests a full reload; no
/// attempt is made to reconcile in-flight reads across it.
pub fn spawn_notification_pump<P>(
    connector: WalletConnector<P>,
    tx: mpsc::Sender<AppEvent>,
    every: Duration,
) -> JoinHandle<()>
where
    P: WalletProvider + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        let mut last_chain: Option<u64> = None;

        loop {
            interval.tick().await;

            match connector.provider.accounts().await {
                Ok(accounts) => {
                    if let Some(event) = connector.apply_external_accounts(&accounts).await {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => debug!(error = %e, "account poll failed"),
            }

            match connector.provider.chain_id().await {
                Ok(chain_id) => {
                    if let Some(previous) = last_chain {
                        if previous != chain_id {
                            warn!(previous, chain_id, "chain switched, requesting reload");
                            let _ = tx.send(AppEvent::ChainChanged { chain_id }).await;
                            if tx.send(AppEvent::ReloadRequired).await.is_err() {
                                return;
                            }
                        }
                    }
                    last_chain = Some(chain_id);
                }
                Err(e) => debug!(error = %e, "chain id poll failed"),
            }
        }
    })
}
