//! # Provider Event Routing
//!
//! Routes WalletConnect provider events into client state.
//!
//! ```text
//! UniversalProvider ──connect / accountsChanged──→ connection managers (ak-03)
//!        │                                          connector registry (ak-01)
//!        │                                          active account ──→ SIWX (ak-05)
//!        ├──disconnect──→ drop WalletConnect connections, revoke SIWX session
//!        ├──chainChanged──→ active network
//!        └──display_uri──→ pairing URI
//! ```
//!
//! Callbacks hold a weak reference to the client so the provider's
//! listener table never keeps it alive.

use std::future::Future;
use std::sync::{Arc, Weak};

use tracing::{debug, info, warn};

use ak_01_connector_registry::ConnectorRegistryApi;
use ak_03_connection_manager::ConnectionManagerApi;
use ak_04_provider_bridge::{ListenParams, ProviderEventBridgeApi, ProviderSubscription};
use ak_05_siwx::{SiwxEngineApi, SiwxHost};
use appkit_types::{
    Account, CaipAddress, ChainIdValue, ChainNamespace, Connection, WALLET_CONNECT_CONNECTOR_ID,
};

use crate::adapters::Signer;
use crate::container::AppKit;

/// Register provider listeners for every configured namespace.
///
/// Session-wide events (disconnect, chain change, pairing URI) are
/// listened to once.
pub fn listen_provider_events(app: &Arc<AppKit>) -> Vec<ProviderSubscription> {
    let mut subscriptions = Vec::with_capacity(app.managers.len());

    for (index, namespace) in app.managers.keys().enumerate() {
        let weak = Arc::downgrade(app);
        let mut params = ListenParams::new(namespace.clone())
            .on_connect({
                let weak = weak.clone();
                let namespace = namespace.clone();
                move |accounts| {
                    if let Some(app) = weak.upgrade() {
                        on_accounts(&app, &namespace, &accounts, false);
                    }
                }
            })
            .on_accounts_changed({
                let weak = weak.clone();
                let namespace = namespace.clone();
                move |accounts| {
                    if let Some(app) = weak.upgrade() {
                        on_accounts(&app, &namespace, &accounts, true);
                    }
                }
            });

        if index == 0 {
            params = params
                .on_disconnect({
                    let weak = weak.clone();
                    move || {
                        if let Some(app) = weak.upgrade() {
                            on_disconnect(&app);
                        }
                    }
                })
                .on_chain_changed({
                    let weak = weak.clone();
                    move |chain_id| {
                        if let Some(app) = weak.upgrade() {
                            on_chain_changed(&app, &chain_id);
                        }
                    }
                })
                .on_display_uri(move |uri| {
                    if let Some(app) = weak.upgrade() {
                        app.state.set_pairing_uri(uri);
                    }
                });
        }

        subscriptions.push(app.bridge.listen(params));
    }

    subscriptions
}

fn on_accounts(app: &AppKit, namespace: &ChainNamespace, accounts: &[CaipAddress], changed: bool) {
    let Some(first) = accounts.first() else {
        return;
    };
    let Some(manager) = app.managers.get(namespace) else {
        return;
    };

    let network = app.state.find_network(&first.network_id());
    manager.upsert_connection(Connection::new(
        WALLET_CONNECT_CONNECTOR_ID,
        accounts.iter().map(|a| Account::new(a.address.clone())).collect(),
        network,
    ));
    app.registry.set_connector_id(WALLET_CONNECT_CONNECTOR_ID, namespace);

    let active = app.state.active_caip_address();
    let follows = match &active {
        Some(active) => &active.namespace == namespace,
        None => app.registry.active_namespace().as_ref() == Some(namespace),
    };
    if !follows || active.as_ref() == Some(first) {
        return;
    }

    debug!("[runtime] WalletConnect account on {} is now {}", namespace, first);
    app.state
        .set_signer(Signer::WalletConnect(Arc::clone(&app.provider)));
    app.activate(first);

    if changed {
        let siwx = Arc::clone(&app.siwx);
        let address = first.clone();
        spawn(async move { siwx.initialize_if_enabled(Some(&address)).await });
    }
}

fn on_disconnect(app: &AppKit) {
    info!("[runtime] WalletConnect session ended");
    let mut wallet_connect_active = false;

    for (namespace, manager) in &app.managers {
        if app.registry.get_connector_id(namespace).as_deref() == Some(WALLET_CONNECT_CONNECTOR_ID) {
            app.registry.remove_connector_id(namespace);
            app.status.mark_disconnected(WALLET_CONNECT_CONNECTOR_ID);
            wallet_connect_active = true;
        }
        manager.remove_connection(WALLET_CONNECT_CONNECTOR_ID);
    }

    if !wallet_connect_active {
        return;
    }
    if let Some(address) = app.state.active_caip_address() {
        app.state.clear_session();
        let siwx = Arc::clone(&app.siwx);
        spawn(async move {
            if let Err(e) = siwx
                .on_disconnect(&address.network_id(), &address.address)
                .await
            {
                warn!(error = %e, "[runtime] Failed to revoke SIWX session");
            }
        });
    }
}

fn on_chain_changed(app: &AppKit, chain_id: &ChainIdValue) {
    let namespace = match (chain_id, app.state.active_caip_address()) {
        (ChainIdValue::Number(_), _) => ChainNamespace::Eip155,
        (ChainIdValue::String(s), _) if s.contains(':') => {
            ChainNamespace::from_tag(s.split(':').next().unwrap_or_default())
        }
        (_, Some(active)) => active.namespace,
        (_, None) => match app.state.active_caip_network() {
            Some(network) => network.chain_namespace,
            None => return,
        },
    };
    let reference = chain_id.reference();
    let Some(network) = app
        .caip_networks
        .iter()
        .find(|n| n.chain_namespace == namespace && n.id == reference)
        .cloned()
    else {
        warn!("[runtime] Wallet switched to unrequested chain {}:{}", namespace, reference);
        return;
    };

    let caip_network_id = network.caip_network_id();
    app.state.set_active_network(network);
    if let Some(active) = app.state.active_caip_address() {
        if active.namespace == namespace && active.reference != reference {
            app.state
                .set_active_address(Some(CaipAddress::on_network(&caip_network_id, active.address)));
        }
    }
}

/// Run `future` on the ambient runtime, if any.
fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(future);
        }
        Err(_) => debug!("[runtime] No async runtime, skipping follow-up"),
    }
}
