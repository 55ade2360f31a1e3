//! # Explorer Metadata
//!
//! Matching connectors against the wallet explorer catalog.

use appkit_types::{Connector, ExplorerWallet};

/// Find the catalog entry for a connector: by id first, then by rdns.
pub fn find_explorer_wallet<'a>(
    connector: &Connector,
    wallets: &'a [ExplorerWallet],
) -> Option<&'a ExplorerWallet> {
    wallets.iter().find(|w| w.id == connector.id).or_else(|| {
        let rdns = connector.rdns()?;
        wallets.iter().find(|w| w.rdns.as_deref() == Some(rdns))
    })
}

/// Attach matching catalog entries. Returns how many connectors matched.
pub fn extend_with_explorer_wallets(connectors: &mut [Connector], wallets: &[ExplorerWallet]) -> usize {
    let mut matched = 0;
    for connector in connectors.iter_mut() {
        if let Some(wallet) = find_explorer_wallet(connector, wallets) {
            connector.explorer_id = Some(wallet.id.clone());
            if connector.image_id.is_none() {
                connector.image_id = wallet.image_id.clone();
            }
            connector.explorer_wallet = Some(wallet.clone());
            matched += 1;
        }
    }
    matched
}

/// Explorer-backed connectors first, by ascending `order`; the rest keep
/// their relative order.
pub fn sort_connectors_by_explorer_wallet(connectors: &[Connector]) -> Vec<Connector> {
    let (mut with_wallet, without): (Vec<Connector>, Vec<Connector>) = connectors
        .iter()
        .cloned()
        .partition(|c| c.explorer_wallet.is_some());

    with_wallet.sort_by_key(|c| {
        c.explorer_wallet
            .as_ref()
            .and_then(|w| w.order)
            .unwrap_or(u32::MAX)
    });
    with_wallet.extend(without);
    with_wallet
}
