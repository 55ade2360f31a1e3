//! # Multi-Chain Merge
//!
//! Connectors sharing an id across namespaces are the same wallet. The
//! merged view groups them into one composite entry.

use appkit_types::{Connector, ConnectorType, AUTH_CONNECTOR_ID};

/// Group connectors by id, preserving first-seen order.
///
/// Within a group only the first connector per namespace is kept.
pub fn group_by_id(connectors: &[Connector]) -> Vec<Vec<Connector>> {
    let mut groups: Vec<Vec<Connector>> = Vec::new();

    for connector in connectors {
        match groups.iter_mut().find(|g| g[0].id == connector.id) {
            Some(group) => {
                if !group.iter().any(|c| c.chain == connector.chain) {
                    group.push(connector.clone());
                }
            }
            None => groups.push(vec![connector.clone()]),
        }
    }

    groups
}

/// Build the merged view.
///
/// Groups spanning several namespaces become a `MULTI_CHAIN` composite
/// (`AUTH` for the embedded-auth connector). Pure and deterministic.
pub fn merge_multi_chain_connectors(connectors: &[Connector]) -> Vec<Connector> {
    group_by_id(connectors)
        .into_iter()
        .map(|mut group| {
            if group.len() == 1 {
                return group.remove(0);
            }

            let first = &group[0];
            let connector_type = if first.id == AUTH_CONNECTOR_ID {
                ConnectorType::Auth
            } else {
                ConnectorType::MultiChain
            };

            let mut composite =
                Connector::new(first.id.clone(), first.name.clone(), connector_type, first.chain.clone());
            composite.image_id = first.image_id.clone();
            composite.image_url = first.image_url.clone();
            composite.explorer_id = first.explorer_id.clone();
            composite.explorer_wallet = first.explorer_wallet.clone();
            composite.info = first.info.clone();
            composite.connectors = group;
            composite
        })
        .collect()
}

/// Replace composites by their members so every entry serves one namespace.
pub fn flatten_connectors(connectors: Vec<Connector>) -> Vec<Connector> {
    connectors
        .into_iter()
        .flat_map(|c| {
            if c.connectors.is_empty() {
                vec![c]
            } else {
                flatten_connectors(c.connectors)
            }
        })
        .collect()
}
