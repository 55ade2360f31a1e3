//! # Connection Resolution
//!
//! Pure rules for selecting a stored connection and for shaping the
//! accounts reported by wallets.

use appkit_types::{
    is_lower_case_match, parse_caip_address, Account, AccountType, CaipNetwork, ChainNamespace,
    Connection, Connector,
};

/// Lookup parameters for [`get_connection`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GetConnectionParams<'a> {
    /// Connector whose connection is wanted.
    pub connector_id: Option<&'a str>,
    /// Account to select within the connection.
    pub address: Option<&'a str>,
    /// Stored connections.
    pub connections: &'a [Connection],
    /// Registered connectors.
    pub connectors: &'a [Connector],
}

/// A connection with its selected account and connector.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConnection {
    /// The connection.
    pub connection: Connection,
    /// Selected account.
    pub account: Option<Account>,
    /// Connector owning the connection, if still registered.
    pub connector: Option<Connector>,
}

fn find_connector(connectors: &[Connector], connector_id: &str) -> Option<Connector> {
    connectors.iter().find_map(|c| {
        if is_lower_case_match(&c.id, connector_id) {
            Some(c.clone())
        } else {
            c.connectors
                .iter()
                .find(|m| is_lower_case_match(&m.id, connector_id))
                .cloned()
        }
    })
}

/// Resolve a connection.
///
/// With a connector id: that connector's connection, the account matching
/// `address` (or the first account when no address is given) and the
/// connector. Without one: the first connection that has accounts and
/// whose connector is still registered.
pub fn get_connection(params: GetConnectionParams<'_>) -> Option<ResolvedConnection> {
    match params.connector_id {
        Some(connector_id) => {
            let connection = params
                .connections
                .iter()
                .find(|c| is_lower_case_match(&c.connector_id, connector_id))?;

            let account = match params.address {
                Some(address) => connection
                    .accounts
                    .iter()
                    .find(|a| is_lower_case_match(&a.address, address))
                    .cloned(),
                None => connection.accounts.first().cloned(),
            };

            Some(ResolvedConnection {
                connection: connection.clone(),
                account,
                connector: find_connector(params.connectors, connector_id),
            })
        }
        None => params.connections.iter().find_map(|connection| {
            let account = connection.accounts.first()?;
            let connector = find_connector(params.connectors, &connection.connector_id)?;
            Some(ResolvedConnection {
                connection: connection.clone(),
                account: Some(account.clone()),
                connector: Some(connector),
            })
        }),
    }
}

/// Build a connection from the CAIP-10 accounts of a WalletConnect session.
///
/// The network is the requested network matching the first account's
/// chain. Returns `None` when the session holds no usable account.
pub fn wallet_connect_connection(
    connector_id: &str,
    namespace: &ChainNamespace,
    session_accounts: &[String],
    caip_networks: &[CaipNetwork],
) -> Option<Connection> {
    let parsed: Vec<_> = session_accounts
        .iter()
        .filter_map(|a| parse_caip_address(a).ok())
        .filter(|a| &a.namespace == namespace)
        .collect();

    let first = parsed.first()?;
    let network_id = first.network_id();
    let caip_network = caip_networks
        .iter()
        .find(|n| n.caip_network_id() == network_id)
        .cloned();

    let accounts = parsed
        .iter()
        .map(|a| Account::new(a.address.clone()))
        .collect();

    Some(Connection::new(connector_id, accounts, caip_network))
}

/// Assign Bitcoin account roles.
///
/// Exactly two addresses are positional: index 0 is the payment address
/// and index 1 the ordinals address, whatever type the wallet reported.
/// Otherwise the wallet's list is kept, falling back to the connected
/// address. Empty addresses are dropped; the result may be empty.
pub fn bitcoin_accounts(connected_address: &str, reported: Vec<Account>) -> Vec<Account> {
    let reported: Vec<Account> = reported
        .into_iter()
        .filter(|account| !account.address.is_empty())
        .collect();
    match reported.len() {
        0 if connected_address.is_empty() => Vec::new(),
        0 => vec![Account::new(connected_address).with_type(AccountType::Payment)],
        2 => reported
            .into_iter()
            .zip([AccountType::Payment, AccountType::Ordinal])
            .map(|(account, role)| Account {
                account_type: Some(role),
                ..account
            })
            .collect(),
        _ => reported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appkit_types::{networks, ConnectorType};

    fn connector(id: &str) -> Connector {
        Connector::new(id, id, ConnectorType::Injected, ChainNamespace::Eip155)
    }

    fn connection(id: &str, addresses: &[&str]) -> Connection {
        Connection::new(
            id,
            addresses.iter().map(|a| Account::new(*a)).collect(),
            None,
        )
    }

    #[test]
    fn test_get_connection_by_id_and_address() {
        let connections = [connection("metamask", &["0xA", "0xB"])];
        let connectors = [connector("metamask")];

        let resolved = get_connection(GetConnectionParams {
            connector_id: Some("MetaMask"),
            address: Some("0xb"),
            connections: &connections,
            connectors: &connectors,
        })
        .unwrap();
        assert_eq!(resolved.account.unwrap().address, "0xB");
        assert_eq!(resolved.connector.unwrap().id, "metamask");

        let first = get_connection(GetConnectionParams {
            connector_id: Some("metamask"),
            connections: &connections,
            connectors: &connectors,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(first.account.unwrap().address, "0xA");
    }

    #[test]
    fn test_get_connection_unknown_address() {
        let connections = [connection("metamask", &["0xA"])];
        let resolved = get_connection(GetConnectionParams {
            connector_id: Some("metamask"),
            address: Some("0xZ"),
            connections: &connections,
            connectors: &[],
        })
        .unwrap();
        assert!(resolved.account.is_none());
        assert!(resolved.connector.is_none());
    }

    #[test]
    fn test_get_connection_skips_stale_connections() {
        let connections = [
            connection("removed", &["0xA"]),
            connection("empty", &[]),
            connection("phantom", &["0xC"]),
        ];
        let connectors = [connector("empty"), connector("phantom")];

        let resolved = get_connection(GetConnectionParams {
            connections: &connections,
            connectors: &connectors,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(resolved.connection.connector_id, "phantom");
    }

    #[test]
    fn test_get_connection_all_stale_is_none() {
        let connections = [connection("a", &["0xA"]), connection("b", &["0xB"])];
        assert!(get_connection(GetConnectionParams {
            connections: &connections,
            connectors: &[connector("c")],
            ..Default::default()
        })
        .is_none());
    }

    #[test]
    fn test_get_connection_matches_composite_member() {
        let mut composite = connector("multi");
        composite.connector_type = ConnectorType::MultiChain;
        composite.connectors = vec![connector("member")];
        let connections = [connection("member", &["0xA"])];

        let resolved = get_connection(GetConnectionParams {
            connections: &connections,
            connectors: &[composite],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(resolved.connector.unwrap().id, "member");
    }

    #[test]
    fn test_wallet_connect_connection() {
        let accounts = vec![
            "eip155:137:0xAbC".to_string(),
            "eip155:1:0xabc".to_string(),
            "solana:abc:Sol1".to_string(),
            "garbage".to_string(),
        ];
        let connection = wallet_connect_connection(
            "walletConnect",
            &ChainNamespace::Eip155,
            &accounts,
            &[networks::mainnet(), networks::polygon()],
        )
        .unwrap();

        assert_eq!(connection.accounts.len(), 1);
        assert_eq!(connection.accounts[0].address, "0xAbC");
        assert_eq!(connection.caip_network.unwrap().id, "137");
    }

    #[test]
    fn test_wallet_connect_connection_without_accounts() {
        assert!(wallet_connect_connection("walletConnect", &ChainNamespace::Eip155, &[], &[]).is_none());
    }

    #[test]
    fn test_bitcoin_roles_are_positional() {
        let reported = vec![
            Account::new("bc1-ordinal-looking").with_type(AccountType::Ordinal),
            Account::new("bc1-payment-looking").with_type(AccountType::Payment),
        ];
        let accounts = bitcoin_accounts("bc1-connected", reported);
        assert_eq!(accounts[0].address, "bc1-ordinal-looking");
        assert_eq!(accounts[0].account_type, Some(AccountType::Payment));
        assert_eq!(accounts[1].account_type, Some(AccountType::Ordinal));
    }

    #[test]
    fn test_bitcoin_fallback_to_connected_address() {
        let accounts = bitcoin_accounts("bc1-connected", vec![]);
        assert_eq!(accounts, vec![Account::new("bc1-connected").with_type(AccountType::Payment)]);
    }

    #[test]
    fn test_bitcoin_empty_addresses_dropped() {
        assert!(bitcoin_accounts("", vec![]).is_empty());
        assert!(bitcoin_accounts("", vec![Account::new("")]).is_empty());

        // A blank entry must not shift the payment/ordinal positions.
        let accounts = bitcoin_accounts(
            "bc1-pay",
            vec![Account::new("bc1-pay"), Account::new(""), Account::new("bc1-ord")],
        );
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].address, "bc1-ord");
        assert_eq!(accounts[1].account_type, Some(AccountType::Ordinal));
    }
}
