//! # Mock Wallet Provider
//!
//! Scriptable [`WalletProvider`] for tests across subsystems.

use crate::capabilities::WalletProvider;
use crate::entities::Account;
use crate::errors::ProviderError;
use crate::network::CaipNetwork;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock wallet provider for testing.
#[derive(Default)]
pub struct MockWalletProvider {
    address: Option<String>,
    accounts: Vec<String>,
    chain_id: Option<String>,
    account_addresses: Vec<Account>,
    chains: Vec<CaipNetwork>,
    failure: Option<ProviderError>,
    signature: Option<String>,
    connect_calls: Mutex<Vec<Option<String>>>,
    disconnect_calls: AtomicUsize,
}

impl MockWalletProvider {
    /// Provider with nothing authorized.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Address returned by `connect`.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// `eth_accounts` result.
    #[must_use]
    pub fn with_accounts(mut self, accounts: &[&str]) -> Self {
        self.accounts = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    /// `eth_chainId` result, as a decimal reference.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(format!("0x{chain_id:x}"));
        self
    }

    /// `get_account_addresses` result.
    #[must_use]
    pub fn with_account_addresses(mut self, accounts: Vec<Account>) -> Self {
        self.account_addresses = accounts;
        self
    }

    /// Networks the provider declares.
    #[must_use]
    pub fn with_chains(mut self, chains: Vec<CaipNetwork>) -> Self {
        self.chains = chains;
        self
    }

    /// Signature returned by `sign_message`.
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Fail every call with `error`.
    #[must_use]
    pub fn failing(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Chain ids passed to `connect`, in call order.
    pub fn connect_calls(&self) -> Vec<Option<String>> {
        self.connect_calls.lock().clone()
    }

    /// Number of `disconnect` calls.
    pub fn disconnect_count(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ProviderError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn connect(&self, chain_id: Option<&str>) -> Result<String, ProviderError> {
        self.connect_calls.lock().push(chain_id.map(str::to_string));
        self.check()?;
        self.address
            .clone()
            .or_else(|| self.accounts.first().cloned())
            .ok_or_else(|| ProviderError::Request("No account available".to_string()))
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.check()
    }

    async fn get_account_addresses(&self) -> Result<Vec<Account>, ProviderError> {
        self.check()?;
        Ok(self.account_addresses.clone())
    }

    async fn sign_message(&self, message: &str) -> Result<String, ProviderError> {
        self.check()?;
        Ok(self
            .signature
            .clone()
            .unwrap_or_else(|| format!("0xsigned:{}", message.len())))
    }

    async fn request(&self, method: &str, _params: Value) -> Result<Value, ProviderError> {
        self.check()?;
        match method {
            "eth_accounts" | "eth_requestAccounts" => Ok(json!(self.accounts)),
            "eth_chainId" => self
                .chain_id
                .clone()
                .map(Value::String)
                .ok_or_else(|| ProviderError::Request("Chain id unavailable".to_string())),
            other => Err(ProviderError::Unsupported(other.to_string())),
        }
    }

    fn chains(&self) -> Vec<CaipNetwork> {
        self.chains.clone()
    }
}
