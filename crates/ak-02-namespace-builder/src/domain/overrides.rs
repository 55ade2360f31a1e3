//! # Namespace Overrides
//!
//! Application-supplied replacements for the generated proposal namespaces.

use super::methods::create_default_namespace;
use appkit_types::{ChainNamespace, NamespaceConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Per-field overrides applied after namespaces are generated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamespaceOverrides {
    /// Replacement methods per namespace.
    pub methods: BTreeMap<ChainNamespace, Vec<String>>,
    /// Replacement chains per namespace.
    pub chains: BTreeMap<ChainNamespace, Vec<String>>,
    /// Replacement events per namespace.
    pub events: BTreeMap<ChainNamespace, Vec<String>>,
    /// RPC URL per CAIP-2 id (`eip155:1`).
    pub rpc_map: BTreeMap<String, String>,
}

impl NamespaceOverrides {
    /// True when nothing is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
            && self.chains.is_empty()
            && self.events.is_empty()
            && self.rpc_map.is_empty()
    }

    /// Every namespace any override key touches.
    fn touched_namespaces(&self) -> BTreeSet<ChainNamespace> {
        let mut touched: BTreeSet<ChainNamespace> = self
            .methods
            .keys()
            .chain(self.chains.keys())
            .chain(self.events.keys())
            .cloned()
            .collect();

        for key in self.rpc_map.keys() {
            if let Some(ns) = key.split(':').next().filter(|ns| !ns.is_empty()) {
                touched.insert(ChainNamespace::from_tag(ns));
            }
        }
        touched
    }
}

/// Apply overrides to `base`, returning a new config.
///
/// Namespaces touched by an override but absent from `base` start from the
/// defaults. An `rpc_map` override replaces the whole map of each namespace
/// it touches. Keys without both a namespace and a reference are skipped.
pub fn apply_namespace_overrides(
    base: &NamespaceConfig,
    overrides: Option<&NamespaceOverrides>,
) -> NamespaceConfig {
    let mut result = base.clone();
    let Some(overrides) = overrides else {
        return result;
    };

    for ns in overrides.touched_namespaces() {
        result
            .entry(ns.clone())
            .or_insert_with(|| create_default_namespace(&ns));
    }

    for (ns, methods) in &overrides.methods {
        if let Some(namespace) = result.get_mut(ns) {
            namespace.methods = methods.clone();
        }
    }
    for (ns, chains) in &overrides.chains {
        if let Some(namespace) = result.get_mut(ns) {
            namespace.chains = chains.clone();
        }
    }
    for (ns, events) in &overrides.events {
        if let Some(namespace) = result.get_mut(ns) {
            namespace.events = events.clone();
        }
    }

    let mut reset: BTreeSet<ChainNamespace> = BTreeSet::new();
    for (chain_id, rpc_url) in &overrides.rpc_map {
        let mut parts = chain_id.split(':');
        let (Some(ns), Some(reference)) = (parts.next(), parts.next()) else {
            debug!("[ak-02] Skipping malformed rpc override key {}", chain_id);
            continue;
        };
        if ns.is_empty() || reference.is_empty() {
            debug!("[ak-02] Skipping malformed rpc override key {}", chain_id);
            continue;
        }

        let ns = ChainNamespace::from_tag(ns);
        let Some(namespace) = result.get_mut(&ns) else {
            continue;
        };
        if reset.insert(ns) {
            namespace.rpc_map.clear();
        }
        namespace
            .rpc_map
            .insert(reference.to_string(), rpc_url.clone());
    }

    result
}
