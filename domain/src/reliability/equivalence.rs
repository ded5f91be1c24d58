//! Provider equivalence table
//!
//! Maps each canonical model to every provider able to serve that *identical*
//! model, in failover priority order (index 0 is the primary). Failover only
//! ever moves along one row; it never swaps in a different model.

use crate::core::backend::{BackendProfile, LOCAL_FALLBACK_BACKEND, LOCAL_PROVIDER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquivalenceTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl EquivalenceTable {
    pub fn new(entries: BTreeMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Insert or replace the provider list for `model`
    pub fn insert(&mut self, model: impl Into<String>, providers: Vec<String>) {
        self.entries.insert(model.into(), providers);
    }

    /// Providers serving `model`, in priority order.
    ///
    /// A model without an entry is served by the local provider when it is a
    /// local model, otherwise by a provider of the same name.
    pub fn providers_for(&self, model: &str) -> Vec<String> {
        if let Some(providers) = self.entries.get(model)
            && !providers.is_empty()
        {
            return providers.clone();
        }
        if BackendProfile::unknown(model).is_local() {
            vec![LOCAL_PROVIDER.to_string()]
        } else {
            vec![model.to_string()]
        }
    }

    pub fn contains(&self, model: &str) -> bool {
        self.entries.contains_key(model)
    }

    /// Every model with an entry
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every distinct provider named anywhere in the table
    pub fn all_providers(&self) -> Vec<String> {
        let mut providers: Vec<String> = self.entries.values().flatten().cloned().collect();
        providers.sort();
        providers.dedup();
        providers
    }
}

impl Default for EquivalenceTable {
    fn default() -> Self {
        let rows: &[(&str, &[&str])] = &[
            ("gpt-4o", &["openai", "azure-openai", "openrouter"]),
            ("claude-3-5-sonnet", &["anthropic", "bedrock", "openrouter"]),
            ("gemini-1.5-pro", &["google", "vertex"]),
            ("mistral-large", &["mistral", "openrouter"]),
            ("llama-3-8b-local", &[LOCAL_PROVIDER]),
            (LOCAL_FALLBACK_BACKEND, &[LOCAL_PROVIDER]),
        ];
        let entries = rows
            .iter()
            .map(|(model, providers)| {
                (
                    model.to_string(),
                    providers.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }
}
