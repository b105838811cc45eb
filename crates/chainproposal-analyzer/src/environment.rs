//! Scoped, read-only environment loading.
//!
//! A run only needs address data for the chains its proposal touches.
//! Loaders return exactly that slice and nothing writable.

use async_trait::async_trait;
use chainproposal_core::{
    context::{AddressDataSource, AddressRecord, FieldContext},
    error::EnvironmentError,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Address data of one environment restricted to a set of chains.
#[derive(Debug, Clone, Default)]
pub struct ScopedEnvironment {
    pub name: String,
    pub chain_selectors: BTreeSet<u64>,
    pub addresses: Vec<AddressRecord>,
}

impl ScopedEnvironment {
    pub fn field_context(&self) -> FieldContext {
        FieldContext::from_records(&self.addresses)
    }
}

/// Loads the read-only view a run works against.
#[async_trait]
pub trait EnvironmentLoader: Send + Sync {
    async fn load(&self, chain_selectors: &BTreeSet<u64>) -> Result<ScopedEnvironment, EnvironmentError>;
}

/// Loader backed by an address data source (e.g. a JSON address book).
pub struct AddressBookLoader {
    name: String,
    source: Arc<dyn AddressDataSource>,
}

impl AddressBookLoader {
    pub fn new(name: impl Into<String>, source: Arc<dyn AddressDataSource>) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

#[async_trait]
impl EnvironmentLoader for AddressBookLoader {
    async fn load(&self, chain_selectors: &BTreeSet<u64>) -> Result<ScopedEnvironment, EnvironmentError> {
        let all = self.source.fetch_addresses()?;
        let total = all.len();
        let addresses: Vec<AddressRecord> = all
            .into_iter()
            .filter(|r| chain_selectors.contains(&r.chain_selector))
            .collect();
        debug!(
            environment = %self.name,
            chains = chain_selectors.len(),
            kept = addresses.len(),
            total,
            "loaded scoped address data"
        );
        Ok(ScopedEnvironment {
            name: self.name.clone(),
            chain_selectors: chain_selectors.clone(),
            addresses,
        })
    }
}
