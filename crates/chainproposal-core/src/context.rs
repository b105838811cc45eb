//! Read-only context services consumed while describing a proposal.
//!
//! `FieldContext` maps (chain selector, address) to the contract type and
//! version recorded for it in the environment's address data. It is built
//! once per run and never mutated afterwards.

use crate::chain::ChainNameResolver;
use crate::error::{EnvironmentError, RegistryError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A contract type paired with its version, e.g. `RBACTimelock 1.0.0`.
///
/// The `Display` form `"<Type> <Version>"` is the key decoders are
/// registered under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeAndVersion {
    #[serde(rename = "type")]
    pub contract_type: String,
    pub version: String,
}

impl TypeAndVersion {
    pub fn new(contract_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            contract_type: contract_type.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for TypeAndVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.contract_type, self.version)
    }
}

impl FromStr for TypeAndVersion {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ty), Some(version), None) => Ok(Self::new(ty, version)),
            _ => Err(RegistryError::InvalidTypeAndVersion { input: s.to_string() }),
        }
    }
}

/// One entry of the environment's address data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    pub chain_selector: u64,
    pub address: String,
    #[serde(rename = "type")]
    pub contract_type: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
}

impl AddressRecord {
    pub fn type_and_version(&self) -> TypeAndVersion {
        TypeAndVersion::new(&self.contract_type, &self.version)
    }
}

/// Source of address records for one environment.
pub trait AddressDataSource: Send + Sync {
    fn fetch_addresses(&self) -> Result<Vec<AddressRecord>, EnvironmentError>;
}

/// In-memory address data, e.g. loaded from a JSON address book.
#[derive(Debug, Clone, Default)]
pub struct StaticAddressSource {
    records: Vec<AddressRecord>,
}

impl StaticAddressSource {
    pub fn new(records: Vec<AddressRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of address records.
    pub fn from_json(json: &str) -> Result<Self, EnvironmentError> {
        let records: Vec<AddressRecord> = serde_json::from_str(json)?;
        Ok(Self { records })
    }
}

impl AddressDataSource for StaticAddressSource {
    fn fetch_addresses(&self) -> Result<Vec<AddressRecord>, EnvironmentError> {
        Ok(self.records.clone())
    }
}

/// Hex addresses compare case-insensitively; everything else is kept verbatim
/// (base58 and friendly-form addresses are case sensitive).
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(rest) if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_hexdigit()) => {
            format!("0x{}", rest.to_ascii_lowercase())
        }
        _ => trimmed.to_string(),
    }
}

/// Address identities per chain, immutable for the duration of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldContext {
    addresses_by_chain: BTreeMap<u64, BTreeMap<String, TypeAndVersion>>,
}

impl FieldContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AddressRecord>) -> Self {
        let mut ctx = Self::new();
        for record in records {
            ctx.insert(record.chain_selector, &record.address, record.type_and_version());
        }
        ctx
    }

    pub fn insert(&mut self, chain_selector: u64, address: &str, tv: TypeAndVersion) {
        self.addresses_by_chain
            .entry(chain_selector)
            .or_default()
            .insert(normalize_address(address), tv);
    }

    /// Look up an address on exactly one chain.
    pub fn get(&self, chain_selector: u64, address: &str) -> Option<&TypeAndVersion> {
        self.addresses_by_chain
            .get(&chain_selector)?
            .get(&normalize_address(address))
    }

    /// Resolve an address on any chain.
    ///
    /// When the address is recorded on several chains, `preferred_chain` wins
    /// if it is one of them, otherwise the lowest selector does.
    pub fn lookup(
        &self,
        address: &str,
        preferred_chain: Option<u64>,
    ) -> Option<(u64, &TypeAndVersion)> {
        let key = normalize_address(address);
        if let Some(sel) = preferred_chain {
            if let Some(tv) = self.addresses_by_chain.get(&sel).and_then(|m| m.get(&key)) {
                return Some((sel, tv));
            }
        }
        self.addresses_by_chain
            .iter()
            .find_map(|(sel, addrs)| addrs.get(&key).map(|tv| (*sel, tv)))
    }

    pub fn chain_selectors(&self) -> impl Iterator<Item = u64> + '_ {
        self.addresses_by_chain.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses_by_chain.is_empty()
    }
}

/// Everything `Value::describe` may consult.
///
/// `chain_selector` is the chain the value being described belongs to, used
/// to scope address resolution. It is `Copy`, so each level of a traversal
/// can hand a narrowed copy to its children.
#[derive(Clone, Copy)]
pub struct DescribeContext<'a> {
    pub fields: &'a FieldContext,
    pub chains: &'a dyn ChainNameResolver,
    pub chain_selector: Option<u64>,
}

impl<'a> DescribeContext<'a> {
    pub fn new(fields: &'a FieldContext, chains: &'a dyn ChainNameResolver) -> Self {
        Self {
            fields,
            chains,
            chain_selector: None,
        }
    }

    pub fn for_chain(self, chain_selector: u64) -> Self {
        Self {
            chain_selector: Some(chain_selector),
            ..self
        }
    }

    /// `"<selector> (<name>)"`, or `"<selector> (<chain unknown>)"`.
    pub fn chain_label(&self, selector: u64) -> String {
        match self.chains.chain_name(selector) {
            Ok(name) => format!("{selector} ({name})"),
            Err(_) => format!("{selector} (<chain unknown>)"),
        }
    }
}

impl fmt::Debug for DescribeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescribeContext")
            .field("fields", self.fields)
            .field("chain_selector", &self.chain_selector)
            .finish_non_exhaustive()
    }
}
