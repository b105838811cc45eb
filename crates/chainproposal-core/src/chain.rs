//! Chain selector → human-readable chain name lookup.

use crate::error::ChainLookupError;
use std::collections::BTreeMap;

/// Resolves a chain selector to its network name.
///
/// Implementations must be `Send + Sync` so a single resolver can be shared
/// by concurrent describe runs.
pub trait ChainNameResolver: Send + Sync {
    fn chain_name(&self, selector: u64) -> Result<String, ChainLookupError>;
}

/// Well-known chain selectors.
pub mod selectors {
    pub const ETHEREUM_MAINNET: u64 = 5009297550715157269;
    pub const ETHEREUM_TESTNET_SEPOLIA: u64 = 16015286601757825753;
    pub const ARBITRUM_MAINNET: u64 = 4949039107694359620;
    pub const ARBITRUM_TESTNET_SEPOLIA: u64 = 3478487238524512106;
    pub const BASE_MAINNET: u64 = 15971525489660198786;
    pub const BASE_TESTNET_SEPOLIA: u64 = 10344971235874465080;
    pub const OPTIMISM_MAINNET: u64 = 3734403246176062136;
    pub const POLYGON_MAINNET: u64 = 4051577828743386545;
    pub const AVALANCHE_MAINNET: u64 = 6433500567565415381;
    pub const AVALANCHE_TESTNET_FUJI: u64 = 14767482510784806043;
    pub const BSC_MAINNET: u64 = 11344663589394136015;
    pub const SOLANA_MAINNET: u64 = 124615329519749607;
    pub const SOLANA_DEVNET: u64 = 16423721717087811551;
    pub const TON_MAINNET: u64 = 16448340667252469081;
    pub const TON_TESTNET: u64 = 1399300952838017768;
}

const BUILTIN: &[(u64, &str)] = &[
    (selectors::ETHEREUM_MAINNET, "ethereum-mainnet"),
    (selectors::ETHEREUM_TESTNET_SEPOLIA, "ethereum-testnet-sepolia"),
    (selectors::ARBITRUM_MAINNET, "ethereum-mainnet-arbitrum-1"),
    (selectors::ARBITRUM_TESTNET_SEPOLIA, "ethereum-testnet-sepolia-arbitrum-1"),
    (selectors::BASE_MAINNET, "ethereum-mainnet-base-1"),
    (selectors::BASE_TESTNET_SEPOLIA, "ethereum-testnet-sepolia-base-1"),
    (selectors::OPTIMISM_MAINNET, "ethereum-mainnet-optimism-1"),
    (selectors::POLYGON_MAINNET, "polygon-mainnet"),
    (selectors::AVALANCHE_MAINNET, "avalanche-mainnet"),
    (selectors::AVALANCHE_TESTNET_FUJI, "avalanche-testnet-fuji"),
    (selectors::BSC_MAINNET, "binance_smart_chain-mainnet"),
    (selectors::SOLANA_MAINNET, "solana-mainnet"),
    (selectors::SOLANA_DEVNET, "solana-devnet"),
    (selectors::TON_MAINNET, "ton-mainnet"),
    (selectors::TON_TESTNET, "ton-testnet"),
];

/// Table-driven resolver: built-in networks plus caller-supplied entries.
///
/// Custom entries shadow built-in ones with the same selector.
#[derive(Debug, Clone, Default)]
pub struct KnownChains {
    names: BTreeMap<u64, String>,
}

impl KnownChains {
    /// An empty table (no built-ins).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in network table.
    pub fn builtin() -> Self {
        let names = BUILTIN
            .iter()
            .map(|(sel, name)| (*sel, (*name).to_string()))
            .collect();
        Self { names }
    }

    pub fn with_chain(mut self, selector: u64, name: impl Into<String>) -> Self {
        self.insert(selector, name);
        self
    }

    pub fn insert(&mut self, selector: u64, name: impl Into<String>) {
        self.names.insert(selector, name.into());
    }

    /// All (selector, name) pairs in ascending selector order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.names.iter().map(|(sel, name)| (*sel, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl ChainNameResolver for KnownChains {
    fn chain_name(&self, selector: u64) -> Result<String, ChainLookupError> {
        self.names
            .get(&selector)
            .cloned()
            .ok_or(ChainLookupError::UnknownSelector { selector })
    }
}
