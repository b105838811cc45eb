//! `chainproposal.yaml`: describe configuration.
//!
//! ```yaml
//! environment: staging
//! domain: mcms
//! renderer: text
//! log:
//!   level: info
//!   components:
//!     chainproposal_analyzer: debug
//! chains:
//!   1234: my-devnet
//! abis:
//!   "RBACTimelock 1.0.0": abis/rbac_timelock.json
//! addresses: addresses/staging.json
//! ```

use anyhow::{Context, Result};
use chainproposal_core::{chain::KnownChains, context::TypeAndVersion};
use chainproposal_observability::LogConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeConfig {
    #[serde(default)]
    pub log: LogConfig,
    /// Environment name shown in reports
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_renderer")]
    pub renderer: String,
    /// Extra chain selector → name entries, layered over the built-in table
    #[serde(default)]
    pub chains: BTreeMap<u64, String>,
    /// "<Type> <Version>" → EVM ABI JSON file
    #[serde(default)]
    pub abis: BTreeMap<String, PathBuf>,
    /// JSON address book (list of address records)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<PathBuf>,
}

fn default_environment() -> String {
    "local".into()
}

fn default_domain() -> String {
    "mcms".into()
}

fn default_renderer() -> String {
    "text".into()
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            environment: default_environment(),
            domain: default_domain(),
            renderer: default_renderer(),
            chains: BTreeMap::new(),
            abis: BTreeMap::new(),
            addresses: None,
        }
    }
}

impl DescribeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("parse describe config")
    }

    /// Load from `path`; relative file paths inside are resolved against the
    /// config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let mut config = Self::from_yaml(&yaml)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        for file in self.abis.values_mut() {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
        if let Some(file) = self.addresses.as_mut() {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    /// Built-in chain table plus the configured entries.
    pub fn known_chains(&self) -> KnownChains {
        let mut chains = KnownChains::builtin();
        for (selector, name) in &self.chains {
            chains.insert(*selector, name.clone());
        }
        chains
    }

    /// Configured ABIs with parsed keys.
    pub fn abi_files(&self) -> Result<Vec<(TypeAndVersion, &Path)>> {
        self.abis
            .iter()
            .map(|(key, path)| {
                let tv = key
                    .parse::<TypeAndVersion>()
                    .with_context(|| format!("invalid ABI key '{key}'"))?;
                Ok((tv, path.as_path()))
            })
            .collect()
    }
}
