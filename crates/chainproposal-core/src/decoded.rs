//! The decoded proposal tree.
//!
//! proposal → batch operations (one per target chain group) → calls →
//! named inputs/outputs. The tree is built once from decoder output and is
//! read-only afterwards.

use crate::value::NamedValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One decoded on-chain call.
///
/// `address` is always populated. When decoding failed, `method` holds the
/// error text, `inputs`/`outputs` are empty and `decode_failed` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedCall {
    pub address: String,
    pub method: String,
    pub inputs: Vec<NamedValue>,
    pub outputs: Vec<NamedValue>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub decode_failed: bool,
}

impl DecodedCall {
    pub fn new(
        address: impl Into<String>,
        method: impl Into<String>,
        inputs: Vec<NamedValue>,
        outputs: Vec<NamedValue>,
    ) -> Self {
        Self {
            address: address.into(),
            method: method.into(),
            inputs,
            outputs,
            decode_failed: false,
        }
    }

    /// A call that could not be decoded, carrying the error as its method.
    pub fn failed(address: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            address: address.into(),
            method: error.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            decode_failed: true,
        }
    }

    /// Look up a decoded input by name.
    pub fn input(&self, name: &str) -> Option<&NamedValue> {
        self.inputs.iter().find(|p| p.name == name)
    }
}

/// The calls targeting one chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedBatchOperation {
    pub chain_selector: u64,
    pub calls: Vec<DecodedCall>,
}

/// Per-chain proposal metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetadata {
    #[serde(default)]
    pub starting_op_count: u64,
    pub mcm_address: String,
}

/// Timelock action a timelock proposal performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelockAction {
    Schedule,
    Cancel,
    Bypass,
}

impl fmt::Display for TimelockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelockAction::Schedule => write!(f, "schedule"),
            TimelockAction::Cancel => write!(f, "cancel"),
            TimelockAction::Bypass => write!(f, "bypass"),
        }
    }
}

/// Which kind of proposal was decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposalKind {
    /// Plain multisig proposal: every operation is a single call.
    Proposal,
    Timelock {
        action: TimelockAction,
        delay: String,
        /// chain selector → timelock contract address
        timelock_addresses: BTreeMap<u64, String>,
    },
}

/// A decoded proposal: batch operations in proposal order plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedProposal {
    pub kind: ProposalKind,
    pub version: String,
    pub description: String,
    /// Unix seconds after which signatures are no longer accepted.
    pub valid_until: u32,
    pub chain_metadata: BTreeMap<u64, ChainMetadata>,
    pub batch_operations: Vec<DecodedBatchOperation>,
}

impl DecodedProposal {
    /// Total number of calls across all batch operations.
    pub fn call_count(&self) -> usize {
        self.batch_operations.iter().map(|b| b.calls.len()).sum()
    }

    /// Calls that failed to decode.
    pub fn failed_calls(&self) -> impl Iterator<Item = &DecodedCall> {
        self.batch_operations
            .iter()
            .flat_map(|b| b.calls.iter())
            .filter(|c| c.decode_failed)
    }

    /// The chain used to scope proposal-level rendering: the first batch
    /// operation's chain. Addresses on other chains of a multi-chain
    /// proposal are still resolved, but only this chain is preferred.
    pub fn representative_chain(&self) -> Option<u64> {
        self.batch_operations.first().map(|b| b.chain_selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn failed_call_keeps_address_and_error() {
        let call = DecodedCall::failed("EQabc", "invalid cell BOC data");
        assert_eq!(call.address, "EQabc");
        assert_eq!(call.method, "invalid cell BOC data");
        assert!(call.inputs.is_empty());
        assert!(call.decode_failed);
    }

    #[test]
    fn proposal_counts_calls() {
        let ok = DecodedCall::new("0x1", "f()", vec![NamedValue::new("a", Value::simple("1"))], vec![]);
        let proposal = DecodedProposal {
            kind: ProposalKind::Proposal,
            version: "v1".into(),
            description: String::new(),
            valid_until: 0,
            chain_metadata: BTreeMap::new(),
            batch_operations: vec![
                DecodedBatchOperation { chain_selector: 7, calls: vec![ok.clone(), DecodedCall::failed("0x2", "boom")] },
                DecodedBatchOperation { chain_selector: 3, calls: vec![ok] },
            ],
        };
        assert_eq!(proposal.call_count(), 3);
        assert_eq!(proposal.failed_calls().count(), 1);
        assert_eq!(proposal.representative_chain(), Some(7));
    }
}
