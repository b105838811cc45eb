//! Raw (still encoded) proposal input.
//!
//! These mirror the MCMS proposal file format: camelCase JSON, chain
//! selectors as map keys, transaction payloads as `0x`-hex or base64.

use crate::decoded::{ChainMetadata, ProposalKind, TimelockAction};
use base64::Engine as _;
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, BTreeSet};

/// One encoded call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub to: String,
    #[serde(default, deserialize_with = "deserialize_payload")]
    pub data: Vec<u8>,
    /// Chain-family specific extras (e.g. EVM `value`, Solana accounts).
    #[serde(default)]
    pub additional_fields: serde_json::Value,
    #[serde(default)]
    pub contract_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Transaction {
    pub fn new(to: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            to: to.into(),
            data,
            additional_fields: serde_json::Value::Null,
            contract_type: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_contract_type(mut self, contract_type: impl Into<String>) -> Self {
        self.contract_type = contract_type.into();
        self
    }
}

/// A single-call operation of a plain proposal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub chain_selector: u64,
    pub transaction: Transaction,
}

/// A group of calls executed atomically on one chain by a timelock.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOperation {
    pub chain_selector: u64,
    pub transactions: Vec<Transaction>,
}

/// Plain multisig proposal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub version: String,
    pub valid_until: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub chain_metadata: BTreeMap<u64, ChainMetadata>,
    pub operations: Vec<Operation>,
}

/// Timelock proposal: batch operations scheduled (or cancelled, or
/// bypassed) through a timelock contract on each chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelockProposal {
    pub version: String,
    pub valid_until: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub chain_metadata: BTreeMap<u64, ChainMetadata>,
    pub action: TimelockAction,
    #[serde(default)]
    pub delay: String,
    #[serde(default)]
    pub timelock_addresses: BTreeMap<u64, String>,
    pub operations: Vec<BatchOperation>,
}

impl Proposal {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl TimelockProposal {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Proposal-level metadata carried into the decoded tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalHeader {
    pub kind: ProposalKind,
    pub version: String,
    pub description: String,
    pub valid_until: u32,
    pub chain_metadata: BTreeMap<u64, ChainMetadata>,
}

/// Transactions targeting one chain, in proposal order.
#[derive(Debug, Clone)]
pub struct TransactionBatch<'a> {
    pub chain_selector: u64,
    pub transactions: Vec<&'a Transaction>,
}

/// Anything the engine can decode.
pub trait ProposalInput {
    fn header(&self) -> ProposalHeader;

    fn batches(&self) -> Vec<TransactionBatch<'_>>;

    /// Every chain the proposal touches.
    fn chain_selectors(&self) -> BTreeSet<u64> {
        let mut selectors: BTreeSet<u64> =
            self.batches().iter().map(|b| b.chain_selector).collect();
        selectors.extend(self.header().chain_metadata.keys().copied());
        selectors
    }
}

impl ProposalInput for Proposal {
    fn header(&self) -> ProposalHeader {
        ProposalHeader {
            kind: ProposalKind::Proposal,
            version: self.version.clone(),
            description: self.description.clone(),
            valid_until: self.valid_until,
            chain_metadata: self.chain_metadata.clone(),
        }
    }

    /// Each operation becomes its own single-call batch.
    fn batches(&self) -> Vec<TransactionBatch<'_>> {
        self.operations
            .iter()
            .map(|op| TransactionBatch {
                chain_selector: op.chain_selector,
                transactions: vec![&op.transaction],
            })
            .collect()
    }
}

impl ProposalInput for TimelockProposal {
    fn header(&self) -> ProposalHeader {
        ProposalHeader {
            kind: ProposalKind::Timelock {
                action: self.action,
                delay: self.delay.clone(),
                timelock_addresses: self.timelock_addresses.clone(),
            },
            version: self.version.clone(),
            description: self.description.clone(),
            valid_until: self.valid_until,
            chain_metadata: self.chain_metadata.clone(),
        }
    }

    fn batches(&self) -> Vec<TransactionBatch<'_>> {
        self.operations
            .iter()
            .map(|op| TransactionBatch {
                chain_selector: op.chain_selector,
                transactions: op.transactions.iter().collect(),
            })
            .collect()
    }

    fn chain_selectors(&self) -> BTreeSet<u64> {
        let mut selectors: BTreeSet<u64> =
            self.operations.iter().map(|b| b.chain_selector).collect();
        selectors.extend(self.chain_metadata.keys().copied());
        selectors.extend(self.timelock_addresses.keys().copied());
        selectors
    }
}

/// Accepts `0x`-prefixed hex or standard base64.
fn deserialize_payload<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    decode_payload(&raw).map_err(serde::de::Error::custom)
}

/// Decode a transaction payload string (`0x`-hex or base64).
pub fn decode_payload(raw: &str) -> Result<Vec<u8>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(hex_str) = raw.strip_prefix("0x") {
        return hex::decode(hex_str).map_err(|e| format!("invalid hex payload: {e}"));
    }
    base64::engine::general_purpose::STANDARD
        .decode(raw)
        .map_err(|e| format!("invalid base64 payload: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMELOCK_JSON: &str = r#"{
        "version": "v1",
        "validUntil": 1999999999,
        "description": "grant proposer role",
        "chainMetadata": {
            "16015286601757825753": { "startingOpCount": 3, "mcmAddress": "0xmcm" }
        },
        "action": "schedule",
        "delay": "24h",
        "timelockAddresses": { "16015286601757825753": "0xtimelock" },
        "operations": [
            {
                "chainSelector": 16015286601757825753,
                "transactions": [
                    { "to": "0xaa", "data": "0xdeadbeef", "contractType": "RBACTimelock" },
                    { "to": "0xbb", "data": "3q2+7w==" }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_timelock_proposal() {
        let p = TimelockProposal::from_json(TIMELOCK_JSON).unwrap();
        assert_eq!(p.action, TimelockAction::Schedule);
        assert_eq!(p.operations[0].transactions[0].data, vec![0xde, 0xad, 0xbe, 0xef]);
        // base64 "3q2+7w==" is the same four bytes
        assert_eq!(p.operations[0].transactions[1].data, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(p.chain_metadata[&16015286601757825753].starting_op_count, 3);
        assert_eq!(p.chain_selectors().len(), 1);
    }

    #[test]
    fn plain_proposal_operations_become_single_call_batches() {
        let json = r#"{
            "version": "v1",
            "validUntil": 1,
            "operations": [
                { "chainSelector": 1, "transaction": { "to": "0x01", "data": "0x" } },
                { "chainSelector": 2, "transaction": { "to": "0x02", "data": null } }
            ]
        }"#;
        let p = Proposal::from_json(json).unwrap();
        let batches = p.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].chain_selector, 2);
        assert_eq!(batches[1].transactions.len(), 1);
        assert!(batches[1].transactions[0].data.is_empty());
        assert_eq!(p.header().kind, ProposalKind::Proposal);
    }

    #[test]
    fn bad_payload_is_rejected() {
        assert!(decode_payload("0xzz").is_err());
        assert!(decode_payload("!!!").is_err());
    }
}
