//! Shared builders for renderer unit tests.

use chainproposal_analyzer::{AnalyzerRegistry, Engine, ExecutionContext, ScopedEnvironment};
use chainproposal_core::{
    chain::{selectors, KnownChains},
    context::{AddressRecord, DescribeContext},
    decoded::{DecodedBatchOperation, DecodedCall, DecodedProposal, ProposalKind},
    decoder::{DecoderRegistry, ProposalDecoder},
    error::DescribeError,
    value::CustomValue,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug)]
pub struct BrokenCell;

impl CustomValue for BrokenCell {
    fn kind(&self) -> &str {
        "cell"
    }

    fn describe(&self, _ctx: &DescribeContext<'_>) -> Result<String, DescribeError> {
        Err(DescribeError::Failed {
            kind: "cell".into(),
            reason: "truncated cell".into(),
        })
    }
}

pub fn proposal(calls: Vec<DecodedCall>) -> DecodedProposal {
    DecodedProposal {
        kind: ProposalKind::Proposal,
        version: "v1".into(),
        description: String::new(),
        valid_until: 100,
        chain_metadata: BTreeMap::new(),
        batch_operations: vec![DecodedBatchOperation {
            chain_selector: selectors::ETHEREUM_MAINNET,
            calls,
        }],
    }
}

pub fn execution() -> ExecutionContext {
    let env = ScopedEnvironment {
        name: "staging".into(),
        chain_selectors: BTreeSet::from([selectors::ETHEREUM_MAINNET]),
        addresses: vec![AddressRecord {
            chain_selector: selectors::ETHEREUM_MAINNET,
            address: "0xabc".into(),
            contract_type: "Token".into(),
            version: "1.0.0".into(),
            labels: BTreeSet::new(),
        }],
    };
    ExecutionContext::new(env, Arc::new(KnownChains::builtin()))
}

fn engine(registry: AnalyzerRegistry) -> Engine {
    Engine::new(
        registry,
        ProposalDecoder::new(Arc::new(DecoderRegistry::new())),
        Arc::new(KnownChains::builtin()),
    )
    .unwrap()
}

pub fn bare_engine() -> Engine {
    engine(AnalyzerRegistry::new())
}

pub fn builtin_engine() -> Engine {
    engine(AnalyzerRegistry::with_builtin())
}
