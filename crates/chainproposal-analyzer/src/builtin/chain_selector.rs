//! Names every chain selector inside a parameter value and flags selectors
//! that match no known chain.

use crate::analyzer::{BaseAnalyzer, ParameterAnalyzer};
use crate::annotation::Annotation;
use crate::context::{AnalyzerContext, ExecutionContext};
use crate::error::AnalyzerError;
use chainproposal_core::value::NamedValue;
use std::collections::BTreeSet;

pub const ID: &str = "parameter-chain-selector";

pub struct ChainSelectorNames;

impl BaseAnalyzer for ChainSelectorNames {
    fn id(&self) -> &str {
        ID
    }
}

impl ParameterAnalyzer for ChainSelectorNames {
    fn matches(&self, _ctx: &AnalyzerContext<'_>, param: &NamedValue) -> bool {
        !param.value.chain_selectors().is_empty()
    }

    fn analyze(
        &self,
        _ctx: &AnalyzerContext<'_>,
        exec: &ExecutionContext,
        param: &NamedValue,
    ) -> Result<Vec<Annotation>, AnalyzerError> {
        let mut seen = BTreeSet::new();
        Ok(param
            .value
            .chain_selectors()
            .into_iter()
            .filter(|sel| seen.insert(*sel))
            .map(|sel| match exec.chains.chain_name(sel) {
                Ok(name) => Annotation::new("chain.name", name).with_path(sel.to_string()),
                Err(err) => Annotation::new("chain.unknown", err.to_string()).with_path(sel.to_string()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotations;
    use crate::environment::ScopedEnvironment;
    use chainproposal_core::{
        chain::{selectors, KnownChains},
        decoded::{DecodedBatchOperation, DecodedCall, DecodedProposal, ProposalKind},
        value::Value,
    };
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[test]
    fn repeated_selectors_are_named_once_in_first_seen_order() {
        let exec = ExecutionContext::new(ScopedEnvironment::default(), Arc::new(KnownChains::builtin()));
        let param = NamedValue::new(
            "lanes",
            Value::Array(vec![
                Value::ChainSelector(selectors::BASE_MAINNET),
                Value::ChainSelector(7),
                Value::ChainSelector(selectors::BASE_MAINNET),
                Value::ChainSelector(7),
            ]),
        );
        let proposal = DecodedProposal {
            kind: ProposalKind::Proposal,
            version: "v1".into(),
            description: String::new(),
            valid_until: 0,
            chain_metadata: BTreeMap::new(),
            batch_operations: vec![DecodedBatchOperation {
                chain_selector: selectors::ETHEREUM_MAINNET,
                calls: vec![DecodedCall::new("0x1", "f()", vec![param.clone()], vec![])],
            }],
        };
        let none = Annotations::new();
        let batch = &proposal.batch_operations[0];
        let ctx = AnalyzerContext::for_proposal(&proposal, "proposal")
            .enter_batch_operation(batch, "batch[0]", &none)
            .enter_call(&batch.calls[0], "batch[0].call[0]", &none);

        assert!(ChainSelectorNames.matches(&ctx, &param));
        let out = ChainSelectorNames.analyze(&ctx, &exec, &param).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].key, "chain.name");
        assert_eq!(out[0].path, selectors::BASE_MAINNET.to_string());
        assert_eq!(out[0].value, "ethereum-mainnet-base-1");
        assert_eq!(out[1].key, "chain.unknown");
        assert_eq!(out[1].path, "7");
    }
}
