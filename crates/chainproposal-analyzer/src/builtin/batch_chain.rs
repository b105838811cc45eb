//! Names the chain of each batch operation and, for timelock proposals, the
//! timelock contract that executes it.

use crate::analyzer::{BaseAnalyzer, BatchOperationAnalyzer};
use crate::annotation::Annotation;
use crate::context::{AnalyzerContext, ExecutionContext};
use crate::error::AnalyzerError;
use chainproposal_core::decoded::{DecodedBatchOperation, ProposalKind};

pub const ID: &str = "batch-chain-name";

pub struct BatchChainName;

impl BaseAnalyzer for BatchChainName {
    fn id(&self) -> &str {
        ID
    }
}

impl BatchOperationAnalyzer for BatchChainName {
    fn analyze(
        &self,
        ctx: &AnalyzerContext<'_>,
        exec: &ExecutionContext,
        batch: &DecodedBatchOperation,
    ) -> Result<Vec<Annotation>, AnalyzerError> {
        let name = exec.chains.chain_name(batch.chain_selector)?;
        let mut out = vec![Annotation::new("chain.name", name)];

        if let ProposalKind::Timelock { timelock_addresses, .. } = &ctx.proposal().kind {
            if let Some(addr) = timelock_addresses.get(&batch.chain_selector) {
                out.push(Annotation::new("timelock", addr.clone()));
            }
        }
        Ok(out)
    }
}
