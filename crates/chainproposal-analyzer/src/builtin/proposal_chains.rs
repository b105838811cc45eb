//! Proposal-level summary: which chains are touched and how many calls.

use crate::analyzer::{BaseAnalyzer, ProposalAnalyzer};
use crate::annotation::Annotation;
use crate::context::{AnalyzerContext, ExecutionContext};
use crate::error::AnalyzerError;
use chainproposal_core::decoded::DecodedProposal;

pub const ID: &str = "proposal-chains";

pub struct ProposalChains;

impl BaseAnalyzer for ProposalChains {
    fn id(&self) -> &str {
        ID
    }
}

impl ProposalAnalyzer for ProposalChains {
    fn analyze(
        &self,
        _ctx: &AnalyzerContext<'_>,
        exec: &ExecutionContext,
        proposal: &DecodedProposal,
    ) -> Result<Vec<Annotation>, AnalyzerError> {
        let describe = exec.describe_context();
        let mut seen = Vec::new();
        for batch in &proposal.batch_operations {
            if !seen.contains(&batch.chain_selector) {
                seen.push(batch.chain_selector);
            }
        }
        let chains: Vec<String> = seen.iter().map(|sel| describe.chain_label(*sel)).collect();

        let mut out = vec![
            Annotation::new("chains", chains.join(", ")),
            Annotation::new("calls", proposal.call_count().to_string()),
        ];
        let failed = proposal.failed_calls().count();
        if failed > 0 {
            out.push(Annotation::new("decode.failures", failed.to_string()));
        }
        Ok(out)
    }
}
