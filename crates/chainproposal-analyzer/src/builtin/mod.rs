//! Analyzers shipped with the engine, one per tree level (two at parameter
//! level).

pub mod address_identity;
pub mod batch_chain;
pub mod call_status;
pub mod chain_selector;
pub mod proposal_chains;

use crate::analyzer::Analyzer;

pub use address_identity::AddressIdentity;
pub use batch_chain::BatchChainName;
pub use call_status::CallDecodeStatus;
pub use chain_selector::ChainSelectorNames;
pub use proposal_chains::ProposalChains;

/// All built-in analyzers in their default registration order.
pub fn all() -> Vec<Analyzer> {
    vec![
        Analyzer::proposal(ProposalChains),
        Analyzer::batch_operation(BatchChainName),
        Analyzer::call(CallDecodeStatus),
        Analyzer::parameter(AddressIdentity),
        Analyzer::parameter(ChainSelectorNames),
    ]
}
