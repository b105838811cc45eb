//! # chainproposal-core
//!
//! Core types shared across all ChainProposal crates: the chain-agnostic
//! value model, the decoded proposal tree, the raw proposal input format,
//! and the read-only context services (chain names, address identities)
//! consumed while analysing and rendering a proposal.

pub mod chain;
pub mod context;
pub mod decoded;
pub mod decoder;
pub mod error;
pub mod proposal;
pub mod value;

pub use chain::{ChainNameResolver, KnownChains};
pub use context::{
    AddressDataSource, AddressRecord, DescribeContext, FieldContext, StaticAddressSource,
    TypeAndVersion,
};
pub use decoded::{
    ChainMetadata, DecodedBatchOperation, DecodedCall, DecodedProposal, ProposalKind,
    TimelockAction,
};
pub use decoder::{CallDecoder, DecoderRegistry, ProposalDecoder};
pub use error::{ChainLookupError, DecodeError, DescribeError, EnvironmentError, RegistryError};
pub use proposal::{
    BatchOperation, Operation, Proposal, ProposalHeader, ProposalInput, TimelockProposal,
    Transaction, TransactionBatch,
};
pub use value::{CustomValue, NamedValue, Value};
