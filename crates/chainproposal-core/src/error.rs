//! Error types for the ChainProposal decode boundary and context services.

use thiserror::Error;

/// Errors that can occur while decoding a single call.
///
/// These never escape a batch decode: `ProposalDecoder` turns every one of
/// them into a `DecodedCall` whose `method` carries the message.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("ABI not found for type and version {type_and_version}")]
    AbiNotFound { type_and_version: String },

    #[error("unknown contract interface: {contract}")]
    UnknownContractInterface { contract: String },

    #[error("ABI decode failed: {reason}")]
    AbiDecodeFailed { reason: String },

    #[error("invalid call data: {reason}")]
    InvalidCallData { reason: String },

    #[error("no method found for selector {selector}")]
    MethodNotFound { selector: String },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors from the decoder registry (setup time).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("decoder for '{key}' already registered")]
    AlreadyExists { key: String },

    #[error("invalid type and version '{input}': expected \"<Type> <Version>\"")]
    InvalidTypeAndVersion { input: String },
}

/// Errors from loading environment / address data.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("address data unavailable: {reason}")]
    AddressData { reason: String },

    #[error("environment '{name}' could not be loaded: {reason}")]
    Load { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from the chain-name resolver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainLookupError {
    #[error("chain not found for selector {selector}")]
    UnknownSelector { selector: u64 },
}

/// Errors raised while formatting a value.
///
/// `Value::describe` never returns these: it embeds them in the output text.
/// Renderers that want to treat a broken fragment specially use
/// `Value::try_describe`.
#[derive(Debug, Error)]
pub enum DescribeError {
    /// No formatting rule is known for this kind of value.
    #[error("unknown field type: {kind}")]
    Unsupported { kind: String },

    #[error("{kind}: {reason}")]
    Failed { kind: String, reason: String },
}
