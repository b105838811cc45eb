//! # chainproposal-evm
//!
//! EVM ABI call decoder implementing `chainproposal_core::CallDecoder`.
//!
//! ## Implementation notes
//! - Uses `alloy-core` / `alloy-dyn-abi` for ABI decode
//! - First 4 bytes of calldata select the function (keccak256 of the signature)
//! - Arguments are converted into the chain-agnostic `Value` model, keeping
//!   tuple component names

pub mod decoder;
pub mod normalizer;

pub use decoder::EvmAbiDecoder;
