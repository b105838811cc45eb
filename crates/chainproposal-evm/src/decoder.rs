//! EVM function-call decoder.
//!
//! Decodes transaction `data` using an ABI JSON definition.
//!
//! # How it works
//! - First 4 bytes of calldata = keccak256(function_signature)[:4] (the selector)
//! - Remaining bytes = ABI-encoded inputs tuple
//! - The method is reported as `<Interface>::<signature>`

use alloy_dyn_abi::JsonAbiExt;
use alloy_json_abi::{Function, JsonAbi};
use chainproposal_core::{
    decoded::DecodedCall,
    decoder::CallDecoder,
    error::DecodeError,
    value::NamedValue,
};
use tracing::trace;

use crate::normalizer;

/// EVM ABI decoder for one contract interface.
pub struct EvmAbiDecoder {
    interface: String,
    abi: JsonAbi,
}

impl EvmAbiDecoder {
    /// Create a decoder from a standard Ethereum ABI JSON string.
    ///
    /// `interface` names the contract in decoded method strings,
    /// e.g. `"RBACTimelock"`.
    ///
    /// # Errors
    /// Returns `DecodeError` if the JSON is not valid ABI JSON.
    pub fn from_abi_json(interface: impl Into<String>, abi_json: &str) -> Result<Self, DecodeError> {
        let abi: JsonAbi = serde_json::from_str(abi_json).map_err(|e| DecodeError::AbiDecodeFailed {
            reason: format!("invalid ABI JSON: {e}"),
        })?;
        Ok(Self {
            interface: interface.into(),
            abi,
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Returns all function names in this ABI.
    pub fn function_names(&self) -> Vec<&str> {
        self.abi.functions().map(|f| f.name.as_str()).collect()
    }

    /// Decode raw calldata (selector included) sent to `address`.
    pub fn decode_calldata(&self, address: &str, calldata: &[u8]) -> Result<DecodedCall, DecodeError> {
        if calldata.len() < 4 {
            return Err(DecodeError::InvalidCallData {
                reason: format!(
                    "calldata too short: {} bytes (need at least 4 for selector)",
                    calldata.len()
                ),
            });
        }
        let (selector, input_data) = calldata.split_at(4);
        let func = self.find_function(selector)?;
        trace!(function = %func.name, "matched selector");

        let values = func
            .abi_decode_input(input_data, true)
            .map_err(|e| DecodeError::AbiDecodeFailed {
                reason: format!("function input decode: {e}"),
            })?;

        let inputs: Vec<NamedValue> = func
            .inputs
            .iter()
            .zip(values)
            .enumerate()
            .map(|(i, (param, val))| {
                let name = if param.name.is_empty() {
                    format!("arg{i}")
                } else {
                    param.name.clone()
                };
                NamedValue::new(name, normalizer::normalize(val, param))
            })
            .collect();

        Ok(DecodedCall::new(
            address,
            format!("{}::{}", self.interface, func.signature()),
            inputs,
            Vec::new(),
        ))
    }

    fn find_function(&self, selector: &[u8]) -> Result<&Function, DecodeError> {
        self.abi
            .functions()
            .find(|f| f.selector().as_slice() == selector)
            .ok_or_else(|| DecodeError::MethodNotFound {
                selector: format!("0x{}", hex::encode(selector)),
            })
    }
}

impl CallDecoder for EvmAbiDecoder {
    fn decode(
        &self,
        _chain_selector: u64,
        address: &str,
        data: &[u8],
        _additional_fields: &serde_json::Value,
    ) -> Result<DecodedCall, DecodeError> {
        self.decode_calldata(address, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::dyn_abi::DynSolValue;
    use alloy_primitives::{Address, U256};
    use chainproposal_core::value::Value;

    const ROUTER_ABI: &str = r#"[
        {
            "name": "applyRampUpdates",
            "type": "function",
            "inputs": [
                {
                    "name": "onRampUpdates",
                    "type": "tuple[]",
                    "components": [
                        {"name": "destChainSelector", "type": "uint64"},
                        {"name": "onRamp", "type": "address"}
                    ]
                }
            ],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "name": "setFee",
            "type": "function",
            "inputs": [{"name": "", "type": "uint256"}],
            "outputs": [],
            "stateMutability": "nonpayable"
        }
    ]"#;

    fn decoder() -> EvmAbiDecoder {
        EvmAbiDecoder::from_abi_json("Router", ROUTER_ABI).unwrap()
    }

    #[test]
    fn decoder_parses_abi_json() {
        let dec = decoder();
        let names = dec.function_names();
        assert!(names.contains(&"applyRampUpdates"));
        assert!(names.contains(&"setFee"));
    }

    #[test]
    fn decode_tuple_array_with_chain_selector() {
        let dec = decoder();
        let onramp: Address = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
        let func = dec.abi.function("applyRampUpdates").unwrap()[0].clone();
        let calldata = func
            .abi_encode_input(&[DynSolValue::Array(vec![DynSolValue::Tuple(vec![
                DynSolValue::Uint(U256::from(5009297550715157269u64), 64),
                DynSolValue::Address(onramp),
            ])])])
            .unwrap();

        let call = dec.decode_calldata("0xrouter", &calldata).unwrap();
        assert_eq!(call.method, "Router::applyRampUpdates((uint64,address)[])");
        assert_eq!(call.inputs.len(), 1);
        assert_eq!(call.inputs[0].name, "onRampUpdates");
        assert_eq!(
            call.inputs[0].value,
            Value::Array(vec![Value::Struct(vec![
                NamedValue::new("destChainSelector", Value::ChainSelector(5009297550715157269)),
                NamedValue::new("onRamp", Value::address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")),
            ])])
        );
    }

    #[test]
    fn unnamed_params_get_positional_names() {
        let dec = decoder();
        let func = dec.abi.function("setFee").unwrap()[0].clone();
        let calldata = func
            .abi_encode_input(&[DynSolValue::Uint(U256::from(42u64), 256)])
            .unwrap();
        let call = dec.decode_calldata("0xrouter", &calldata).unwrap();
        assert_eq!(call.inputs[0], NamedValue::new("arg0", Value::simple("42")));
    }

    #[test]
    fn short_calldata_is_rejected() {
        let err = decoder().decode_calldata("0xrouter", &[0x01, 0x02]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidCallData { .. }));
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let err = decoder().decode_calldata("0xrouter", &[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
        assert_eq!(err.to_string(), "no method found for selector 0xdeadbeef");
    }

    #[test]
    fn invalid_json_returns_error() {
        assert!(EvmAbiDecoder::from_abi_json("X", "not json").is_err());
    }
}
