//! Converts alloy-core `DynSolValue` → ChainProposal `Value`.
//!
//! This is where EVM ABI types are mapped onto the chain-agnostic value
//! model. The ABI parameter is carried alongside each value so tuple
//! components keep their names and `uint64` chain selectors can be
//! recognised by name.

use alloy_core::dyn_abi::DynSolValue;
use alloy_json_abi::Param;
use chainproposal_core::value::{NamedValue, Value};

/// Convert a decoded argument, described by its ABI parameter.
pub fn normalize(val: DynSolValue, param: &Param) -> Value {
    normalize_with(val, &param.name, &param.components)
}

fn normalize_with(val: DynSolValue, name: &str, components: &[Param]) -> Value {
    match val {
        DynSolValue::Bool(b) => Value::Simple(b.to_string()),

        DynSolValue::Int(i, _bits) => Value::Simple(i.to_string()),

        DynSolValue::Uint(u, bits) => {
            if bits == 64 && is_chain_selector_name(name) {
                match u64::try_from(u) {
                    Ok(sel) => Value::ChainSelector(sel),
                    Err(_) => Value::Simple(u.to_string()),
                }
            } else {
                Value::Simple(u.to_string())
            }
        }

        DynSolValue::FixedBytes(word, size) => {
            let size = size.min(word.len());
            Value::Bytes(word[..size].to_vec())
        }

        DynSolValue::Bytes(b) => Value::Bytes(b),

        DynSolValue::String(s) => Value::Simple(s),

        // EIP-55 checksum encoding
        DynSolValue::Address(a) => Value::Address(a.to_checksum(None)),

        // Elements share the array parameter's name and components.
        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => Value::Array(
            vals.into_iter()
                .map(|v| normalize_with(v, name, components))
                .collect(),
        ),

        DynSolValue::Tuple(fields) => {
            // Unnamed tuple fields get positional names "0", "1", ...
            let named: Vec<NamedValue> = fields
                .into_iter()
                .enumerate()
                .map(|(i, v)| match components.get(i) {
                    Some(p) if !p.name.is_empty() => {
                        NamedValue::new(p.name.clone(), normalize_with(v, &p.name, &p.components))
                    }
                    Some(p) => NamedValue::new(i.to_string(), normalize_with(v, "", &p.components)),
                    None => NamedValue::new(i.to_string(), normalize_with(v, "", &[])),
                })
                .collect();
            Value::Struct(named)
        }

        // Function pointers (address + selector) fall back to bytes
        DynSolValue::Function(f) => Value::Bytes(f.to_vec()),
    }
}

fn is_chain_selector_name(name: &str) -> bool {
    name.to_ascii_lowercase().contains("chainselector")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    fn param(json: &str) -> Param {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn normalize_uint_is_decimal_text() {
        let p = param(r#"{"name": "amount", "type": "uint256"}"#);
        let v = normalize(DynSolValue::Uint(U256::from(1_000_000u64), 256), &p);
        assert_eq!(v, Value::simple("1000000"));
    }

    #[test]
    fn normalize_uint64_chain_selector() {
        let p = param(r#"{"name": "remoteChainSelector", "type": "uint64"}"#);
        let v = normalize(DynSolValue::Uint(U256::from(5009297550715157269u64), 64), &p);
        assert_eq!(v, Value::ChainSelector(5009297550715157269));

        let other = param(r#"{"name": "nonce", "type": "uint64"}"#);
        let v = normalize(DynSolValue::Uint(U256::from(7u64), 64), &other);
        assert_eq!(v, Value::simple("7"));
    }

    #[test]
    fn normalize_address_is_checksummed() {
        let addr: Address = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
        let p = param(r#"{"name": "to", "type": "address"}"#);
        let v = normalize(DynSolValue::Address(addr), &p);
        assert_eq!(v, Value::address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"));
    }

    #[test]
    fn normalize_tuple_keeps_component_names() {
        let p = param(
            r#"{"name": "cfg", "type": "tuple", "components": [
                {"name": "enabled", "type": "bool"},
                {"name": "", "type": "bytes4"}
            ]}"#,
        );
        let mut word = [0u8; 32];
        word[..4].copy_from_slice(&[1, 2, 3, 4]);
        let v = normalize(
            DynSolValue::Tuple(vec![
                DynSolValue::Bool(true),
                DynSolValue::FixedBytes(word.into(), 4),
            ]),
            &p,
        );
        assert_eq!(
            v,
            Value::Struct(vec![
                NamedValue::new("enabled", Value::simple("true")),
                NamedValue::new("1", Value::Bytes(vec![1, 2, 3, 4])),
            ])
        );
    }
}
