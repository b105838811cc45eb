//! The chain-agnostic value model.
//!
//! Every decoded call argument, whatever chain family it came from (EVM ABI,
//! TON cells, Solana instructions, ...), is represented as a `Value` tree.
//! Each variant knows how to describe itself as text. The layout rules:
//!
//! - a struct with fewer than two fields renders on one line,
//!   `{ name: v, name: v }`; otherwise one field per indented line;
//! - an array renders on one line, `[a,b,c]`, unless any element's
//!   description contains the indent marker, in which case the whole array
//!   breaks onto one element per indented line.
//!
//! The "child forces parent to break" rule propagates through any nesting of
//! structs and arrays.

use crate::context::DescribeContext;
use crate::error::DescribeError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// One indentation unit. Its presence in a rendered child marks the child as
/// multi-line.
pub const INDENT: &str = "    ";

/// Extension point for value kinds defined outside this crate.
///
/// The default `describe` reports the kind as unsupported, which renders as
/// `<unknown field type: KIND>`.
pub trait CustomValue: fmt::Debug + Send + Sync {
    fn kind(&self) -> &str;

    fn describe(&self, _ctx: &DescribeContext<'_>) -> Result<String, DescribeError> {
        Err(DescribeError::Unsupported {
            kind: self.kind().to_string(),
        })
    }
}

/// A decoded argument.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Any scalar already rendered to text (numbers, bools, strings).
    Simple(String),
    Address(String),
    #[serde(serialize_with = "serialize_bytes")]
    Bytes(Vec<u8>),
    ChainSelector(u64),
    Array(Vec<Value>),
    Struct(Vec<NamedValue>),
    Named(Box<NamedValue>),
    Yaml(serde_yaml::Value),
    #[serde(serialize_with = "serialize_custom")]
    Custom(Arc<dyn CustomValue>),
}

/// A value with a field or parameter name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: Value,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// `"name: value"`
    pub fn describe(&self, ctx: &DescribeContext<'_>) -> String {
        format!("{}: {}", self.name, self.value.describe(ctx))
    }
}

impl Value {
    pub fn simple(text: impl Into<String>) -> Self {
        Value::Simple(text.into())
    }

    pub fn address(addr: impl Into<String>) -> Self {
        Value::Address(addr.into())
    }

    pub fn named(name: impl Into<String>, value: Value) -> Self {
        Value::Named(Box::new(NamedValue::new(name, value)))
    }

    /// Short name of the variant, used in error markers.
    pub fn kind(&self) -> &str {
        match self {
            Value::Simple(_) => "simple",
            Value::Address(_) => "address",
            Value::Bytes(_) => "bytes",
            Value::ChainSelector(_) => "chain_selector",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Named(_) => "named",
            Value::Yaml(_) => "yaml",
            Value::Custom(c) => c.kind(),
        }
    }

    /// Render this value as text. Never fails: formatting problems are
    /// embedded in the output as `Error rendering <kind>: <err>` and unknown
    /// custom kinds as `<unknown field type: <kind>>`.
    pub fn describe(&self, ctx: &DescribeContext<'_>) -> String {
        self.try_describe(ctx).unwrap_or_else(|err| error_marker(&err))
    }

    /// Like `describe`, but reports a failure of this value itself (not of
    /// its children, which are always embedded) as an error.
    pub fn try_describe(&self, ctx: &DescribeContext<'_>) -> Result<String, DescribeError> {
        let text = match self {
            Value::Simple(s) => s.clone(),
            Value::Address(a) => a.clone(),
            Value::Bytes(b) => format!("0x{}", hex::encode(b)),
            Value::ChainSelector(sel) => ctx.chain_label(*sel),
            Value::Array(items) => describe_array(items, ctx),
            Value::Struct(fields) => describe_struct(fields, ctx),
            Value::Named(nv) => nv.describe(ctx),
            Value::Yaml(v) => serde_yaml::to_string(v)
                .map(|s| s.trim_end().to_string())
                .map_err(|e| DescribeError::Failed {
                    kind: "yaml".into(),
                    reason: e.to_string(),
                })?,
            Value::Custom(c) => c.describe(ctx)?,
        };
        Ok(text)
    }

    /// Identity of an address value, scoped to `ctx.chain_selector` first.
    ///
    /// Returns `"address of <type> <version> from <chain>"` when the address
    /// is known on some chain, `""` otherwise (and for non-address values).
    pub fn annotation(&self, ctx: &DescribeContext<'_>) -> String {
        let Value::Address(addr) = self else {
            return String::new();
        };
        match ctx.fields.lookup(addr, ctx.chain_selector) {
            Some((sel, tv)) => {
                let chain = ctx
                    .chains
                    .chain_name(sel)
                    .unwrap_or_else(|_| sel.to_string());
                format!("address of {} {} from {}", tv.contract_type, tv.version, chain)
            }
            None => String::new(),
        }
    }

    /// Every address contained in this value, depth-first, in order.
    pub fn addresses(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_addresses(&mut out);
        out
    }

    fn collect_addresses<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Value::Address(a) => out.push(a),
            Value::Array(items) => items.iter().for_each(|v| v.collect_addresses(out)),
            Value::Struct(fields) => fields.iter().for_each(|f| f.value.collect_addresses(out)),
            Value::Named(nv) => nv.value.collect_addresses(out),
            Value::Simple(_)
            | Value::Bytes(_)
            | Value::ChainSelector(_)
            | Value::Yaml(_)
            | Value::Custom(_) => {}
        }
    }

    /// Every chain selector contained in this value, depth-first.
    pub fn chain_selectors(&self) -> Vec<u64> {
        match self {
            Value::ChainSelector(sel) => vec![*sel],
            Value::Array(items) => items.iter().flat_map(Value::chain_selectors).collect(),
            Value::Struct(fields) => fields.iter().flat_map(|f| f.value.chain_selectors()).collect(),
            Value::Named(nv) => nv.value.chain_selectors(),
            Value::Simple(_)
            | Value::Address(_)
            | Value::Bytes(_)
            | Value::Yaml(_)
            | Value::Custom(_) => Vec::new(),
        }
    }
}

/// Formats a failed fragment the way renderers embed it.
pub fn error_marker(err: &DescribeError) -> String {
    match err {
        DescribeError::Unsupported { kind } => format!("<unknown field type: {kind}>"),
        DescribeError::Failed { kind, reason } => format!("Error rendering {kind}: {reason}"),
    }
}

/// Prefix every line of `text` with one indentation unit.
pub fn indent(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_struct(fields: &[NamedValue], ctx: &DescribeContext<'_>) -> String {
    if fields.len() < 2 {
        let parts: Vec<String> = fields.iter().map(|f| f.describe(ctx)).collect();
        return format!("{{ {} }}", parts.join(", "));
    }
    let mut out = String::from("{\n");
    for field in fields {
        out.push_str(&indent(&field.describe(ctx)));
        out.push('\n');
    }
    out.push('}');
    out
}

fn describe_array(items: &[Value], ctx: &DescribeContext<'_>) -> String {
    let parts: Vec<String> = items.iter().map(|v| v.describe(ctx)).collect();
    if parts.iter().any(|p| p.contains(INDENT)) {
        format!("[\n{}\n]", indent(&parts.join(",\n")))
    } else {
        format!("[{}]", parts.join(","))
    }
}

fn serialize_bytes<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("0x{}", hex::encode(bytes)))
}

fn serialize_custom<S: Serializer>(value: &Arc<dyn CustomValue>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(value.kind())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Simple(a), Value::Simple(b)) => a == b,
            (Value::Address(a), Value::Address(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::ChainSelector(a), Value::ChainSelector(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Named(a), Value::Named(b)) => a == b,
            (Value::Yaml(a), Value::Yaml(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{selectors, KnownChains};
    use crate::context::{FieldContext, TypeAndVersion};

    fn with_ctx<R>(f: impl FnOnce(&DescribeContext<'_>) -> R) -> R {
        let mut fields = FieldContext::new();
        fields.insert(
            selectors::ETHEREUM_TESTNET_SEPOLIA,
            "0x1111",
            TypeAndVersion::new("RBACTimelock", "1.0.0"),
        );
        let chains = KnownChains::builtin();
        let ctx = DescribeContext::new(&fields, &chains);
        f(&ctx)
    }

    fn nv(name: &str, value: Value) -> NamedValue {
        NamedValue::new(name, value)
    }

    #[derive(Debug)]
    struct Opaque;

    impl CustomValue for Opaque {
        fn kind(&self) -> &str {
            "opaque"
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl CustomValue for Broken {
        fn kind(&self) -> &str {
            "cell"
        }

        fn describe(&self, _ctx: &DescribeContext<'_>) -> Result<String, DescribeError> {
            Err(DescribeError::Failed {
                kind: "cell".into(),
                reason: "truncated".into(),
            })
        }
    }

    #[test]
    fn scalars() {
        with_ctx(|ctx| {
            assert_eq!(Value::simple("42").describe(ctx), "42");
            assert_eq!(Value::address("0xabc").describe(ctx), "0xabc");
            assert_eq!(Value::Bytes(vec![0xde, 0xad]).describe(ctx), "0xdead");
            assert_eq!(Value::Bytes(vec![]).describe(ctx), "0x");
        });
    }

    #[test]
    fn chain_selector_known_and_unknown() {
        with_ctx(|ctx| {
            assert_eq!(
                Value::ChainSelector(999_999_999).describe(ctx),
                "999999999 (<chain unknown>)"
            );
            assert_eq!(
                Value::ChainSelector(selectors::ETHEREUM_TESTNET_SEPOLIA).describe(ctx),
                "16015286601757825753 (ethereum-testnet-sepolia)"
            );
        });
    }

    #[test]
    fn small_structs_render_on_one_line() {
        with_ctx(|ctx| {
            assert_eq!(Value::Struct(vec![]).describe(ctx), "{  }");
            let one = Value::Struct(vec![nv("a", Value::simple("1"))]);
            assert_eq!(one.describe(ctx), "{ a: 1 }");
        });
    }

    #[test]
    fn larger_structs_render_one_field_per_line() {
        with_ctx(|ctx| {
            let v = Value::Struct(vec![nv("a", Value::simple("1")), nv("b", Value::simple("2"))]);
            assert_eq!(v.describe(ctx), "{\n    a: 1\n    b: 2\n}");
        });
    }

    #[test]
    fn flat_array_renders_on_one_line() {
        with_ctx(|ctx| {
            let v = Value::Array(vec![Value::simple("1"), Value::simple("2"), Value::simple("3")]);
            assert_eq!(v.describe(ctx), "[1,2,3]");
            assert_eq!(Value::Array(vec![]).describe(ctx), "[]");
        });
    }

    #[test]
    fn multi_line_element_breaks_the_whole_array() {
        with_ctx(|ctx| {
            let s = Value::Struct(vec![nv("a", Value::simple("1")), nv("b", Value::simple("2"))]);
            let v = Value::Array(vec![Value::simple("x"), s]);
            assert_eq!(
                v.describe(ctx),
                "[\n    x,\n    {\n        a: 1\n        b: 2\n    }\n]"
            );
        });
    }

    #[test]
    fn breaking_propagates_through_nesting() {
        with_ctx(|ctx| {
            let inner = Value::Struct(vec![nv("a", Value::simple("1")), nv("b", Value::simple("2"))]);
            let middle = Value::Struct(vec![nv("inner", Value::Array(vec![inner]))]);
            let outer = Value::Array(vec![middle]);
            assert_eq!(
                outer.describe(ctx),
                "[\n    { inner: [\n        {\n            a: 1\n            b: 2\n        }\n    ] }\n]"
            );
        });
    }

    #[test]
    fn named_value_prefixes_name() {
        with_ctx(|ctx| {
            let v = Value::named("amount", Value::simple("7"));
            assert_eq!(v.describe(ctx), "amount: 7");
        });
    }

    #[test]
    fn yaml_renders_block_text() {
        with_ctx(|ctx| {
            let yaml: serde_yaml::Value = serde_yaml::from_str("a: 1\nb: two").unwrap();
            assert_eq!(Value::Yaml(yaml).describe(ctx), "a: 1\nb: two");
        });
    }

    #[test]
    fn custom_values_fall_back_instead_of_failing() {
        with_ctx(|ctx| {
            let unknown = Value::Custom(Arc::new(Opaque));
            assert_eq!(unknown.describe(ctx), "<unknown field type: opaque>");

            let broken = Value::Array(vec![Value::simple("ok"), Value::Custom(Arc::new(Broken))]);
            assert_eq!(broken.describe(ctx), "[ok,Error rendering cell: truncated]");
        });
    }

    #[test]
    fn describe_is_deterministic() {
        with_ctx(|ctx| {
            let v = Value::Array(vec![
                Value::Struct(vec![nv("x", Value::address("0x1111")), nv("y", Value::ChainSelector(1))]),
                Value::Bytes(vec![1, 2, 3]),
            ]);
            assert_eq!(v.describe(ctx), v.describe(ctx));
        });
    }

    #[test]
    fn address_annotation() {
        with_ctx(|ctx| {
            assert_eq!(
                Value::address("0x1111").annotation(ctx),
                "address of RBACTimelock 1.0.0 from ethereum-testnet-sepolia"
            );
            assert_eq!(Value::address("0x2222").annotation(ctx), "");
            assert_eq!(Value::simple("0x1111").annotation(ctx), "");
        });
    }

    #[test]
    fn duplicate_address_resolves_to_the_scoped_chain() {
        let mut fields = FieldContext::new();
        fields.insert(selectors::ETHEREUM_MAINNET, "0xaa", TypeAndVersion::new("Router", "1.2.0"));
        fields.insert(selectors::ARBITRUM_MAINNET, "0xaa", TypeAndVersion::new("OnRamp", "1.5.0"));
        let chains = KnownChains::builtin();
        let ctx = DescribeContext::new(&fields, &chains);

        // ARBITRUM_MAINNET < ETHEREUM_MAINNET
        assert_eq!(
            Value::address("0xaa").annotation(&ctx),
            "address of OnRamp 1.5.0 from ethereum-mainnet-arbitrum-1"
        );
        assert_eq!(
            Value::address("0xaa").annotation(&ctx.for_chain(selectors::ETHEREUM_MAINNET)),
            "address of Router 1.2.0 from ethereum-mainnet"
        );
    }

    #[test]
    fn addresses_are_collected_depth_first() {
        let v = Value::Struct(vec![
            nv("a", Value::address("0x1")),
            nv("b", Value::Array(vec![Value::address("0x2"), Value::named("c", Value::address("0x3"))])),
        ]);
        assert_eq!(v.addresses(), vec!["0x1", "0x2", "0x3"]);
    }
}
