//! The reference plain-text renderer.
//!
//! ## Layout
//! A header block, then one block per batch operation and one per call.
//! Each call shows its address line (with the address's identity when the
//! environment knows it), the method line, and `Inputs:` / `Outputs:`
//! blocks with one indented line per parameter. Multi-line values keep the
//! value model's own layout, shifted by one indentation unit.
//!
//! Header-level address context uses the proposal's representative chain
//! (the first batch operation's chain). For multi-chain proposals that is a
//! simplification: an address shown in the header resolves against that one
//! chain only. Batch and call blocks use their own batch's chain.

use crate::error::RenderError;
use crate::renderer::{RenderRequest, Renderer};
use chainproposal_analyzer::{AnalyzedCall, AnalyzedParameter, AnalyzedProposal, Annotation, Annotations};
use chainproposal_core::{
    context::DescribeContext,
    decoded::ProposalKind,
    value::{error_marker, indent, Value, INDENT},
};
use std::io::Write;

pub const ID: &str = "text";

#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn id(&self) -> &str {
        ID
    }

    fn render_to(
        &self,
        sink: &mut dyn Write,
        request: &RenderRequest,
        proposal: &AnalyzedProposal<'_>,
    ) -> Result<(), RenderError> {
        let decoded = proposal.decoded;
        let exec = proposal.execution;

        writeln!(sink, "Domain: {}", request.domain)?;
        writeln!(sink, "Environment: {}", request.environment_name)?;
        writeln!(sink, "Kind: {}", kind_label(&decoded.kind))?;
        writeln!(sink, "Version: {}", decoded.version)?;
        writeln!(sink, "Valid until: {}", decoded.valid_until)?;
        if !decoded.description.is_empty() {
            writeln!(sink, "Description: {}", decoded.description)?;
        }
        write_annotations(sink, &proposal.annotations)?;

        for (index, batch) in proposal.batch_operations.iter().enumerate() {
            let selector = batch.decoded.chain_selector;
            let ctx = exec.describe_context().for_chain(selector);
            writeln!(sink)?;
            writeln!(sink, "Batch {index}: {}", ctx.chain_label(selector))?;
            if let Some(meta) = decoded.chain_metadata.get(&selector) {
                writeln!(
                    sink,
                    "MCM: {} (starting op count {})",
                    meta.mcm_address, meta.starting_op_count
                )?;
            }
            write_annotations(sink, &batch.annotations)?;

            for (i, call) in batch.calls.iter().enumerate() {
                writeln!(sink)?;
                write_call(sink, i, call, &ctx)?;
            }
        }
        Ok(())
    }
}

fn write_call(
    sink: &mut dyn Write,
    index: usize,
    call: &AnalyzedCall<'_>,
    ctx: &DescribeContext<'_>,
) -> Result<(), RenderError> {
    let decoded = call.decoded;
    writeln!(sink, "Call {index}")?;
    writeln!(sink, "Address: {}", address_line(&decoded.address, ctx))?;
    writeln!(sink, "Method: {}", decoded.method)?;
    if decoded.decode_failed {
        writeln!(sink, "Status: decode failed")?;
    }
    write_annotations(sink, &call.annotations)?;
    write_parameters(sink, "Inputs", &call.inputs, ctx)?;
    write_parameters(sink, "Outputs", &call.outputs, ctx)?;
    Ok(())
}

fn write_parameters(
    sink: &mut dyn Write,
    label: &str,
    params: &[AnalyzedParameter<'_>],
    ctx: &DescribeContext<'_>,
) -> Result<(), RenderError> {
    writeln!(sink, "{label}:")?;
    for param in params {
        let line = format!("{}: {}", param.decoded.name, value_text(&param.decoded.value, ctx));
        writeln!(sink, "{}", indent(&line))?;
        for annotation in &param.annotations {
            writeln!(sink, "{}", indent(&indent(&annotation_line(annotation))))?;
        }
    }
    Ok(())
}

fn write_annotations(sink: &mut dyn Write, annotations: &Annotations) -> Result<(), RenderError> {
    if annotations.is_empty() {
        return Ok(());
    }
    writeln!(sink, "Annotations:")?;
    for annotation in annotations {
        writeln!(sink, "{INDENT}{}", annotation_line(annotation))?;
    }
    Ok(())
}

/// Formats one value. Every variant of the value model is handled; a value
/// that cannot be formatted is replaced by its error marker in place.
pub(crate) fn value_text(value: &Value, ctx: &DescribeContext<'_>) -> String {
    let rendered = match value {
        Value::Simple(s) => Ok(s.clone()),
        Value::Address(a) => Ok(a.clone()),
        Value::Bytes(_)
        | Value::ChainSelector(_)
        | Value::Array(_)
        | Value::Struct(_)
        | Value::Named(_)
        | Value::Yaml(_) => value.try_describe(ctx),
        Value::Custom(custom) => custom.describe(ctx),
    };
    rendered.unwrap_or_else(|err| error_marker(&err))
}

/// `addr` followed by its identity in parentheses, when known.
pub(crate) fn address_line(address: &str, ctx: &DescribeContext<'_>) -> String {
    let identity = Value::address(address).annotation(ctx);
    if identity.is_empty() {
        address.to_string()
    } else {
        format!("{address} ({identity})")
    }
}

pub(crate) fn annotation_line(annotation: &Annotation) -> String {
    if annotation.path.is_empty() {
        format!("{}: {}", annotation.key, annotation.value)
    } else {
        format!("{} [{}]: {}", annotation.key, annotation.path, annotation.value)
    }
}

pub(crate) fn kind_label(kind: &ProposalKind) -> String {
    match kind {
        ProposalKind::Proposal => "proposal".to_string(),
        ProposalKind::Timelock { action, delay, .. } if delay.is_empty() => {
            format!("timelock {action}")
        }
        ProposalKind::Timelock { action, delay, .. } => {
            format!("timelock {action} (delay {delay})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use chainproposal_core::{chain::selectors, decoded::DecodedCall, value::NamedValue};

    #[test]
    fn renders_header_batches_and_calls() {
        let decoded = fixtures::proposal(vec![DecodedCall::new(
            "0xAbC",
            "Token::transfer(address,uint256)",
            vec![
                NamedValue::new("amount", Value::simple("5")),
                NamedValue::new(
                    "route",
                    Value::Struct(vec![
                        NamedValue::new("to", Value::address("0x1")),
                        NamedValue::new("chain", Value::ChainSelector(selectors::ETHEREUM_MAINNET)),
                    ]),
                ),
            ],
            vec![],
        )]);
        let exec = fixtures::execution();
        let engine = fixtures::bare_engine();
        let analyzed = engine.analyze_decoded(&decoded, &exec);

        let text = TextRenderer
            .render(&RenderRequest::new("mcms", "staging"), &analyzed)
            .unwrap();

        let expected = "\
Domain: mcms
Environment: staging
Kind: proposal
Version: v1
Valid until: 100

Batch 0: 5009297550715157269 (ethereum-mainnet)

Call 0
Address: 0xAbC (address of Token 1.0.0 from ethereum-mainnet)
Method: Token::transfer(address,uint256)
Inputs:
    amount: 5
    route: {
        to: 0x1
        chain: 5009297550715157269 (ethereum-mainnet)
    }
Outputs:
";
        assert_eq!(text, expected);
    }

    #[test]
    fn failed_call_and_broken_value_do_not_abort() {
        let decoded = fixtures::proposal(vec![
            DecodedCall::failed("0xdead", "unknown contract interface: 0xdead"),
            DecodedCall::new(
                "0xbeef",
                "Cell::store()",
                vec![NamedValue::new("payload", Value::Custom(std::sync::Arc::new(fixtures::BrokenCell)))],
                vec![],
            ),
        ]);
        let exec = fixtures::execution();
        let analyzed = fixtures::bare_engine().analyze_decoded(&decoded, &exec);

        let text = TextRenderer.render(&RenderRequest::default(), &analyzed).unwrap();

        assert!(text.contains("Address: 0xdead\nMethod: unknown contract interface: 0xdead\nStatus: decode failed\n"));
        assert!(text.contains("    payload: Error rendering cell: truncated cell\n"));
        assert!(text.contains("Call 1\nAddress: 0xbeef\n"));
    }

    #[test]
    fn annotations_are_listed_under_their_node() {
        let decoded = fixtures::proposal(vec![DecodedCall::new(
            "0xAbC",
            "Token::approve(address)",
            vec![NamedValue::new("spender", Value::address("0xABC"))],
            vec![],
        )]);
        let exec = fixtures::execution();
        let engine = fixtures::builtin_engine();
        let analyzed = engine.analyze_decoded(&decoded, &exec);

        let text = TextRenderer.render(&RenderRequest::default(), &analyzed).unwrap();

        assert!(text.contains("Annotations:\n    chain.name: ethereum-mainnet\n"));
        assert!(text.contains("Annotations:\n    target: Token 1.0.0\n"));
        assert!(text.contains(
            "    spender: 0xABC\n        address.identity [0xABC]: address of Token 1.0.0 from ethereum-mainnet\n"
        ));
    }

    #[test]
    fn timelock_kind_label() {
        let kind = ProposalKind::Timelock {
            action: chainproposal_core::decoded::TimelockAction::Schedule,
            delay: "24h".into(),
            timelock_addresses: Default::default(),
        };
        assert_eq!(kind_label(&kind), "timelock schedule (delay 24h)");
    }
}
