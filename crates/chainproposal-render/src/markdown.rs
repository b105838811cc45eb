//! Markdown renderer: a metadata table, one heading per batch operation and
//! call, and parameter lists with multi-line values in fenced blocks.

use crate::error::RenderError;
use crate::renderer::{RenderRequest, Renderer};
use crate::text::{address_line, annotation_line, kind_label, value_text};
use chainproposal_analyzer::{AnalyzedCall, AnalyzedParameter, AnalyzedProposal, Annotations};
use chainproposal_core::context::DescribeContext;
use std::io::Write;

pub const ID: &str = "markdown";

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
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

        writeln!(sink, "# Proposal")?;
        writeln!(sink)?;
        writeln!(sink, "| Field | Value |")?;
        writeln!(sink, "|---|---|")?;
        let mut rows = vec![
            ("Domain", request.domain.clone()),
            ("Environment", request.environment_name.clone()),
            ("Kind", kind_label(&decoded.kind)),
            ("Version", decoded.version.clone()),
            ("Valid until", decoded.valid_until.to_string()),
        ];
        if !decoded.description.is_empty() {
            rows.push(("Description", decoded.description.clone()));
        }
        for (field, value) in rows {
            writeln!(sink, "| {field} | {} |", table_cell(&value))?;
        }
        write_annotations(sink, &proposal.annotations)?;

        for (index, batch) in proposal.batch_operations.iter().enumerate() {
            let selector = batch.decoded.chain_selector;
            let ctx = exec.describe_context().for_chain(selector);
            writeln!(sink)?;
            writeln!(sink, "## Batch {index}: {}", ctx.chain_label(selector))?;
            if let Some(meta) = decoded.chain_metadata.get(&selector) {
                writeln!(sink)?;
                writeln!(
                    sink,
                    "MCM `{}`, starting op count {}",
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
    if decoded.decode_failed {
        writeln!(sink, "### Call {index}: decode failed")?;
        writeln!(sink)?;
        writeln!(sink, "> {}", decoded.method)?;
    } else {
        writeln!(sink, "### Call {index}: `{}`", decoded.method)?;
    }
    writeln!(sink)?;
    writeln!(sink, "Address: {}", address_line(&decoded.address, ctx))?;
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
    if params.is_empty() {
        return Ok(());
    }
    writeln!(sink)?;
    writeln!(sink, "**{label}**")?;
    writeln!(sink)?;
    for param in params {
        let text = value_text(&param.decoded.value, ctx);
        if text.contains('\n') {
            writeln!(sink, "- `{}`:", param.decoded.name)?;
            writeln!(sink, "  ```")?;
            for line in text.lines() {
                writeln!(sink, "  {line}")?;
            }
            writeln!(sink, "  ```")?;
        } else {
            writeln!(sink, "- `{}`: `{text}`", param.decoded.name)?;
        }
        for annotation in &param.annotations {
            writeln!(sink, "  - {}", annotation_line(annotation))?;
        }
    }
    Ok(())
}

fn write_annotations(sink: &mut dyn Write, annotations: &Annotations) -> Result<(), RenderError> {
    if annotations.is_empty() {
        return Ok(());
    }
    writeln!(sink)?;
    for annotation in annotations {
        writeln!(sink, "- {}", annotation_line(annotation))?;
    }
    Ok(())
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}
