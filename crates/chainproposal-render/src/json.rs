//! JSON renderer: the annotated tree as one document.
//!
//! Values appear both structurally (`value`) and formatted (`text`) so
//! consumers can diff either.

use crate::error::RenderError;
use crate::renderer::{RenderRequest, Renderer};
use crate::text::value_text;
use chainproposal_analyzer::{AnalyzedCall, AnalyzedParameter, AnalyzedProposal};
use chainproposal_core::{context::DescribeContext, error::DescribeError, value::error_marker};
use serde_json::{json, Value as Json};
use std::io::Write;

pub const ID: &str = "json";

#[derive(Debug, Clone, Copy)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Renderer for JsonRenderer {
    fn id(&self) -> &str {
        ID
    }

    fn render_to(
        &self,
        sink: &mut dyn Write,
        request: &RenderRequest,
        proposal: &AnalyzedProposal<'_>,
    ) -> Result<(), RenderError> {
        let doc = document(request, proposal);
        if self.pretty {
            serde_json::to_writer_pretty(&mut *sink, &doc)?;
        } else {
            serde_json::to_writer(&mut *sink, &doc)?;
        }
        writeln!(sink)?;
        Ok(())
    }
}

fn document(request: &RenderRequest, proposal: &AnalyzedProposal<'_>) -> Json {
    let decoded = proposal.decoded;
    let exec = proposal.execution;
    let mut batches = Vec::with_capacity(proposal.batch_operations.len());
    for batch in &proposal.batch_operations {
        let selector = batch.decoded.chain_selector;
        let ctx = exec.describe_context().for_chain(selector);
        let calls: Vec<Json> = batch.calls.iter().map(|c| call(c, &ctx)).collect();
        batches.push(json!({
            "chain_selector": selector,
            "chain": ctx.chain_label(selector),
            "annotations": batch.annotations,
            "calls": calls,
        }));
    }

    json!({
        "domain": request.domain,
        "environment": request.environment_name,
        "proposal": {
            "kind": decoded.kind,
            "version": decoded.version,
            "description": decoded.description,
            "valid_until": decoded.valid_until,
            "chain_metadata": decoded.chain_metadata,
            "annotations": proposal.annotations,
        },
        "batch_operations": batches,
        "failures": proposal.failures,
    })
}

fn call(call: &AnalyzedCall<'_>, ctx: &DescribeContext<'_>) -> Json {
    let decoded = call.decoded;
    let params = |list: &[AnalyzedParameter<'_>]| list.iter().map(|p| parameter(p, ctx)).collect::<Vec<_>>();
    let inputs = params(call.inputs.as_slice());
    let outputs = params(call.outputs.as_slice());
    json!({
        "address": decoded.address,
        "method": decoded.method,
        "decode_failed": decoded.decode_failed,
        "annotations": call.annotations,
        "inputs": inputs,
        "outputs": outputs,
    })
}

/// A value JSON cannot represent (e.g. a YAML mapping with non-string keys)
/// becomes `"value": null` plus an inline `error`.
fn parameter(param: &AnalyzedParameter<'_>, ctx: &DescribeContext<'_>) -> Json {
    let value = &param.decoded.value;
    let mut out = json!({
        "name": param.decoded.name,
        "value": Json::Null,
        "text": value_text(value, ctx),
        "annotations": param.annotations,
    });
    match serde_json::to_value(value) {
        Ok(v) => out["value"] = v,
        Err(e) => {
            out["error"] = Json::String(error_marker(&DescribeError::Failed {
                kind: value.kind().to_string(),
                reason: e.to_string(),
            }))
        }
    }
    out
}
