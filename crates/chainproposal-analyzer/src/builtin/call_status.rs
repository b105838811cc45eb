//! Identifies the contract a call targets, or flags a failed decode.

use crate::analyzer::{BaseAnalyzer, CallAnalyzer};
use crate::annotation::Annotation;
use crate::context::{AnalyzerContext, ExecutionContext};
use crate::error::AnalyzerError;
use chainproposal_core::decoded::DecodedCall;

pub const ID: &str = "call-decode-status";

pub struct CallDecodeStatus;

impl BaseAnalyzer for CallDecodeStatus {
    fn id(&self) -> &str {
        ID
    }
}

impl CallAnalyzer for CallDecodeStatus {
    fn analyze(
        &self,
        ctx: &AnalyzerContext<'_>,
        exec: &ExecutionContext,
        call: &DecodedCall,
    ) -> Result<Vec<Annotation>, AnalyzerError> {
        if call.decode_failed {
            return Ok(vec![Annotation::new("decode.error", call.method.clone())]);
        }
        let Some(sel) = ctx.chain_selector() else {
            return Ok(Vec::new());
        };
        Ok(exec
            .fields
            .get(sel, &call.address)
            .map(|tv| vec![Annotation::new("target", tv.to_string())])
            .unwrap_or_default())
    }
}
