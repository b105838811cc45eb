//! Annotates every known address inside a parameter value, however deeply
//! nested, with the contract it belongs to.
//!
//! Resolution prefers the chain of the enclosing batch operation; an
//! address recorded only on other chains resolves to the lowest selector.

use crate::analyzer::{BaseAnalyzer, ParameterAnalyzer};
use crate::annotation::Annotation;
use crate::context::{AnalyzerContext, ExecutionContext};
use crate::error::AnalyzerError;
use chainproposal_core::{
    context::normalize_address,
    value::{NamedValue, Value},
};
use std::collections::BTreeSet;

pub const ID: &str = "parameter-address-identity";

pub struct AddressIdentity;

impl BaseAnalyzer for AddressIdentity {
    fn id(&self) -> &str {
        ID
    }
}

impl ParameterAnalyzer for AddressIdentity {
    fn matches(&self, _ctx: &AnalyzerContext<'_>, param: &NamedValue) -> bool {
        !param.value.addresses().is_empty()
    }

    fn analyze(
        &self,
        ctx: &AnalyzerContext<'_>,
        exec: &ExecutionContext,
        param: &NamedValue,
    ) -> Result<Vec<Annotation>, AnalyzerError> {
        let describe = ctx.describe_context(exec);
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for addr in param.value.addresses() {
            if !seen.insert(normalize_address(addr)) {
                continue;
            }
            let identity = Value::address(addr).annotation(&describe);
            if !identity.is_empty() {
                out.push(Annotation::new("address.identity", identity).with_path(addr));
            }
        }
        Ok(out)
    }
}
