//! Contexts handed to analyzers.
//!
//! `ExecutionContext` is the read-only environment of a whole run.
//! `AnalyzerContext` is the traversal scope of one node: which proposal,
//! batch operation and call it sits under, and the annotations already
//! attached along that path. Each level of the walk builds its own
//! extended copy, so nothing from a finished subtree leaks into a sibling.

use crate::annotation::{Annotation, Annotations};
use crate::environment::ScopedEnvironment;
use chainproposal_core::{
    chain::ChainNameResolver,
    context::{DescribeContext, FieldContext},
    decoded::{DecodedBatchOperation, DecodedCall, DecodedProposal},
};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation for a run; checked between analyzer invocations.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Read-only environment of one run.
pub struct ExecutionContext {
    pub environment: ScopedEnvironment,
    pub fields: FieldContext,
    pub chains: Arc<dyn ChainNameResolver>,
    pub cancellation: CancellationFlag,
}

impl ExecutionContext {
    pub fn new(environment: ScopedEnvironment, chains: Arc<dyn ChainNameResolver>) -> Self {
        let fields = environment.field_context();
        Self {
            environment,
            fields,
            chains,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Context for `Value::describe`, unscoped.
    pub fn describe_context(&self) -> DescribeContext<'_> {
        DescribeContext::new(&self.fields, self.chains.as_ref())
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("environment", &self.environment)
            .field("fields", &self.fields)
            .field("cancellation", &self.cancellation)
            .finish_non_exhaustive()
    }
}

/// Whether a parameter is a call input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Input,
    Output,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Input => write!(f, "input"),
            ParameterKind::Output => write!(f, "output"),
        }
    }
}

/// Traversal scope of the node being analysed.
#[derive(Clone, Copy)]
pub struct AnalyzerContext<'a> {
    proposal: &'a DecodedProposal,
    batch_operation: Option<&'a DecodedBatchOperation>,
    call: Option<&'a DecodedCall>,
    parameter_kind: Option<ParameterKind>,
    path: &'a str,
    proposal_annotations: Option<&'a Annotations>,
    batch_annotations: Option<&'a Annotations>,
    call_annotations: Option<&'a Annotations>,
    node_annotations: Option<&'a Annotations>,
}

impl<'a> AnalyzerContext<'a> {
    /// Scope at the root of the tree.
    pub fn for_proposal(proposal: &'a DecodedProposal, path: &'a str) -> Self {
        Self {
            proposal,
            batch_operation: None,
            call: None,
            parameter_kind: None,
            path,
            proposal_annotations: None,
            batch_annotations: None,
            call_annotations: None,
            node_annotations: None,
        }
    }

    /// Descend into a batch operation. `proposal_annotations` are final.
    pub fn enter_batch_operation(
        self,
        batch: &'a DecodedBatchOperation,
        path: &'a str,
        proposal_annotations: &'a Annotations,
    ) -> Self {
        Self {
            batch_operation: Some(batch),
            path,
            proposal_annotations: Some(proposal_annotations),
            node_annotations: None,
            ..self
        }
    }

    /// Descend into a call. `batch_annotations` are final.
    pub fn enter_call(
        self,
        call: &'a DecodedCall,
        path: &'a str,
        batch_annotations: &'a Annotations,
    ) -> Self {
        Self {
            call: Some(call),
            path,
            batch_annotations: Some(batch_annotations),
            node_annotations: None,
            ..self
        }
    }

    /// Descend into a parameter. `call_annotations` are final.
    pub fn enter_parameter(
        self,
        kind: ParameterKind,
        path: &'a str,
        call_annotations: &'a Annotations,
    ) -> Self {
        Self {
            parameter_kind: Some(kind),
            path,
            call_annotations: Some(call_annotations),
            node_annotations: None,
            ..self
        }
    }

    /// Expose the annotations attached to the current node so far.
    pub fn with_node_annotations(self, node: &'a Annotations) -> Self {
        Self {
            node_annotations: Some(node),
            ..self
        }
    }

    pub fn proposal(&self) -> &'a DecodedProposal {
        self.proposal
    }

    pub fn batch_operation(&self) -> Option<&'a DecodedBatchOperation> {
        self.batch_operation
    }

    pub fn call(&self) -> Option<&'a DecodedCall> {
        self.call
    }

    pub fn parameter_kind(&self) -> Option<ParameterKind> {
        self.parameter_kind
    }

    /// Chain of the enclosing batch operation, if any.
    pub fn chain_selector(&self) -> Option<u64> {
        self.batch_operation.map(|b| b.chain_selector)
    }

    /// Path of the current node, e.g. `batch[0].call[2].input[role]`.
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Describe context scoped to the enclosing batch operation's chain, or to
    /// the proposal's representative chain above batch level.
    pub fn describe_context<'e>(&self, exec: &'e ExecutionContext) -> DescribeContext<'e> {
        let ctx = exec.describe_context();
        match self.chain_selector().or_else(|| self.proposal.representative_chain()) {
            Some(sel) => ctx.for_chain(sel),
            None => ctx,
        }
    }

    /// Annotations produced by `analyzer_id` on this node's ancestors and on
    /// this node so far, root first.
    pub fn annotations_from(&self, analyzer_id: &str) -> Vec<&'a Annotation> {
        [
            self.proposal_annotations,
            self.batch_annotations,
            self.call_annotations,
            self.node_annotations,
        ]
        .into_iter()
        .flatten()
        .flat_map(|anns| anns.iter().filter(|a| a.analyzer_id == analyzer_id))
        .collect()
    }
}

impl fmt::Debug for AnalyzerContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerContext")
            .field("path", &self.path)
            .field("chain_selector", &self.chain_selector())
            .field("parameter_kind", &self.parameter_kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainproposal_core::decoded::ProposalKind;
    use std::collections::BTreeMap;

    fn proposal() -> DecodedProposal {
        DecodedProposal {
            kind: ProposalKind::Proposal,
            version: "v1".into(),
            description: String::new(),
            valid_until: 0,
            chain_metadata: BTreeMap::new(),
            batch_operations: vec![DecodedBatchOperation {
                chain_selector: 42,
                calls: vec![DecodedCall::new("0x1", "f()", vec![], vec![])],
            }],
        }
    }

    #[test]
    fn scopes_extend_without_mutation() {
        let p = proposal();
        let mut root_anns = Annotations::new();
        root_anns.append("root", vec![Annotation::new("k", "root")]);
        let batch_anns = Annotations::new();

        let root = AnalyzerContext::for_proposal(&p, "proposal");
        let batch = root.enter_batch_operation(&p.batch_operations[0], "batch[0]", &root_anns);
        let call = batch.enter_call(&p.batch_operations[0].calls[0], "batch[0].call[0]", &batch_anns);

        assert_eq!(root.chain_selector(), None);
        assert!(root.call().is_none());
        assert_eq!(batch.chain_selector(), Some(42));
        assert!(batch.call().is_none());
        assert_eq!(call.path(), "batch[0].call[0]");
        assert_eq!(call.annotations_from("root").len(), 1);
        assert!(root.annotations_from("root").is_empty());
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        other.cancel();
        assert!(flag.is_cancelled());
    }
}
