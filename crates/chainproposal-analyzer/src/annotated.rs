//! The annotated tree produced by one engine run.
//!
//! Each node borrows its decoded counterpart and adds the annotations the
//! analyzers attached to it. The tree lives only as long as the run that
//! built it.

use crate::annotation::Annotations;
use crate::context::{ExecutionContext, ParameterKind};
use chainproposal_core::{
    decoded::{DecodedBatchOperation, DecodedCall, DecodedProposal},
    value::NamedValue,
};
use serde::Serialize;

/// An analyzer that failed (or was skipped) on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzerFailure {
    pub analyzer_id: String,
    pub path: String,
    pub message: String,
}

#[derive(Debug)]
pub struct AnalyzedParameter<'a> {
    pub decoded: &'a NamedValue,
    pub kind: ParameterKind,
    pub annotations: Annotations,
}

#[derive(Debug)]
pub struct AnalyzedCall<'a> {
    pub decoded: &'a DecodedCall,
    pub annotations: Annotations,
    pub inputs: Vec<AnalyzedParameter<'a>>,
    pub outputs: Vec<AnalyzedParameter<'a>>,
}

#[derive(Debug)]
pub struct AnalyzedBatchOperation<'a> {
    pub decoded: &'a DecodedBatchOperation,
    pub annotations: Annotations,
    pub calls: Vec<AnalyzedCall<'a>>,
}

#[derive(Debug)]
pub struct AnalyzedProposal<'a> {
    pub decoded: &'a DecodedProposal,
    pub execution: &'a ExecutionContext,
    pub annotations: Annotations,
    pub batch_operations: Vec<AnalyzedBatchOperation<'a>>,
    /// Analyzer failures of this run, in traversal order.
    pub failures: Vec<AnalyzerFailure>,
}

impl<'a> AnalyzedProposal<'a> {
    /// Number of annotations in the whole tree.
    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
            + self
                .batch_operations
                .iter()
                .map(|b| {
                    b.annotations.len()
                        + b.calls
                            .iter()
                            .map(|c| {
                                c.annotations.len()
                                    + c.inputs
                                        .iter()
                                        .chain(&c.outputs)
                                        .map(|p| p.annotations.len())
                                        .sum::<usize>()
                            })
                            .sum::<usize>()
                })
                .sum::<usize>()
    }

    pub fn calls(&self) -> impl Iterator<Item = &AnalyzedCall<'a>> {
        self.batch_operations.iter().flat_map(|b| b.calls.iter())
    }
}
