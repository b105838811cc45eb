//! Analyzer role traits.
//!
//! An analyzer works on exactly one level of the tree. The four roles share
//! `BaseAnalyzer` (identity and declared dependencies); registration wraps
//! each in the closed `Analyzer` enum so the engine matches roles
//! exhaustively.

use crate::annotation::Annotation;
use crate::context::{AnalyzerContext, ExecutionContext};
use crate::error::AnalyzerError;
use chainproposal_core::{
    decoded::{DecodedBatchOperation, DecodedCall, DecodedProposal},
    value::NamedValue,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Capabilities shared by every analyzer role.
///
/// # Thread Safety
/// Analyzers are shared by concurrent runs and must be `Send + Sync`.
pub trait BaseAnalyzer: Send + Sync {
    /// Stable identifier, unique across all registered analyzers. Used as
    /// annotation provenance.
    fn id(&self) -> &str;

    /// IDs of analyzers whose annotations this one reads through
    /// `AnalyzerContext::annotations_from`.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }
}

pub trait ProposalAnalyzer: BaseAnalyzer {
    fn matches(&self, _ctx: &AnalyzerContext<'_>, _proposal: &DecodedProposal) -> bool {
        true
    }

    fn analyze(
        &self,
        ctx: &AnalyzerContext<'_>,
        exec: &ExecutionContext,
        proposal: &DecodedProposal,
    ) -> Result<Vec<Annotation>, AnalyzerError>;
}

pub trait BatchOperationAnalyzer: BaseAnalyzer {
    fn matches(&self, _ctx: &AnalyzerContext<'_>, _batch: &DecodedBatchOperation) -> bool {
        true
    }

    fn analyze(
        &self,
        ctx: &AnalyzerContext<'_>,
        exec: &ExecutionContext,
        batch: &DecodedBatchOperation,
    ) -> Result<Vec<Annotation>, AnalyzerError>;
}

pub trait CallAnalyzer: BaseAnalyzer {
    fn matches(&self, _ctx: &AnalyzerContext<'_>, _call: &DecodedCall) -> bool {
        true
    }

    fn analyze(
        &self,
        ctx: &AnalyzerContext<'_>,
        exec: &ExecutionContext,
        call: &DecodedCall,
    ) -> Result<Vec<Annotation>, AnalyzerError>;
}

pub trait ParameterAnalyzer: BaseAnalyzer {
    fn matches(&self, _ctx: &AnalyzerContext<'_>, _param: &NamedValue) -> bool {
        true
    }

    fn analyze(
        &self,
        ctx: &AnalyzerContext<'_>,
        exec: &ExecutionContext,
        param: &NamedValue,
    ) -> Result<Vec<Annotation>, AnalyzerError>;
}

/// Tree level an analyzer runs at, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerRole {
    Proposal,
    BatchOperation,
    Call,
    Parameter,
}

impl fmt::Display for AnalyzerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerRole::Proposal => write!(f, "proposal"),
            AnalyzerRole::BatchOperation => write!(f, "batch operation"),
            AnalyzerRole::Call => write!(f, "call"),
            AnalyzerRole::Parameter => write!(f, "parameter"),
        }
    }
}

/// A registered analyzer of one of the four roles.
#[derive(Clone)]
pub enum Analyzer {
    Proposal(Arc<dyn ProposalAnalyzer>),
    BatchOperation(Arc<dyn BatchOperationAnalyzer>),
    Call(Arc<dyn CallAnalyzer>),
    Parameter(Arc<dyn ParameterAnalyzer>),
}

impl Analyzer {
    pub fn proposal(a: impl ProposalAnalyzer + 'static) -> Self {
        Analyzer::Proposal(Arc::new(a))
    }

    pub fn batch_operation(a: impl BatchOperationAnalyzer + 'static) -> Self {
        Analyzer::BatchOperation(Arc::new(a))
    }

    pub fn call(a: impl CallAnalyzer + 'static) -> Self {
        Analyzer::Call(Arc::new(a))
    }

    pub fn parameter(a: impl ParameterAnalyzer + 'static) -> Self {
        Analyzer::Parameter(Arc::new(a))
    }

    pub fn role(&self) -> AnalyzerRole {
        match self {
            Analyzer::Proposal(_) => AnalyzerRole::Proposal,
            Analyzer::BatchOperation(_) => AnalyzerRole::BatchOperation,
            Analyzer::Call(_) => AnalyzerRole::Call,
            Analyzer::Parameter(_) => AnalyzerRole::Parameter,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Analyzer::Proposal(a) => a.id(),
            Analyzer::BatchOperation(a) => a.id(),
            Analyzer::Call(a) => a.id(),
            Analyzer::Parameter(a) => a.id(),
        }
    }

    pub fn dependencies(&self) -> Vec<String> {
        match self {
            Analyzer::Proposal(a) => a.dependencies(),
            Analyzer::BatchOperation(a) => a.dependencies(),
            Analyzer::Call(a) => a.dependencies(),
            Analyzer::Parameter(a) => a.dependencies(),
        }
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("role", &self.role())
            .field("id", &self.id())
            .finish()
    }
}
