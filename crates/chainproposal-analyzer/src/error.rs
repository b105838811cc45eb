//! Error types for the analyzer engine.

use crate::analyzer::AnalyzerRole;
use chainproposal_core::error::{ChainLookupError, EnvironmentError};
use thiserror::Error;

/// Returned by a single analyzer on a single node.
///
/// The engine logs these and omits the analyzer's contribution; they never
/// reach the caller of a run.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("not implemented")]
    NotImplemented,

    #[error("chain lookup failed: {0}")]
    ChainLookup(#[from] ChainLookupError),

    #[error("{0}")]
    Failed(String),
}

/// Fail-fast errors raised while assembling the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("analyzer ID must not be empty")]
    EmptyId,

    #[error("analyzer '{id}' already registered")]
    DuplicateId { id: String },

    #[error("analyzer '{id}' depends on unknown analyzer '{dependency}'")]
    UnknownDependency { id: String, dependency: String },

    #[error("{role} analyzer '{id}' depends on {dependency_role} analyzer '{dependency}', which runs later")]
    DependencyRunsLater {
        id: String,
        role: AnalyzerRole,
        dependency: String,
        dependency_role: AnalyzerRole,
    },

    #[error("dependency cycle among {role} analyzers: {ids:?}")]
    DependencyCycle { role: AnalyzerRole, ids: Vec<String> },
}

/// Errors that make producing any report meaningless.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("environment could not be loaded: {0}")]
    Environment(#[from] EnvironmentError),
}
