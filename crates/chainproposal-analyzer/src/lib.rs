//! # chainproposal-analyzer
//!
//! Runs pluggable analyzers over a decoded proposal and produces an
//! annotated tree that mirrors it.
//!
//! ## Pipeline
//! 1. Resolve the chains a proposal touches and load a read-only view of
//!    their address data (`EnvironmentLoader`)
//! 2. Decode every call (`ProposalDecoder`); failures become data
//! 3. Walk the tree depth-first, pre-order: proposal → batch operations →
//!    calls → parameters, running the analyzers registered for each level
//!
//! An analyzer that fails is logged and skipped. It never stops other
//! analyzers, other nodes, or the run.

pub mod analyzer;
pub mod annotated;
pub mod annotation;
pub mod builtin;
pub mod context;
pub mod engine;
pub mod environment;
pub mod error;

pub use analyzer::{
    Analyzer, AnalyzerRole, BaseAnalyzer, BatchOperationAnalyzer, CallAnalyzer,
    ParameterAnalyzer, ProposalAnalyzer,
};
pub use annotated::{
    AnalyzedBatchOperation, AnalyzedCall, AnalyzedParameter, AnalyzedProposal, AnalyzerFailure,
};
pub use annotation::{Annotation, Annotations};
pub use context::{AnalyzerContext, CancellationFlag, ExecutionContext, ParameterKind};
pub use engine::{AnalyzerRegistry, Engine, PreparedRun};
pub use environment::{AddressBookLoader, EnvironmentLoader, ScopedEnvironment};
pub use error::{AnalyzerError, EngineError, SetupError};
