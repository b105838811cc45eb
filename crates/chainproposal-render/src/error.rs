//! Error types for rendering and the describe entry points.

use chainproposal_analyzer::EngineError;
use thiserror::Error;

/// A renderer could not write its report.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Setup-time errors of the renderer registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RendererRegistryError {
    #[error("renderer ID must not be empty")]
    EmptyId,

    #[error("renderer '{id}' already registered")]
    AlreadyRegistered { id: String },
}

/// Conditions under which no report can be produced at all.
#[derive(Debug, Error)]
pub enum DescribeProposalError {
    #[error("unknown renderer '{id}' (available: {available})")]
    UnknownRenderer { id: String, available: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}
