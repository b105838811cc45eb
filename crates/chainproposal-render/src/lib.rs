//! # chainproposal-render
//!
//! Turns an analyzed proposal into a report.
//!
//! ## Built-in renderers
//! - `text`     : the reference plain-text layout
//! - `markdown` : headings per batch and call, fenced multi-line values
//! - `json`     : the annotated tree as a JSON document
//!
//! ## Usage
//! ```ignore
//! let describer = ProposalDescriber::new(engine, renderers, loader)
//!     .with_request(RenderRequest::new("mcms", "staging"));
//! let report = describer.describe_timelock_proposal(&proposal).await?;
//! println!("{}", report.text);
//! ```

pub mod describe;
pub mod error;
pub mod json;
pub mod markdown;
pub mod renderer;
pub mod text;

pub use describe::{DescribeReport, ProposalDescriber};
pub use error::{DescribeProposalError, RenderError, RendererRegistryError};
pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;
pub use renderer::{RenderRequest, Renderer, RendererRegistry};
pub use text::TextRenderer;

#[cfg(test)]
mod fixtures;
