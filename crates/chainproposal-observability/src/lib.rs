//! # chainproposal-observability
//!
//! Logging and OpenTelemetry metrics for proposal describe runs.
//!
//! ## Built-in metrics
//! - `chainproposal.proposals_described` : counter, tagged with renderer
//! - `chainproposal.calls_decoded`       : counter, tagged with outcome
//! - `chainproposal.analyzer_failures`   : counter, tagged with analyzer
//! - `chainproposal.render_latency_ms`   : histogram, tagged with renderer
//!
//! ## Structured logging
//! Text or JSON logs on stderr, so reports written to stdout stay clean.
//! Log levels configurable per component.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::ProposalMetrics;
pub use tracing_setup::{init_tracing, LogConfig};
