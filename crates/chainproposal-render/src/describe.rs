//! Top-level describe entry points: load, decode, analyze, render.
//!
//! Only an unusable renderer selection or an environment that cannot be
//! loaded fails a describe; decode and analyzer problems end up inside the
//! report.

use crate::error::DescribeProposalError;
use crate::renderer::{RenderRequest, Renderer, RendererRegistry};
use chainproposal_analyzer::{AnalyzerFailure, CancellationFlag, Engine, EnvironmentLoader};
use chainproposal_core::proposal::{Proposal, ProposalInput, TimelockProposal};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// The rendered report plus what the run observed along the way.
#[derive(Debug, Clone)]
pub struct DescribeReport {
    pub text: String,
    pub renderer: String,
    pub chain_selectors: Vec<u64>,
    pub calls: usize,
    pub decode_failures: usize,
    pub annotations: usize,
    pub analyzer_failures: Vec<AnalyzerFailure>,
    pub render_time: Duration,
}

/// Wires an engine, a renderer registry and an environment loader together.
pub struct ProposalDescriber {
    engine: Arc<Engine>,
    renderers: Arc<RendererRegistry>,
    loader: Arc<dyn EnvironmentLoader>,
    request: RenderRequest,
    renderer_id: String,
    cancellation: Option<CancellationFlag>,
}

impl ProposalDescriber {
    pub fn new(
        engine: Arc<Engine>,
        renderers: Arc<RendererRegistry>,
        loader: Arc<dyn EnvironmentLoader>,
    ) -> Self {
        Self {
            engine,
            renderers,
            loader,
            request: RenderRequest::default(),
            renderer_id: crate::text::ID.to_string(),
            cancellation: None,
        }
    }

    pub fn with_request(mut self, request: RenderRequest) -> Self {
        self.request = request;
        self
    }

    pub fn with_renderer(mut self, id: impl Into<String>) -> Self {
        self.renderer_id = id.into();
        self
    }

    /// Share a cancellation flag with every run of this describer.
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub async fn describe_proposal(
        &self,
        proposal: &Proposal,
    ) -> Result<DescribeReport, DescribeProposalError> {
        self.describe(proposal).await
    }

    pub async fn describe_timelock_proposal(
        &self,
        proposal: &TimelockProposal,
    ) -> Result<DescribeReport, DescribeProposalError> {
        self.describe(proposal).await
    }

    pub async fn describe<P>(&self, proposal: &P) -> Result<DescribeReport, DescribeProposalError>
    where
        P: ProposalInput + Sync + ?Sized,
    {
        let renderer = self.renderer()?;
        let mut run = self.engine.prepare(proposal, self.loader.as_ref()).await?;
        if let Some(flag) = &self.cancellation {
            run.execution.cancellation = flag.clone();
        }
        let analyzed = self.engine.analyze(&run);

        let started = Instant::now();
        let text = renderer.render(&self.request, &analyzed)?;
        let render_time = started.elapsed();

        let report = DescribeReport {
            text,
            renderer: renderer.id().to_string(),
            chain_selectors: run.execution.environment.chain_selectors.iter().copied().collect(),
            calls: run.decoded.call_count(),
            decode_failures: run.decoded.failed_calls().count(),
            annotations: analyzed.annotation_count(),
            analyzer_failures: analyzed.failures.clone(),
            render_time,
        };
        info!(
            renderer = %report.renderer,
            calls = report.calls,
            decode_failures = report.decode_failures,
            analyzer_failures = report.analyzer_failures.len(),
            render_ms = render_time.as_secs_f64() * 1000.0,
            "proposal described"
        );
        Ok(report)
    }

    fn renderer(&self) -> Result<Arc<dyn Renderer>, DescribeProposalError> {
        self.renderers
            .get(&self.renderer_id)
            .ok_or_else(|| DescribeProposalError::UnknownRenderer {
                id: self.renderer_id.clone(),
                available: self.renderers.list().join(", "),
            })
    }
}

impl std::fmt::Debug for ProposalDescriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProposalDescriber")
            .field("engine", &self.engine)
            .field("renderers", &self.renderers)
            .field("request", &self.request)
            .field("renderer_id", &self.renderer_id)
            .finish_non_exhaustive()
    }
}
