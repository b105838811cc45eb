//! Describe-run metrics.
//!
//! Instruments follow OpenTelemetry conventions and are exported by
//! whichever meter provider the host installs (no-op without one).

use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Central metrics handle for describe runs.
#[derive(Clone)]
pub struct ProposalMetrics {
    pub proposals_described: Counter<u64>,
    pub calls_decoded: Counter<u64>,
    pub analyzer_failures: Counter<u64>,
    pub render_latency_ms: Histogram<f64>,
}

impl ProposalMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            proposals_described: meter
                .u64_counter("chainproposal.proposals_described")
                .with_description("Proposals rendered into a report")
                .init(),
            calls_decoded: meter
                .u64_counter("chainproposal.calls_decoded")
                .with_description("Calls processed by the decoder, by outcome")
                .init(),
            analyzer_failures: meter
                .u64_counter("chainproposal.analyzer_failures")
                .with_description("Analyzer invocations that failed and were skipped")
                .init(),
            render_latency_ms: meter
                .f64_histogram("chainproposal.render_latency_ms")
                .with_description("Time to render one report in milliseconds")
                .init(),
        }
    }

    pub fn record_described(&self, renderer: &str) {
        self.proposals_described
            .add(1, &[KeyValue::new("renderer", renderer.to_string())]);
    }

    /// `failed` of `total` calls could not be decoded.
    pub fn record_calls(&self, total: u64, failed: u64) {
        let ok = total.saturating_sub(failed);
        if ok > 0 {
            self.calls_decoded.add(ok, &[KeyValue::new("outcome", "decoded")]);
        }
        if failed > 0 {
            self.calls_decoded.add(failed, &[KeyValue::new("outcome", "failed")]);
        }
    }

    pub fn record_analyzer_failure(&self, analyzer_id: &str) {
        self.analyzer_failures
            .add(1, &[KeyValue::new("analyzer", analyzer_id.to_string())]);
    }

    pub fn record_render_latency(&self, ms: f64, renderer: &str) {
        self.render_latency_ms
            .record(ms, &[KeyValue::new("renderer", renderer.to_string())]);
    }
}

impl std::fmt::Debug for ProposalMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProposalMetrics").finish_non_exhaustive()
    }
}
