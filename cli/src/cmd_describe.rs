//! `chainproposal describe`: render a proposal file for review.
//!
//! Builds the decoder registry from the configured ABIs, scopes the address
//! book to the proposal's chains, runs the built-in analyzers and writes the
//! selected renderer's output.

use crate::config::DescribeConfig;
use anyhow::{Context, Result};
use chainproposal_analyzer::{AddressBookLoader, AnalyzerRegistry, Engine};
use chainproposal_core::{
    context::StaticAddressSource,
    decoder::{DecoderRegistry, ProposalDecoder},
    proposal::{Proposal, TimelockProposal},
};
use chainproposal_evm::EvmAbiDecoder;
use chainproposal_observability::ProposalMetrics;
use chainproposal_render::{DescribeReport, ProposalDescriber, RenderRequest, RendererRegistry};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub async fn run(
    config: &DescribeConfig,
    proposal_path: &Path,
    force_timelock: bool,
    output: Option<&Path>,
) -> Result<()> {
    let json = std::fs::read_to_string(proposal_path)
        .with_context(|| format!("read proposal '{}'", proposal_path.display()))?;

    let describer = build_describer(config)?;
    let report = if force_timelock || looks_like_timelock(&json)? {
        let proposal = TimelockProposal::from_json(&json).context("parse timelock proposal")?;
        describer.describe_timelock_proposal(&proposal).await?
    } else {
        let proposal = Proposal::from_json(&json).context("parse proposal")?;
        describer.describe_proposal(&proposal).await?
    };

    record_metrics(&report);
    for failure in &report.analyzer_failures {
        warn!(analyzer = %failure.analyzer_id, path = %failure.path, "{}", failure.message);
    }

    match output {
        Some(path) => {
            std::fs::write(path, &report.text)
                .with_context(|| format!("write report '{}'", path.display()))?;
            eprintln!(
                "✓ {} calls ({} undecoded) → {}",
                report.calls,
                report.decode_failures,
                path.display()
            );
        }
        None => print!("{}", report.text),
    }
    Ok(())
}

/// Timelock proposals carry an `action` and per-chain timelock addresses.
fn looks_like_timelock(json: &str) -> Result<bool> {
    let raw: serde_json::Value = serde_json::from_str(json).context("proposal is not valid JSON")?;
    Ok(raw.get("action").is_some() || raw.get("timelockAddresses").is_some())
}

fn build_describer(config: &DescribeConfig) -> Result<ProposalDescriber> {
    let decoders = DecoderRegistry::new();
    for (tv, path) in config.abi_files()? {
        let abi = std::fs::read_to_string(path)
            .with_context(|| format!("read ABI '{}'", path.display()))?;
        let decoder = EvmAbiDecoder::from_abi_json(tv.contract_type.clone(), &abi)
            .with_context(|| format!("load ABI for {tv}"))?;
        debug!(interface = %tv, functions = decoder.function_names().len(), "loaded ABI");
        decoders.register(&tv, Arc::new(decoder))?;
    }

    let source = match &config.addresses {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read address book '{}'", path.display()))?;
            StaticAddressSource::from_json(&json).context("parse address book")?
        }
        None => StaticAddressSource::new(Vec::new()),
    };
    let loader = AddressBookLoader::new(config.environment.clone(), Arc::new(source));

    let engine = Engine::new(
        AnalyzerRegistry::with_builtin(),
        ProposalDecoder::new(Arc::new(decoders)),
        Arc::new(config.known_chains()),
    )
    .context("analyzer setup")?;

    Ok(ProposalDescriber::new(
        Arc::new(engine),
        Arc::new(RendererRegistry::with_builtin()),
        Arc::new(loader),
    )
    .with_request(RenderRequest::new(config.domain.clone(), config.environment.clone()))
    .with_renderer(config.renderer.clone()))
}

fn record_metrics(report: &DescribeReport) {
    let meter = opentelemetry::global::meter("chainproposal");
    let metrics = ProposalMetrics::new(&meter);
    metrics.record_described(&report.renderer);
    metrics.record_calls(report.calls as u64, report.decode_failures as u64);
    metrics.record_render_latency(report.render_time.as_secs_f64() * 1000.0, &report.renderer);
    for failure in &report.analyzer_failures {
        metrics.record_analyzer_failure(&failure.analyzer_id);
    }
}
