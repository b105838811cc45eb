//! Analyzer registry and the engine that drives a run.
//!
//! ## Implementation notes
//! - Setup is fail-fast: empty or duplicate IDs, unknown dependencies,
//!   dependencies on a later level and cycles are rejected before any
//!   proposal is seen.
//! - Within a level analyzers run in dependency order; registration order
//!   breaks ties.
//! - The walk is depth-first, pre-order. Every node gets a fresh context
//!   derived from its parent's, so siblings never observe each other.

use crate::analyzer::{
    Analyzer, AnalyzerRole, BatchOperationAnalyzer, CallAnalyzer, ParameterAnalyzer,
    ProposalAnalyzer,
};
use crate::annotated::{
    AnalyzedBatchOperation, AnalyzedCall, AnalyzedParameter, AnalyzedProposal, AnalyzerFailure,
};
use crate::annotation::{Annotation, Annotations};
use crate::builtin;
use crate::context::{AnalyzerContext, ExecutionContext, ParameterKind};
use crate::environment::EnvironmentLoader;
use crate::error::{AnalyzerError, EngineError, SetupError};
use chainproposal_core::{
    chain::ChainNameResolver,
    decoded::{DecodedBatchOperation, DecodedCall, DecodedProposal},
    decoder::ProposalDecoder,
    proposal::ProposalInput,
    value::NamedValue,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ─── Registry ────────────────────────────────────────────────────────────────

/// Analyzers in registration order, with IDs unique across all roles.
#[derive(Debug, Default, Clone)]
pub struct AnalyzerRegistry {
    analyzers: Vec<Analyzer>,
    ids: BTreeSet<String>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the analyzers in [`builtin`].
    pub fn with_builtin() -> Self {
        let analyzers = builtin::all();
        let ids = analyzers.iter().map(|a| a.id().to_string()).collect();
        Self { analyzers, ids }
    }

    pub fn register(&mut self, analyzer: Analyzer) -> Result<(), SetupError> {
        let id = analyzer.id();
        if id.is_empty() {
            return Err(SetupError::EmptyId);
        }
        if self.ids.contains(id) {
            return Err(SetupError::DuplicateId { id: id.to_string() });
        }
        self.ids.insert(id.to_string());
        self.analyzers.push(analyzer);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.analyzers.iter().map(|a| a.id())
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}

/// Stable topological order per role. Dependencies on earlier roles are
/// already satisfied by the walk order.
fn order_analyzers(analyzers: Vec<Analyzer>) -> Result<Vec<Analyzer>, SetupError> {
    let roles: HashMap<String, AnalyzerRole> = analyzers
        .iter()
        .map(|a| (a.id().to_string(), a.role()))
        .collect();

    for analyzer in &analyzers {
        for dependency in analyzer.dependencies() {
            match roles.get(&dependency) {
                None => {
                    return Err(SetupError::UnknownDependency {
                        id: analyzer.id().to_string(),
                        dependency,
                    })
                }
                Some(role) if *role > analyzer.role() => {
                    return Err(SetupError::DependencyRunsLater {
                        id: analyzer.id().to_string(),
                        role: analyzer.role(),
                        dependency,
                        dependency_role: *role,
                    })
                }
                Some(_) => {}
            }
        }
    }

    let mut ordered = Vec::with_capacity(analyzers.len());
    let mut placed: HashSet<String> = HashSet::new();
    for role in [
        AnalyzerRole::Proposal,
        AnalyzerRole::BatchOperation,
        AnalyzerRole::Call,
        AnalyzerRole::Parameter,
    ] {
        let mut pending: Vec<&Analyzer> = analyzers.iter().filter(|a| a.role() == role).collect();
        while !pending.is_empty() {
            let ready = pending.iter().position(|a| {
                a.dependencies()
                    .iter()
                    .all(|d| placed.contains(d) || roles.get(d).is_some_and(|r| *r < role))
            });
            let Some(index) = ready else {
                return Err(SetupError::DependencyCycle {
                    role,
                    ids: pending.iter().map(|a| a.id().to_string()).collect(),
                });
            };
            let next = pending.remove(index);
            placed.insert(next.id().to_string());
            ordered.push(next.clone());
        }
    }
    Ok(ordered)
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// A decoded proposal together with the environment it was decoded against.
#[derive(Debug)]
pub struct PreparedRun {
    pub decoded: DecodedProposal,
    pub execution: ExecutionContext,
}

/// Runs the registered analyzers over decoded proposals.
///
/// # Thread Safety
/// The engine is immutable after construction; one instance can serve
/// concurrent runs.
pub struct Engine {
    proposal: Vec<Arc<dyn ProposalAnalyzer>>,
    batch_operation: Vec<Arc<dyn BatchOperationAnalyzer>>,
    call: Vec<Arc<dyn CallAnalyzer>>,
    parameter: Vec<Arc<dyn ParameterAnalyzer>>,
    decoder: ProposalDecoder,
    chains: Arc<dyn ChainNameResolver>,
}

impl Engine {
    pub fn new(
        registry: AnalyzerRegistry,
        decoder: ProposalDecoder,
        chains: Arc<dyn ChainNameResolver>,
    ) -> Result<Self, SetupError> {
        let mut engine = Self {
            proposal: Vec::new(),
            batch_operation: Vec::new(),
            call: Vec::new(),
            parameter: Vec::new(),
            decoder,
            chains,
        };
        for analyzer in order_analyzers(registry.analyzers)? {
            match analyzer {
                Analyzer::Proposal(a) => engine.proposal.push(a),
                Analyzer::BatchOperation(a) => engine.batch_operation.push(a),
                Analyzer::Call(a) => engine.call.push(a),
                Analyzer::Parameter(a) => engine.parameter.push(a),
            }
        }
        debug!(
            proposal = engine.proposal.len(),
            batch_operation = engine.batch_operation.len(),
            call = engine.call.len(),
            parameter = engine.parameter.len(),
            "analyzer engine ready"
        );
        Ok(engine)
    }

    pub fn decoder(&self) -> &ProposalDecoder {
        &self.decoder
    }

    /// IDs of one level's analyzers in execution order.
    pub fn analyzer_ids(&self, role: AnalyzerRole) -> Vec<&str> {
        match role {
            AnalyzerRole::Proposal => self.proposal.iter().map(|a| a.id()).collect(),
            AnalyzerRole::BatchOperation => self.batch_operation.iter().map(|a| a.id()).collect(),
            AnalyzerRole::Call => self.call.iter().map(|a| a.id()).collect(),
            AnalyzerRole::Parameter => self.parameter.iter().map(|a| a.id()).collect(),
        }
    }

    /// Load the environment scoped to the proposal's chains and decode it.
    ///
    /// Only an environment failure is fatal; calls that fail to decode stay
    /// in the tree as failed calls.
    pub async fn prepare<P>(
        &self,
        proposal: &P,
        loader: &dyn EnvironmentLoader,
    ) -> Result<PreparedRun, EngineError>
    where
        P: ProposalInput + Sync + ?Sized,
    {
        let selectors = proposal.chain_selectors();
        let environment = loader.load(&selectors).await?;
        let execution = ExecutionContext::new(environment, self.chains.clone());
        let decoded = self.decoder.decode_proposal(proposal, &execution.fields);
        info!(
            environment = %execution.environment.name,
            chains = selectors.len(),
            calls = decoded.call_count(),
            failed = decoded.failed_calls().count(),
            "proposal decoded"
        );
        Ok(PreparedRun { decoded, execution })
    }

    pub fn analyze<'a>(&self, run: &'a PreparedRun) -> AnalyzedProposal<'a> {
        self.analyze_decoded(&run.decoded, &run.execution)
    }

    /// Walk the decoded tree and collect every analyzer's annotations.
    pub fn analyze_decoded<'a>(
        &self,
        decoded: &'a DecodedProposal,
        execution: &'a ExecutionContext,
    ) -> AnalyzedProposal<'a> {
        let mut run = RunState::default();
        let root = AnalyzerContext::for_proposal(decoded, "proposal");
        let annotations = run_level(&mut run, execution, root, &self.proposal, decoded);

        let batch_operations = decoded
            .batch_operations
            .iter()
            .enumerate()
            .map(|(index, batch)| {
                self.analyze_batch(&mut run, execution, root, &annotations, index, batch)
            })
            .collect();

        AnalyzedProposal {
            decoded,
            execution,
            annotations,
            batch_operations,
            failures: run.failures,
        }
    }

    fn analyze_batch<'a>(
        &self,
        run: &mut RunState,
        execution: &ExecutionContext,
        parent: AnalyzerContext<'_>,
        proposal_annotations: &Annotations,
        index: usize,
        batch: &'a DecodedBatchOperation,
    ) -> AnalyzedBatchOperation<'a> {
        let path = format!("batch[{index}]");
        let ctx = parent.enter_batch_operation(batch, &path, proposal_annotations);
        let annotations = run_level(run, execution, ctx, &self.batch_operation, batch);

        let calls = batch
            .calls
            .iter()
            .enumerate()
            .map(|(i, call)| self.analyze_call(run, execution, ctx, &annotations, i, call))
            .collect();

        AnalyzedBatchOperation {
            decoded: batch,
            annotations,
            calls,
        }
    }

    fn analyze_call<'a>(
        &self,
        run: &mut RunState,
        execution: &ExecutionContext,
        parent: AnalyzerContext<'_>,
        batch_annotations: &Annotations,
        index: usize,
        call: &'a DecodedCall,
    ) -> AnalyzedCall<'a> {
        let path = format!("{}.call[{index}]", parent.path());
        let ctx = parent.enter_call(call, &path, batch_annotations);
        let annotations = run_level(run, execution, ctx, &self.call, call);

        let mut analyze_params = |kind: ParameterKind, params: &'a [NamedValue]| {
            params
                .iter()
                .map(|p| self.analyze_parameter(run, execution, ctx, &annotations, kind, p))
                .collect::<Vec<_>>()
        };
        let inputs = analyze_params(ParameterKind::Input, call.inputs.as_slice());
        let outputs = analyze_params(ParameterKind::Output, call.outputs.as_slice());

        AnalyzedCall {
            decoded: call,
            annotations,
            inputs,
            outputs,
        }
    }

    fn analyze_parameter<'a>(
        &self,
        run: &mut RunState,
        execution: &ExecutionContext,
        parent: AnalyzerContext<'_>,
        call_annotations: &Annotations,
        kind: ParameterKind,
        param: &'a NamedValue,
    ) -> AnalyzedParameter<'a> {
        let path = format!("{}.{kind}[{}]", parent.path(), param.name);
        let ctx = parent.enter_parameter(kind, &path, call_annotations);
        let annotations = run_level(run, execution, ctx, &self.parameter, param);
        AnalyzedParameter {
            decoded: param,
            kind,
            annotations,
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("proposal", &self.analyzer_ids(AnalyzerRole::Proposal))
            .field("batch_operation", &self.analyzer_ids(AnalyzerRole::BatchOperation))
            .field("call", &self.analyzer_ids(AnalyzerRole::Call))
            .field("parameter", &self.analyzer_ids(AnalyzerRole::Parameter))
            .finish_non_exhaustive()
    }
}

// ─── Traversal ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct RunState {
    failures: Vec<AnalyzerFailure>,
    cancelled: bool,
}

impl RunState {
    fn check_cancelled(&mut self, execution: &ExecutionContext, path: &str) -> bool {
        if !execution.cancellation.is_cancelled() {
            return false;
        }
        if !self.cancelled {
            self.cancelled = true;
            warn!(path, "analysis cancelled; remaining analyzers skipped");
            self.failures.push(AnalyzerFailure {
                analyzer_id: "engine".into(),
                path: path.to_string(),
                message: "run cancelled".into(),
            });
        }
        true
    }
}

/// One role's analyzer trait, seen uniformly by the walk.
trait LevelAnalyzer<N: ?Sized> {
    fn analyzer_id(&self) -> &str;
    fn applies(&self, ctx: &AnalyzerContext<'_>, node: &N) -> bool;
    fn run(
        &self,
        ctx: &AnalyzerContext<'_>,
        exec: &ExecutionContext,
        node: &N,
    ) -> Result<Vec<Annotation>, AnalyzerError>;
}

macro_rules! level_analyzer {
    ($role:ident, $node:ty) => {
        impl LevelAnalyzer<$node> for dyn $role {
            fn analyzer_id(&self) -> &str {
                crate::analyzer::BaseAnalyzer::id(self)
            }

            fn applies(&self, ctx: &AnalyzerContext<'_>, node: &$node) -> bool {
                $role::matches(self, ctx, node)
            }

            fn run(
                &self,
                ctx: &AnalyzerContext<'_>,
                exec: &ExecutionContext,
                node: &$node,
            ) -> Result<Vec<Annotation>, AnalyzerError> {
                $role::analyze(self, ctx, exec, node)
            }
        }
    };
}

level_analyzer!(ProposalAnalyzer, DecodedProposal);
level_analyzer!(BatchOperationAnalyzer, DecodedBatchOperation);
level_analyzer!(CallAnalyzer, DecodedCall);
level_analyzer!(ParameterAnalyzer, NamedValue);

/// Run one level's analyzers on one node. A failing analyzer is logged,
/// recorded and skipped.
fn run_level<N, A>(
    run: &mut RunState,
    execution: &ExecutionContext,
    ctx: AnalyzerContext<'_>,
    analyzers: &[Arc<A>],
    node: &N,
) -> Annotations
where
    N: ?Sized,
    A: LevelAnalyzer<N> + ?Sized,
{
    let mut annotations = Annotations::new();
    for analyzer in analyzers {
        if run.check_cancelled(execution, ctx.path()) {
            break;
        }
        let id = analyzer.analyzer_id();
        let scoped = ctx.with_node_annotations(&annotations);
        if !analyzer.applies(&scoped, node) {
            continue;
        }
        match analyzer.run(&scoped, execution, node) {
            Ok(found) => annotations.append(id, found),
            Err(err) => {
                warn!(analyzer = id, path = ctx.path(), error = %err, "analyzer failed; skipping");
                run.failures.push(AnalyzerFailure {
                    analyzer_id: id.to_string(),
                    path: ctx.path().to_string(),
                    message: err.to_string(),
                });
            }
        }
    }
    annotations
}
