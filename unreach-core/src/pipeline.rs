//! Orchestrates the full analysis: Symbol Joiner → Graph Builder →
//! Reachability Analyzer, given declarations already produced by the
//! syntax inventory and a connected index reader.

use tracing::instrument;

use crate::config::AnalysisConfig;
use crate::graph::{build_graph, CallGraph, MappingOutcome};
use crate::index::IndexReader;
use crate::joiner::{build_line_lookup, canonical_symbols_from_occurrences, join_declarations, JoinTrace};
use crate::reachability::{
    number_dead_symbols, prune_unused_properties, reachable_from_entry_points, rescue_pass, DeadSymbol,
};
use crate::types::{Declaration, HydratedDeclaration};

/// Everything produced by a full run, in the order the stages ran.
#[derive(Debug)]
pub struct AnalysisReport {
    pub hydrated: Vec<HydratedDeclaration>,
    pub join_traces: Vec<JoinTrace>,
    pub graph: CallGraph,
    pub mapping_log: Vec<MappingOutcome>,
    pub dead_symbols: Vec<DeadSymbol>,
}

impl AnalysisReport {
    #[must_use]
    pub fn mapped_via_a_count(&self) -> usize {
        self.mapping_log
            .iter()
            .filter(|o| matches!(o, MappingOutcome::MappedViaTierA { .. }))
            .count()
    }

    #[must_use]
    pub fn mapped_via_b_count(&self) -> usize {
        self.mapping_log
            .iter()
            .filter(|o| matches!(o, MappingOutcome::MappedViaTierB { .. }))
            .count()
    }

    #[must_use]
    pub fn unmapped_count(&self) -> usize {
        self.mapping_log
            .iter()
            .filter(|o| matches!(o, MappingOutcome::Unmapped { .. }))
            .count()
    }
}

/// Runs Stage 2 (Symbol Joiner) only, for `--dump-symbols` (§6: emit the
/// cross-view symbol dump and exit before graph building).
#[instrument(skip_all)]
pub fn join_only<R: IndexReader>(
    mut decls: Vec<Declaration>,
    index: &R,
    config: &AnalysisConfig,
) -> crate::error::Result<(Vec<HydratedDeclaration>, Vec<JoinTrace>)> {
    // Stage 1 parallel tasks produce unordered output; sort by (file,
    // start_line, start_column) before hydration so joiner tie-breaks are
    // reproducible across runs (§5 "Ordering guarantees").
    decls.sort_by(|a, b| {
        (
            &a.location.file,
            a.location.start_line,
            a.location.start_column,
        )
            .cmp(&(
                &b.location.file,
                b.location.start_line,
                b.location.start_column,
            ))
    });

    let mut all_occurrences = Vec::new();
    for decl in &decls {
        if let Ok(occurrences) = index.occurrences_in_file(&decl.location.file) {
            all_occurrences.extend(occurrences);
        }
    }
    let symbols = canonical_symbols_from_occurrences(&all_occurrences);
    let lookup = build_line_lookup(&symbols);

    Ok(join_declarations(decls, &lookup, &config.joiner))
}

/// Runs the full pipeline: join, build the graph, prune, sweep, rescue,
/// and number the result.
#[instrument(skip_all)]
pub fn run_analysis<R: IndexReader>(
    decls: Vec<Declaration>,
    index: &R,
    config: &AnalysisConfig,
) -> crate::error::Result<AnalysisReport> {
    let (hydrated, join_traces) = join_only(decls, index, config)?;

    let (graph, mapping_log) = build_graph(hydrated.clone(), index, &config.graph);

    let pruned_out_edges =
        prune_unused_properties(&graph, index, config.reachability.respect_public_api);
    let reachable = reachable_from_entry_points(&graph, &pruned_out_edges);
    let candidates = crate::reachability::select_candidates(&graph, &reachable);
    let surviving = rescue_pass(&graph, candidates, &reachable);
    let dead_symbols = number_dead_symbols(&graph, &surviving);

    Ok(AnalysisReport {
        hydrated,
        join_traces,
        graph,
        mapping_log,
        dead_symbols,
    })
}
