//! Symbol Joiner (§4.2): assigns each `Declaration` its canonical USR so
//! later stages speak one identifier language.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{info, instrument};

use crate::config::JoinerSection;
use crate::index::IndexSymbol;
use crate::types::{Declaration, DeclKind, HydratedDeclaration, Usr};

/// `lookup[file][line]` — canonical-definition symbols seen at that line,
/// built once from the index before joining begins.
pub type LineLookup = HashMap<PathBuf, HashMap<u32, Vec<IndexSymbol>>>;

#[must_use]
pub fn build_line_lookup(symbols: &[(PathBuf, IndexSymbol)]) -> LineLookup {
    let mut lookup: LineLookup = HashMap::new();
    for (file, symbol) in symbols {
        lookup
            .entry(file.clone())
            .or_default()
            .entry(symbol.line)
            .or_default()
            .push(symbol.clone());
    }
    lookup
}

/// One scored candidate considered for a declaration, retained for
/// `--debug-usr` diagnostics.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub usr: Usr,
    pub name: String,
    pub score: i32,
}

/// Full join trace for a single declaration, used by `--debug-usr`.
#[derive(Debug, Clone)]
pub struct JoinTrace {
    pub decl_name: String,
    pub exact_line_candidates: Vec<ScoredCandidate>,
    pub fuzzy_candidates: Vec<ScoredCandidate>,
    pub winner: Option<Usr>,
    pub used_fuzzy: bool,
}

/// Joins every `Declaration` against the index's per-line symbol lookup,
/// producing `HydratedDeclaration`s in the same order as the input.
#[instrument(skip_all, fields(decl_count = decls.len()))]
pub fn join_declarations(
    decls: Vec<Declaration>,
    lookup: &LineLookup,
    config: &JoinerSection,
) -> (Vec<HydratedDeclaration>, Vec<JoinTrace>) {
    let mut hydrated = Vec::with_capacity(decls.len());
    let mut traces = Vec::with_capacity(decls.len());

    for decl in decls {
        let (usr, trace) = join_one(&decl, lookup, config);
        if usr.is_none() {
            info!(name = %decl.name, file = %decl.location.file.display(), "join miss: no hydrated USR");
        }
        traces.push(trace);
        hydrated.push(HydratedDeclaration { decl, usr });
    }

    (hydrated, traces)
}

fn join_one(decl: &Declaration, lookup: &LineLookup, config: &JoinerSection) -> (Option<Usr>, JoinTrace) {
    let empty: Vec<IndexSymbol> = Vec::new();
    let file_lookup = lookup.get(&decl.location.file);

    let exact_pool: &[IndexSymbol] = file_lookup
        .and_then(|by_line| by_line.get(&decl.location.start_line))
        .map_or(empty.as_slice(), Vec::as_slice);

    let exact_scored = score_candidates(decl, exact_pool, config);
    let exact_winner = pick_winner(&exact_scored);

    if let Some(winner) = exact_winner {
        let trace = JoinTrace {
            decl_name: decl.name.clone(),
            exact_line_candidates: exact_scored,
            fuzzy_candidates: Vec::new(),
            winner: Some(winner.clone()),
            used_fuzzy: false,
        };
        return (Some(winner), trace);
    }

    let fuzzy_pool = collect_fuzzy_pool(decl, file_lookup, config.fuzzy_window_lines);
    let fuzzy_scored = score_candidates(decl, &fuzzy_pool, config);
    let fuzzy_winner = pick_winner(&fuzzy_scored);

    let trace = JoinTrace {
        decl_name: decl.name.clone(),
        exact_line_candidates: exact_scored,
        fuzzy_candidates: fuzzy_scored,
        winner: fuzzy_winner.clone(),
        used_fuzzy: true,
    };
    (fuzzy_winner, trace)
}

fn collect_fuzzy_pool(
    decl: &Declaration,
    file_lookup: Option<&HashMap<u32, Vec<IndexSymbol>>>,
    window: u32,
) -> Vec<IndexSymbol> {
    let Some(by_line) = file_lookup else {
        return Vec::new();
    };
    let lo = decl.location.start_line.saturating_sub(window);
    let hi = decl.location.end_line.saturating_add(window);
    let mut pool = Vec::new();
    for line in lo..=hi {
        if let Some(symbols) = by_line.get(&line) {
            pool.extend(symbols.iter().cloned());
        }
    }
    pool
}

/// Scores every candidate against `decl`, discarding kind-incompatible ones
/// (§4.2 step 2: kind compatibility is required to be a candidate at all).
fn score_candidates(
    decl: &Declaration,
    pool: &[IndexSymbol],
    config: &JoinerSection,
) -> Vec<ScoredCandidate> {
    let base_name = decl.base_name();
    pool.iter()
        .filter(|c| kind_compatible(decl.kind, c.kind, &config.kind_bridge))
        .map(|c| {
            let mut score = config.kind_match_score;
            if paren_prefix(&c.name) == base_name {
                score += config.name_match_score;
            }
            score -= i32::try_from(c.usr.0.len()).unwrap_or(i32::MAX);
            ScoredCandidate {
                usr: c.usr.clone(),
                name: c.name.clone(),
                score,
            }
        })
        .collect()
}

/// The portion of an index symbol name before any parenthesized parameter
/// list, used for base-name comparison (e.g. `foo(bar:)` → `foo`).
fn paren_prefix(name: &str) -> &str {
    name.split('(').next().unwrap_or(name)
}

fn kind_compatible(
    decl_kind: DeclKind,
    index_kind: crate::index::IndexSymbolKind,
    bridge: &[crate::config::KindBridgeRow],
) -> bool {
    bridge
        .iter()
        .any(|row| row.decl_kind == decl_kind && row.index_kinds.contains(&index_kind))
}

/// Highest-scoring candidate with score > 0; ties resolved by stable
/// iteration order (§4.2 step 4 — the first maximal element in `pool`).
fn pick_winner(scored: &[ScoredCandidate]) -> Option<Usr> {
    scored
        .iter()
        .filter(|c| c.score > 0)
        .max_by_key(|c| c.score)
        .map(|c| c.usr.clone())
}

/// Collapses every canonical-definition occurrence reported by the index
/// into `(file, IndexSymbol)` pairs ready for [`build_line_lookup`].
pub fn canonical_symbols_from_occurrences(
    occurrences: &[crate::index::ReferenceOccurrence],
) -> Vec<(PathBuf, IndexSymbol)> {
    occurrences
        .iter()
        .filter(|o| o.is_canonical_definition())
        .map(|o| (o.file.clone(), IndexSymbol::from_definition_occurrence(o)))
        .collect()
}
