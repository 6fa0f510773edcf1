//! Renders the two stdout blocks (§6): the reference-mapping log and the
//! dead-code report.

use std::fmt::Write as _;

use unreach_core::graph::{CallGraph, MappingOutcome};
use unreach_core::reachability::DeadSymbol;

/// One line per processed reference occurrence. Always rendered in
/// reduced form (a trailing summary count) unless `verbose`, in which case
/// every occurrence gets its own `[MAPPED] via <A|B>` / `[UNMAPPED]` line.
#[must_use]
pub fn render_mapping_log(log: &[MappingOutcome], verbose: bool) -> String {
    let mut out = String::new();
    if verbose {
        for outcome in log {
            let line = match outcome {
                MappingOutcome::MappedViaTierA { caller, callee } => {
                    format!("[MAPPED] via A  {callee} <- {caller}")
                }
                MappingOutcome::MappedViaTierB { caller, callee } => {
                    format!("[MAPPED] via B  {callee} <- {caller}")
                }
                MappingOutcome::Unmapped { callee } => format!("[UNMAPPED] {callee}"),
            };
            let _ = writeln!(out, "{line}");
        }
    } else {
        let via_a = log
            .iter()
            .filter(|o| matches!(o, MappingOutcome::MappedViaTierA { .. }))
            .count();
        let via_b = log
            .iter()
            .filter(|o| matches!(o, MappingOutcome::MappedViaTierB { .. }))
            .count();
        let unmapped = log.iter().filter(|o| matches!(o, MappingOutcome::Unmapped { .. })).count();
        let _ = writeln!(
            out,
            "[MAPPED] via A: {via_a}   [MAPPED] via B: {via_b}   [UNMAPPED]: {unmapped}"
        );
    }
    out
}

/// The final dead-code report block (§6).
#[must_use]
pub fn render_dead_code_report(graph: &CallGraph, dead: &[DeadSymbol]) -> String {
    let mut out = String::new();
    if dead.is_empty() {
        out.push_str("✅ No unused symbols found.\n");
        return out;
    }

    let _ = writeln!(out, "❌ Found {} potentially unused symbols:", dead.len());
    let mut sorted: Vec<&DeadSymbol> = dead.iter().collect();
    sorted.sort_by(|a, b| a.number.cmp(&b.number));

    for symbol in sorted {
        let Some(hydrated) = graph.usr_to_decl.get(&symbol.usr) else {
            continue;
        };
        let decl = &hydrated.decl;
        let _ = writeln!(
            out,
            "<{}> {}:{}:{} -> {} [{:?}]",
            symbol.number,
            decl.location.file.display(),
            decl.location.start_line,
            decl.location.start_column,
            decl.name,
            decl.kind
        );
    }
    out
}
