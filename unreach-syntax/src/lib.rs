//! Syntax Inventory — a tree-sitter-based walker that emits `Declaration`
//! records per file, parsed in parallel across the source tree and joined
//! before hydration begins.

pub mod swift;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rayon::prelude::*;
use tracing::{instrument, warn};

use unreach_core::config::EntryPointsSection;
use unreach_core::error::SyntaxError;
use unreach_core::types::Declaration;

/// A guarded append-only collector shared across Stage 1's parallel parse
/// tasks. `append_many` is the only mutating operation and is atomic with
/// respect to other callers; nothing reads the contents until every writer
/// has finished.
#[derive(Debug, Default)]
struct AppendOnlyCollector {
    items: Mutex<Vec<Declaration>>,
}

impl AppendOnlyCollector {
    fn append_many(&self, items: Vec<Declaration>) {
        self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner).extend(items);
    }

    fn into_inner(self) -> Vec<Declaration> {
        self.items.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Parses every file in `paths` in parallel (one task per file), returning
/// the combined declarations and the per-file parse failures. A failing
/// file is logged and skipped; it never aborts the other tasks (§4.1
/// "Failure").
#[instrument(skip_all, fields(file_count = paths.len()))]
pub fn parse_files_parallel(
    paths: &[PathBuf],
    entry_points: &EntryPointsSection,
) -> (Vec<Declaration>, Vec<SyntaxError>) {
    let collector = AppendOnlyCollector::default();
    let failures: Vec<SyntaxError> = paths
        .par_iter()
        .filter_map(|path| match swift::parse_file(path, entry_points) {
            Ok(decls) => {
                collector.append_many(decls);
                None
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err.message, "parse failure, skipping file");
                Some(err)
            }
        })
        .collect();

    (collector.into_inner(), failures)
}

/// Parses a single file. Exposed for callers (tests, `--dump-symbols`
/// single-file mode) that don't need the parallel fan-out.
pub fn parse_file(path: &Path, entry_points: &EntryPointsSection) -> Result<Vec<Declaration>, SyntaxError> {
    swift::parse_file(path, entry_points)
}
