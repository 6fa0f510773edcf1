//! Fixture builders for end-to-end analysis tests. Each fixture hand-builds
//! the two views the real pipeline joins — `Declaration`s as a parser would
//! emit them, and `ReferenceOccurrence`s as a compiler index would — so
//! tests exercise the full join → graph → reachability path without
//! depending on a real Swift toolchain.

use std::path::{Path, PathBuf};

use unreach_core::config::AnalysisConfig;
use unreach_core::index::{IndexSymbolKind, ReferenceOccurrence, Relation, Role};
use unreach_core::pipeline::{run_analysis, AnalysisReport};
use unreach_core::types::{AccessLevel, DeclId, DeclKind, Declaration, EntryPointReason, SourceLocation, Usr};
use unreach_index::{IndexSnapshot, JsonIndexStore};

/// Builds a `Declaration` with a single-line location. Most fixture
/// declarations only need a start line; callers that care about ranges use
/// [`decl_range`].
#[must_use]
pub fn decl(name: &str, kind: DeclKind, file: &str, line: u32, entry_reasons: Vec<EntryPointReason>) -> Declaration {
    Declaration {
        id: DeclId(0),
        name: name.to_string(),
        kind,
        location: SourceLocation::single_line(PathBuf::from(file), line, 1, 1),
        access: AccessLevel::Internal,
        declared_type: None,
        entry_point_reasons: entry_reasons,
    }
}

/// Builds a `Declaration` spanning `[start_line, end_line]`, for containers.
#[must_use]
pub fn decl_range(name: &str, kind: DeclKind, file: &str, start_line: u32, end_line: u32) -> Declaration {
    Declaration {
        id: DeclId(0),
        name: name.to_string(),
        kind,
        location: SourceLocation {
            file: PathBuf::from(file),
            start_line,
            start_column: 1,
            end_line,
            end_column: 1,
        },
        access: AccessLevel::Internal,
        declared_type: None,
        entry_point_reasons: vec![],
    }
}

/// A container declaration spanning `[start_line, end_line]` that is
/// itself an entry point (e.g. a public type whose reachable method makes
/// it externally constructible).
#[must_use]
pub fn decl_range_entry(
    name: &str,
    kind: DeclKind,
    file: &str,
    start_line: u32,
    end_line: u32,
    entry_reasons: Vec<EntryPointReason>,
) -> Declaration {
    Declaration {
        id: DeclId(0),
        name: name.to_string(),
        kind,
        location: SourceLocation {
            file: PathBuf::from(file),
            start_line,
            start_column: 1,
            end_line,
            end_column: 1,
        },
        access: AccessLevel::Public,
        declared_type: None,
        entry_point_reasons: entry_reasons,
    }
}

/// A stored property declaration, carrying a `declared_type` for pruning.
#[must_use]
pub fn property_decl(name: &str, file: &str, line: u32, declared_type: &str, access: AccessLevel) -> Declaration {
    Declaration {
        id: DeclId(0),
        name: name.to_string(),
        kind: DeclKind::Property,
        location: SourceLocation::single_line(PathBuf::from(file), line, 1, 1),
        access,
        declared_type: Some(declared_type.to_string()),
        entry_point_reasons: vec![],
    }
}

/// Builds a canonical-definition `ReferenceOccurrence` for `usr` at
/// `(file, line)`, matching what the joiner expects to find in its
/// per-line lookup.
#[must_use]
pub fn definition(usr: &str, name: &str, kind: IndexSymbolKind, file: &str, line: u32) -> ReferenceOccurrence {
    ReferenceOccurrence {
        target_usr: Usr(usr.to_string()),
        symbol_name: name.to_string(),
        symbol_kind: kind,
        file: PathBuf::from(file),
        line,
        column: 1,
        roles: vec![Role::Definition, Role::Canonical],
        relations: vec![],
    }
}

/// Builds a `Reference` occurrence of `usr`, optionally carrying
/// `calledBy`/`containedBy` relations for Tier-A attribution.
#[must_use]
pub fn reference(usr: &str, file: &str, line: u32, relations: Vec<Relation>) -> ReferenceOccurrence {
    ReferenceOccurrence {
        target_usr: Usr(usr.to_string()),
        symbol_name: usr.to_string(),
        symbol_kind: IndexSymbolKind::Function,
        file: PathBuf::from(file),
        line,
        column: 1,
        roles: vec![Role::Reference],
        relations,
    }
}

#[must_use]
pub fn called_by(usr: &str) -> Relation {
    Relation {
        role: Role::CalledBy,
        related_usr: Usr(usr.to_string()),
    }
}

/// An on-disk index snapshot plus the `JsonIndexStore` opened against it,
/// kept alive for the duration of a test.
pub struct Fixture {
    _dir: tempfile::TempDir,
    index: JsonIndexStore,
}

impl Fixture {
    /// Writes `occurrences` to a fresh temp directory as `index.json` and
    /// opens it through the real `unreach-index` loader — the same code
    /// path the CLI uses.
    #[must_use]
    pub fn new(occurrences: Vec<ReferenceOccurrence>) -> Self {
        let dir = tempfile::tempdir().expect("create tempdir");
        let snapshot = IndexSnapshot { occurrences };
        std::fs::write(
            dir.path().join("index.json"),
            serde_json::to_string(&snapshot).expect("serialize snapshot"),
        )
        .expect("write snapshot");
        let index = JsonIndexStore::open(dir.path()).expect("open snapshot");
        Self { _dir: dir, index }
    }

    pub fn store_path(&self) -> &Path {
        self._dir.path()
    }

    /// Runs the full pipeline against this fixture's index.
    pub fn run(&self, decls: Vec<Declaration>, config: &AnalysisConfig) -> anyhow::Result<AnalysisReport> {
        Ok(run_analysis(decls, &self.index, config)?)
    }
}
