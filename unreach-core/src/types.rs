//! Core data model: source locations, declarations, and canonical symbol identity.
//!
//! Everything here is produced once per analysis run and is immutable
//! thereafter. `Declaration` is emitted by the Syntax Inventory;
//! `HydratedDeclaration` is produced by the Symbol Joiner and carries the
//! canonical USR the rest of the pipeline speaks in.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ── Source locations ───────────────────────────────────────────────────

/// A location within a source file. Columns are 1-based UTF-8 byte offsets
/// within their line, not code-point columns, so they align with
/// index-reported locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceLocation {
    #[must_use]
    pub fn single_line(file: PathBuf, line: u32, start_column: u32, end_column: u32) -> Self {
        Self {
            file,
            start_line: line,
            start_column,
            end_line: line,
            end_column,
        }
    }

    /// Number of lines the range spans, used to break geometric ties:
    /// tighter scopes win over looser ones that also contain a line.
    #[must_use]
    pub fn line_span(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line)
    }

    #[must_use]
    pub fn contains_line(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line
    }
}

// ── Declaration kinds and access levels ────────────────────────────────

/// What kind of declaration this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Struct,
    Class,
    Enum,
    Function,
    Initializer,
    Variable,
    Property,
}

impl DeclKind {
    #[must_use]
    pub fn is_type(self) -> bool {
        matches!(self, Self::Struct | Self::Class | Self::Enum)
    }

    #[must_use]
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Initializer)
    }
}

/// Access level, ordered from most to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Private,
    FilePrivate,
    Internal,
    Public,
    Open,
}

impl Default for AccessLevel {
    fn default() -> Self {
        Self::Internal
    }
}

impl AccessLevel {
    #[must_use]
    pub fn is_private_or_fileprivate(self) -> bool {
        matches!(self, Self::Private | Self::FilePrivate)
    }

    #[must_use]
    pub fn is_public_or_open(self) -> bool {
        matches!(self, Self::Public | Self::Open)
    }
}

/// Reasons a declaration is assumed reachable by external code or framework
/// machinery. These accumulate — a declaration carries every reason that
/// applies, not just the first one found, so diagnostics can explain why
/// something was treated as an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPointReason {
    /// Inherits from a configured framework root (UI view base, CLI
    /// parsable-command, test-case base, serialization-codable, ...).
    FrameworkRoot,
    /// Carries a `main`-style attribute.
    MainAttribute,
    /// Overrides a supertype method.
    Override,
    /// Non-private method or initializer on a class.
    NonPrivateClassMember,
    /// Initializer is public, or its enclosing type carries a persistence macro.
    PersistedInitializer,
    /// Matches a configured lifecycle or representable-protocol method name.
    LifecycleMethod,
    /// Named `run` inside a CLI-command-conforming type.
    CommandEntryPoint,
    /// Test-prefixed name in a file whose path contains "test".
    TestMethod,
    /// A `body` computed variable inside a UI view/app conforming type.
    ViewBody,
    /// Carries the public (or open) modifier anywhere.
    PublicModifier,
}

/// A declaration discovered by the Syntax Inventory.
///
/// Immutable once constructed. `name` is a dot-joined path of enclosing
/// type names ending in the base name (e.g. `Outer.Inner.foo`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub id: DeclId,
    pub name: String,
    pub kind: DeclKind,
    pub location: SourceLocation,
    pub access: AccessLevel,
    /// Syntactic type name string for stored properties (best effort,
    /// used only to locate the type's own declaration for pruning).
    pub declared_type: Option<String>,
    pub entry_point_reasons: Vec<EntryPointReason>,
}

impl Declaration {
    #[must_use]
    pub fn is_entry_point(&self) -> bool {
        !self.entry_point_reasons.is_empty()
    }

    /// The last dot-segment of `name` — the declaration's base (unqualified) name.
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// The dot-path of the immediately enclosing type, if any.
    #[must_use]
    pub fn enclosing_type_path(&self) -> Option<&str> {
        self.name.rfind('.').map(|idx| &self.name[..idx])
    }
}

/// Opaque, per-run stable id for a `Declaration`. Not meaningful across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclId(pub u32);

// ── Canonical symbol identity ──────────────────────────────────────────

/// A unique, stable, opaque compiler-index identifier for a symbol (USR).
/// Kept as an opaque string — never parsed or transformed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Usr(pub String);

impl std::fmt::Display for Usr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `Declaration` paired with its canonical USR, produced by the Symbol
/// Joiner. Declarations the joiner could not match are kept as
/// `HydratedDeclaration { usr: None, .. }` — they cannot be graph edge
/// endpoints but are still reported as join misses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydratedDeclaration {
    pub decl: Declaration,
    pub usr: Option<Usr>,
}

impl HydratedDeclaration {
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.usr.is_some()
    }
}
