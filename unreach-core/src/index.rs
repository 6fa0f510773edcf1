//! The semantic view: canonical symbol occurrences read from a pre-built
//! compiler index. The index itself is an external collaborator (§6); this
//! module defines the query shape the rest of the pipeline depends on.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::Usr;

/// A single role a reference occurrence can carry. An occurrence typically
/// carries several at once (e.g. a definition site is both `Definition`
/// and `Canonical`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Definition,
    Canonical,
    Reference,
    CalledBy,
    ContainedBy,
    AccessorOf,
    OverrideOf,
}

/// A named relation from an occurrence to another symbol, e.g.
/// `(CalledBy, <usr of enclosing function>)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub role: Role,
    pub related_usr: Usr,
}

/// One occurrence of a symbol in source, as reported by the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOccurrence {
    pub target_usr: Usr,
    pub symbol_name: String,
    pub symbol_kind: IndexSymbolKind,
    pub file: std::path::PathBuf,
    pub line: u32,
    pub column: u32,
    pub roles: Vec<Role>,
    pub relations: Vec<Relation>,
}

impl ReferenceOccurrence {
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    #[must_use]
    pub fn is_canonical_definition(&self) -> bool {
        self.has_role(Role::Definition) && self.has_role(Role::Canonical)
    }

    /// The first relation matching `role`, if any — used by Tier A's
    /// symbolic-ascent seed selection (`calledBy` then `containedBy`).
    #[must_use]
    pub fn first_with_role(&self, role: Role) -> Option<&Usr> {
        self.relations
            .iter()
            .find(|r| r.role == role)
            .map(|r| &r.related_usr)
    }
}

/// The index's own notion of symbol kind, distinct from `DeclKind` — the
/// joiner bridges between the two (see `crate::joiner::KindBridge`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexSymbolKind {
    Struct,
    Class,
    Enum,
    Constructor,
    Function,
    InstanceMethod,
    StaticMethod,
    Variable,
    InstanceProperty,
    StaticProperty,
}

/// A canonical-definition record as stored by the index's per-line lookup
/// table (spec §4.2: "canonical-definition `ReferenceOccurrence`s per file").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSymbol {
    pub usr: Usr,
    pub name: String,
    pub kind: IndexSymbolKind,
    pub line: u32,
    pub column: u32,
}

impl IndexSymbol {
    #[must_use]
    pub fn from_definition_occurrence(occ: &ReferenceOccurrence) -> Self {
        Self {
            usr: occ.target_usr.clone(),
            name: occ.symbol_name.clone(),
            kind: occ.symbol_kind,
            line: occ.line,
            column: occ.column,
        }
    }
}

/// Filter applied to `occurrences_of_usr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFilter {
    Any,
    OnlyRole(Role),
}

/// The compiler index reader contract (spec §6 "Index interface"). A
/// concrete implementation lives outside this crate (`unreach-index`); the
/// core pipeline depends only on this trait so it can be driven by fixtures
/// in tests.
pub trait IndexReader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All reference occurrences recorded for `path`, in no guaranteed order.
    fn occurrences_in_file(&self, path: &Path) -> Result<Vec<ReferenceOccurrence>, Self::Error>;

    /// All reference occurrences whose `target_usr` equals `usr`, optionally
    /// restricted to occurrences carrying a given role.
    fn occurrences_of_usr(
        &self,
        usr: &Usr,
        role_filter: RoleFilter,
    ) -> Result<Vec<ReferenceOccurrence>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(roles: Vec<Role>) -> ReferenceOccurrence {
        ReferenceOccurrence {
            target_usr: Usr("s:foo".into()),
            symbol_name: "foo".into(),
            symbol_kind: IndexSymbolKind::Function,
            file: "a.swift".into(),
            line: 1,
            column: 1,
            roles,
            relations: vec![],
        }
    }

    #[test]
    fn canonical_definition_requires_both_roles() {
        assert!(occ(vec![Role::Definition, Role::Canonical]).is_canonical_definition());
        assert!(!occ(vec![Role::Definition]).is_canonical_definition());
        assert!(!occ(vec![Role::Canonical]).is_canonical_definition());
    }

    #[test]
    fn first_with_role_prefers_calledby_seed_order() {
        let mut o = occ(vec![Role::Reference]);
        o.relations.push(Relation {
            role: Role::ContainedBy,
            related_usr: Usr("s:container".into()),
        });
        o.relations.push(Relation {
            role: Role::CalledBy,
            related_usr: Usr("s:caller".into()),
        });
        assert_eq!(
            o.first_with_role(Role::CalledBy),
            Some(&Usr("s:caller".into()))
        );
        assert_eq!(
            o.first_with_role(Role::ContainedBy),
            Some(&Usr("s:container".into()))
        );
    }
}
