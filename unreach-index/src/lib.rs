//! A concrete [`IndexReader`] backed by an on-disk JSON snapshot.
//!
//! This is a stand-in for a real compiler-produced index database: the
//! analysis core's contract (`occurrences_in_file`, `occurrences_of_usr`)
//! never requires more than this, and the rest of the pipeline depends
//! only on the trait, not on this snapshot format.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use unreach_core::index::{IndexReader, ReferenceOccurrence, Role, RoleFilter};
use unreach_core::types::Usr;

/// On-disk shape of an index snapshot: a flat list of every reference
/// occurrence the compiler index recorded for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub occurrences: Vec<ReferenceOccurrence>,
}

#[derive(Debug, thiserror::Error)]
pub enum JsonIndexError {
    #[error("failed to read index snapshot at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse index snapshot at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A fully in-memory index reader loaded once from `<store_path>/index.json`.
/// Occurrences are pre-grouped by file and by USR at load time so repeated
/// lookups during Stage 3 are cheap (§5: "no special caching is needed
/// beyond the per-file occurrence lists").
#[derive(Debug)]
pub struct JsonIndexStore {
    by_file: HashMap<PathBuf, Vec<ReferenceOccurrence>>,
    by_usr: HashMap<String, Vec<ReferenceOccurrence>>,
}

impl JsonIndexStore {
    /// Loads a snapshot from `<store_path>/index.json`.
    #[instrument]
    pub fn open(store_path: &Path) -> Result<Self, JsonIndexError> {
        let file_path = store_path.join("index.json");
        let text =
            std::fs::read_to_string(&file_path).map_err(|source| JsonIndexError::Read {
                path: file_path.display().to_string(),
                source,
            })?;
        let snapshot: IndexSnapshot =
            serde_json::from_str(&text).map_err(|source| JsonIndexError::Parse {
                path: file_path.display().to_string(),
                source,
            })?;
        info!(occurrence_count = snapshot.occurrences.len(), "loaded index snapshot");
        Ok(Self::from_snapshot(snapshot))
    }

    #[must_use]
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Self {
        let mut by_file: HashMap<PathBuf, Vec<ReferenceOccurrence>> = HashMap::new();
        let mut by_usr: HashMap<String, Vec<ReferenceOccurrence>> = HashMap::new();

        for occurrence in snapshot.occurrences {
            by_file
                .entry(occurrence.file.clone())
                .or_default()
                .push(occurrence.clone());
            by_usr
                .entry(occurrence.target_usr.0.clone())
                .or_default()
                .push(occurrence);
        }

        Self { by_file, by_usr }
    }
}

impl IndexReader for JsonIndexStore {
    type Error = JsonIndexError;

    fn occurrences_in_file(&self, path: &Path) -> Result<Vec<ReferenceOccurrence>, Self::Error> {
        Ok(self.by_file.get(path).cloned().unwrap_or_default())
    }

    fn occurrences_of_usr(
        &self,
        usr: &Usr,
        role_filter: RoleFilter,
    ) -> Result<Vec<ReferenceOccurrence>, Self::Error> {
        let all = self.by_usr.get(&usr.0).cloned().unwrap_or_default();
        Ok(match role_filter {
            RoleFilter::Any => all,
            RoleFilter::OnlyRole(role) => all.into_iter().filter(|o| o.has_role(role)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unreach_core::index::IndexSymbolKind;

    fn occurrence(usr: &str, file: &str, roles: Vec<Role>) -> ReferenceOccurrence {
        ReferenceOccurrence {
            target_usr: Usr(usr.to_string()),
            symbol_name: usr.to_string(),
            symbol_kind: IndexSymbolKind::Function,
            file: PathBuf::from(file),
            line: 1,
            column: 1,
            roles,
            relations: vec![],
        }
    }

    #[test]
    fn groups_occurrences_by_file_and_usr() {
        let snapshot = IndexSnapshot {
            occurrences: vec![
                occurrence("s:foo", "a.swift", vec![Role::Definition, Role::Canonical]),
                occurrence("s:foo", "b.swift", vec![Role::Reference]),
            ],
        };
        let store = JsonIndexStore::from_snapshot(snapshot);

        let in_a = store.occurrences_in_file(&PathBuf::from("a.swift")).unwrap();
        assert_eq!(in_a.len(), 1);

        let of_foo = store
            .occurrences_of_usr(&Usr("s:foo".into()), RoleFilter::Any)
            .unwrap();
        assert_eq!(of_foo.len(), 2);

        let refs_only = store
            .occurrences_of_usr(&Usr("s:foo".into()), RoleFilter::OnlyRole(Role::Reference))
            .unwrap();
        assert_eq!(refs_only.len(), 1);
    }

    #[test]
    fn unknown_file_and_usr_return_empty() {
        let store = JsonIndexStore::from_snapshot(IndexSnapshot { occurrences: vec![] });
        assert!(store
            .occurrences_in_file(&PathBuf::from("nowhere.swift"))
            .unwrap()
            .is_empty());
        assert!(store
            .occurrences_of_usr(&Usr("s:nowhere".into()), RoleFilter::Any)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn open_reports_read_error_for_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonIndexStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, JsonIndexError::Read { .. }));
    }

    #[test]
    fn open_loads_a_written_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = IndexSnapshot {
            occurrences: vec![occurrence("s:foo", "a.swift", vec![Role::Reference])],
        };
        std::fs::write(
            dir.path().join("index.json"),
            serde_json::to_string(&snapshot).unwrap(),
        )
        .unwrap();

        let store = JsonIndexStore::open(dir.path()).unwrap();
        assert_eq!(
            store
                .occurrences_in_file(&PathBuf::from("a.swift"))
                .unwrap()
                .len(),
            1
        );
    }
}
