//! Geometric containment index (§3 `geometric_index`, §4.3 Tier B).
//!
//! Built once per file from hydrated declarations: sorted by `start_line`
//! ascending, then by shorter range first, so tighter scopes win ties when
//! walking the list to find the innermost containing declaration.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::types::{HydratedDeclaration, Usr};

#[derive(Debug, Clone)]
struct Entry {
    start_line: u32,
    end_line: u32,
    usr: Usr,
}

/// Per-file sorted interval lists, queried by Tier B caller attribution.
#[derive(Debug, Default)]
pub struct GeometricIndex {
    by_file: HashMap<PathBuf, Vec<Entry>>,
}

impl GeometricIndex {
    #[must_use]
    pub fn build(decls: &[HydratedDeclaration]) -> Self {
        let mut by_file: HashMap<PathBuf, Vec<Entry>> = HashMap::new();
        for hd in decls {
            let Some(usr) = &hd.usr else { continue };
            by_file
                .entry(hd.decl.location.file.clone())
                .or_default()
                .push(Entry {
                    start_line: hd.decl.location.start_line,
                    end_line: hd.decl.location.end_line,
                    usr: usr.clone(),
                });
        }
        for entries in by_file.values_mut() {
            entries.sort_by_key(|e| (e.start_line, e.end_line.saturating_sub(e.start_line)));
        }
        Self { by_file }
    }

    /// The innermost declaration containing `line` in `file` — the entry
    /// among those whose range contains `line` with the largest
    /// `start_line` (§4.3 Tier B).
    #[must_use]
    pub fn innermost_containing(&self, file: &std::path::Path, line: u32) -> Option<&Usr> {
        let entries = self.by_file.get(file)?;
        entries
            .iter()
            .filter(|e| line >= e.start_line && line <= e.end_line)
            .max_by_key(|e| e.start_line)
            .map(|e| &e.usr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessLevel, DeclId, DeclKind, Declaration, SourceLocation};

    fn hydrated(usr: &str, start: u32, end: u32) -> HydratedDeclaration {
        HydratedDeclaration {
            decl: Declaration {
                id: DeclId(0),
                name: usr.to_string(),
                kind: DeclKind::Function,
                location: SourceLocation {
                    file: PathBuf::from("a.swift"),
                    start_line: start,
                    start_column: 1,
                    end_line: end,
                    end_column: 1,
                },
                access: AccessLevel::Internal,
                declared_type: None,
                entry_point_reasons: vec![],
            },
            usr: Some(Usr(usr.to_string())),
        }
    }

    #[test]
    fn picks_innermost_scope_by_largest_start_line() {
        let index = GeometricIndex::build(&[hydrated("outer", 1, 100), hydrated("inner", 10, 20)]);
        let result = index.innermost_containing(&PathBuf::from("a.swift"), 15);
        assert_eq!(result, Some(&Usr("inner".into())));
    }

    #[test]
    fn single_line_declaration_is_selectable() {
        let index = GeometricIndex::build(&[hydrated("one_liner", 5, 5)]);
        let result = index.innermost_containing(&PathBuf::from("a.swift"), 5);
        assert_eq!(result, Some(&Usr("one_liner".into())));
    }

    #[test]
    fn unknown_file_returns_none() {
        let index = GeometricIndex::build(&[hydrated("outer", 1, 100)]);
        assert_eq!(
            index.innermost_containing(&PathBuf::from("unknown.swift"), 5),
            None
        );
    }

    #[test]
    fn line_outside_every_range_returns_none() {
        let index = GeometricIndex::build(&[hydrated("outer", 10, 20)]);
        assert_eq!(index.innermost_containing(&PathBuf::from("a.swift"), 30), None);
    }
}
