//! Graph Builder (§4.3): builds the directed reference graph over USRs.
//!
//! For every reference occurrence of every hydrated USR, attributes it to
//! the single enclosing hydrated declaration ("caller") via two-tier
//! attribution and records `caller → callee`.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{instrument, trace, warn};

use crate::config::GraphSection;
use crate::geometric::GeometricIndex;
use crate::index::{IndexReader, Role, RoleFilter};
use crate::types::{HydratedDeclaration, Usr};

/// Outcome of attributing a single reference occurrence to a caller,
/// retained for the mapping log (§4.3 "Output", §8 "Round-trip").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingOutcome {
    MappedViaTierA { caller: Usr, callee: Usr },
    MappedViaTierB { caller: Usr, callee: Usr },
    Unmapped { callee: Usr },
}

impl MappingOutcome {
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        !matches!(self, Self::Unmapped { .. })
    }
}

/// The directed reference graph over USRs (§3 `CallGraph`), owned by the
/// reachability stage.
#[derive(Debug)]
pub struct CallGraph {
    pub usr_to_decl: HashMap<Usr, HydratedDeclaration>,
    pub out_edges: HashMap<Usr, HashSet<Usr>>,
    pub in_edges: HashMap<Usr, HashSet<Usr>>,
    pub graph: DiGraph<Usr, ()>,
    pub usr_to_index: HashMap<Usr, NodeIndex>,
    pub index_to_usr: HashMap<NodeIndex, Usr>,
}

impl CallGraph {
    fn empty(decls: Vec<HydratedDeclaration>) -> Self {
        let mut usr_to_decl = HashMap::new();
        let mut graph = DiGraph::<Usr, ()>::new();
        let mut usr_to_index = HashMap::new();
        let mut index_to_usr = HashMap::new();

        for hd in decls {
            let Some(usr) = hd.usr.clone() else { continue };
            // §3 invariant: the first-encountered declaration wins a USR
            // collision (e.g. a type merged with its extension); log it.
            if usr_to_decl.contains_key(&usr) {
                trace!(usr = %usr, name = %hd.decl.name, "USR collision, first declaration kept");
                continue;
            }
            let idx = graph.add_node(usr.clone());
            usr_to_index.insert(usr.clone(), idx);
            index_to_usr.insert(idx, usr.clone());
            usr_to_decl.insert(usr, hd);
        }

        Self {
            usr_to_decl,
            out_edges: HashMap::new(),
            in_edges: HashMap::new(),
            graph,
            usr_to_index,
            index_to_usr,
        }
    }

    fn add_edge(&mut self, caller: &Usr, callee: &Usr) {
        if caller == callee {
            return; // self-edges filtered, §3 invariant
        }
        if self
            .out_edges
            .get(caller)
            .is_some_and(|set| set.contains(callee))
        {
            return;
        }
        self.out_edges
            .entry(caller.clone())
            .or_default()
            .insert(callee.clone());
        self.in_edges
            .entry(callee.clone())
            .or_default()
            .insert(caller.clone());
        if let (Some(&src), Some(&dst)) =
            (self.usr_to_index.get(caller), self.usr_to_index.get(callee))
        {
            self.graph.add_edge(src, dst, ());
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Builds the `CallGraph` from hydrated declarations and the index,
/// returning the graph plus the full mapping log for reporting.
#[instrument(skip_all, fields(decl_count = decls.len()))]
pub fn build_graph<R: IndexReader>(
    decls: Vec<HydratedDeclaration>,
    index: &R,
    config: &GraphSection,
) -> (CallGraph, Vec<MappingOutcome>) {
    let geometric = GeometricIndex::build(&decls);
    let mut graph = CallGraph::empty(decls);
    let mut log = Vec::new();

    let callees: Vec<Usr> = graph.usr_to_decl.keys().cloned().collect();
    for callee in callees {
        let occurrences = match index.occurrences_of_usr(&callee, RoleFilter::OnlyRole(Role::Reference)) {
            Ok(occs) => occs,
            Err(err) => {
                warn!(usr = %callee, error = %err, "index lookup failed for USR, skipping");
                continue;
            }
        };

        for occurrence in occurrences {
            let outcome = attribute_caller(&occurrence, &graph, &geometric, index, config);
            match &outcome {
                MappingOutcome::MappedViaTierA { caller, callee }
                | MappingOutcome::MappedViaTierB { caller, callee } => {
                    graph.add_edge(caller, callee);
                }
                MappingOutcome::Unmapped { callee } => {
                    trace!(usr = %callee, file = %occurrence.file.display(), line = occurrence.line, "unmapped reference dropped");
                }
            }
            log.push(outcome);
        }
    }

    (graph, log)
}

fn attribute_caller<R: IndexReader>(
    occurrence: &crate::index::ReferenceOccurrence,
    graph: &CallGraph,
    geometric: &GeometricIndex,
    index: &R,
    config: &GraphSection,
) -> MappingOutcome {
    if let Some(caller) = tier_a_ascend(occurrence, graph, index, config.tier_a_hop_budget) {
        return MappingOutcome::MappedViaTierA {
            caller,
            callee: occurrence.target_usr.clone(),
        };
    }

    if let Some(caller) = geometric.innermost_containing(&occurrence.file, occurrence.line) {
        return MappingOutcome::MappedViaTierB {
            caller: caller.clone(),
            callee: occurrence.target_usr.clone(),
        };
    }

    MappingOutcome::Unmapped {
        callee: occurrence.target_usr.clone(),
    }
}

/// Tier A — symbolic ascent (§4.3). Seeds from the occurrence's own
/// `calledBy` relation, falling back to `containedBy`; then repeatedly
/// looks up the definition occurrence of the current seed and follows
/// *its* `containedBy` relation, up to `hop_budget` hops, until a USR
/// already known to `graph` is found or the chain breaks.
fn tier_a_ascend<R: IndexReader>(
    occurrence: &crate::index::ReferenceOccurrence,
    graph: &CallGraph,
    index: &R,
    hop_budget: u32,
) -> Option<Usr> {
    let mut seed = occurrence
        .first_with_role(Role::CalledBy)
        .or_else(|| occurrence.first_with_role(Role::ContainedBy))?
        .clone();

    for _ in 0..hop_budget {
        if graph.usr_to_decl.contains_key(&seed) {
            return Some(seed);
        }

        let definitions = index
            .occurrences_of_usr(&seed, RoleFilter::OnlyRole(Role::Definition))
            .ok()?;
        let definition = definitions.first()?;
        seed = definition.first_with_role(Role::ContainedBy)?.clone();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexSymbolKind, ReferenceOccurrence, Relation};
    use crate::types::{AccessLevel, DeclId, DeclKind, Declaration, SourceLocation};
    use std::path::PathBuf;

    struct StubIndex {
        occurrences: Vec<ReferenceOccurrence>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("stub index error")]
    struct StubError;

    impl IndexReader for StubIndex {
        type Error = StubError;

        fn occurrences_in_file(
            &self,
            _path: &std::path::Path,
        ) -> Result<Vec<ReferenceOccurrence>, Self::Error> {
            Ok(self.occurrences.clone())
        }

        fn occurrences_of_usr(
            &self,
            usr: &Usr,
            _role_filter: RoleFilter,
        ) -> Result<Vec<ReferenceOccurrence>, Self::Error> {
            Ok(self
                .occurrences
                .iter()
                .filter(|o| &o.target_usr == usr)
                .cloned()
                .collect())
        }
    }

    fn hydrated(usr: &str, name: &str, start: u32, end: u32) -> HydratedDeclaration {
        HydratedDeclaration {
            decl: Declaration {
                id: DeclId(0),
                name: name.to_string(),
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

    fn occurrence(callee: &str, file: &str, line: u32, relations: Vec<Relation>) -> ReferenceOccurrence {
        ReferenceOccurrence {
            target_usr: Usr(callee.to_string()),
            symbol_name: callee.to_string(),
            symbol_kind: IndexSymbolKind::Function,
            file: PathBuf::from(file),
            line,
            column: 1,
            roles: vec![Role::Reference],
            relations,
        }
    }

    #[test]
    fn tier_a_resolves_via_called_by_relation() {
        let decls = vec![hydrated("s:caller", "caller", 1, 50), hydrated("s:callee", "callee", 60, 60)];
        let occ = occurrence(
            "s:callee",
            "a.swift",
            60,
            vec![Relation {
                role: Role::CalledBy,
                related_usr: Usr("s:caller".into()),
            }],
        );
        let index = StubIndex {
            occurrences: vec![occ],
        };
        let (graph, log) = build_graph(decls, &index, &GraphSection::default());
        assert!(graph
            .out_edges
            .get(&Usr("s:caller".into()))
            .is_some_and(|s| s.contains(&Usr("s:callee".into()))));
        assert!(matches!(log[0], MappingOutcome::MappedViaTierA { .. }));
    }

    #[test]
    fn tier_b_falls_back_to_geometric_containment() {
        let decls = vec![hydrated("s:caller", "caller", 1, 100), hydrated("s:callee", "callee", 200, 200)];
        let occ = occurrence("s:callee", "a.swift", 50, vec![]);
        let index = StubIndex {
            occurrences: vec![occ],
        };
        let (graph, log) = build_graph(decls, &index, &GraphSection::default());
        assert!(graph
            .out_edges
            .get(&Usr("s:caller".into()))
            .is_some_and(|s| s.contains(&Usr("s:callee".into()))));
        assert!(matches!(log[0], MappingOutcome::MappedViaTierB { .. }));
    }

    #[test]
    fn self_edges_are_filtered() {
        let decls = vec![hydrated("s:r", "r", 1, 5)];
        let occ = occurrence(
            "s:r",
            "a.swift",
            3,
            vec![Relation {
                role: Role::CalledBy,
                related_usr: Usr("s:r".into()),
            }],
        );
        let index = StubIndex {
            occurrences: vec![occ],
        };
        let (graph, _log) = build_graph(decls, &index, &GraphSection::default());
        assert!(graph.out_edges.get(&Usr("s:r".into())).is_none_or(|s| s.is_empty()));
    }

    #[test]
    fn unmapped_reference_is_dropped_and_logged() {
        let decls = vec![hydrated("s:callee", "callee", 5, 5)];
        let occ = occurrence("s:callee", "unknown.swift", 999, vec![]);
        let index = StubIndex {
            occurrences: vec![occ],
        };
        let (graph, log) = build_graph(decls, &index, &GraphSection::default());
        assert!(graph.out_edges.is_empty());
        assert!(matches!(log[0], MappingOutcome::Unmapped { .. }));
    }

    #[test]
    fn in_edges_is_exact_inverse_of_out_edges() {
        let decls = vec![hydrated("s:caller", "caller", 1, 50), hydrated("s:callee", "callee", 60, 60)];
        let occ = occurrence(
            "s:callee",
            "a.swift",
            60,
            vec![Relation {
                role: Role::CalledBy,
                related_usr: Usr("s:caller".into()),
            }],
        );
        let index = StubIndex {
            occurrences: vec![occ],
        };
        let (graph, _) = build_graph(decls, &index, &GraphSection::default());
        for (caller, callees) in &graph.out_edges {
            for callee in callees {
                assert!(graph.in_edges.get(callee).is_some_and(|s| s.contains(caller)));
            }
        }
    }
}
