//! Reachability Analyzer (§4.4): unused-property pruning, BFS from entry
//! points, dead-candidate selection, the UI-component rescue pass, and
//! hierarchical grouped reporting.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::instrument;

use crate::graph::CallGraph;
use crate::index::{IndexReader, Role, RoleFilter};
use crate::types::{DeclKind, Usr};

/// A single reported dead declaration, numbered per §4.4 Step 5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadSymbol {
    pub usr: Usr,
    pub number: NumberPath,
}

/// A hierarchical `k.0`, `k.1`, `parent.child` number, kept as an ordered
/// tuple so symbols sort correctly without string comparison tricks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NumberPath(pub Vec<u32>);

impl std::fmt::Display for NumberPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Step 1 — remove container→property-type edges whose property is itself
/// unreferenced (§4.4 Step 1). Returns the pruned edge map; `graph` itself
/// is left untouched so callers can still answer "was this edge pruned?"
/// questions if needed.
#[instrument(skip_all)]
pub fn prune_unused_properties<R: IndexReader>(
    graph: &CallGraph,
    index: &R,
    respect_public_api: bool,
) -> HashMap<Usr, HashSet<Usr>> {
    let mut pruned = graph.out_edges.clone();

    for hd in graph.usr_to_decl.values() {
        if hd.decl.kind != DeclKind::Property {
            continue;
        }
        let Some(usr) = &hd.usr else { continue };

        if respect_public_api && !hd.decl.access.is_private_or_fileprivate() {
            continue;
        }

        let references = match index.occurrences_of_usr(usr, RoleFilter::OnlyRole(Role::Reference)) {
            Ok(refs) => refs,
            Err(_) => continue,
        };
        if !references.is_empty() {
            continue;
        }

        let Some(type_name) = &hd.decl.declared_type else { continue };
        let Some(container_usr) = container_usr_of(hd, graph) else { continue };
        let Some(type_def_usr) = find_type_declaration(graph, outer_type_name(type_name)) else {
            continue;
        };

        if let Some(edges) = pruned.get_mut(&container_usr) {
            edges.remove(&type_def_usr);
        }
    }

    pruned
}

/// The USR of the type that syntactically encloses `hd` (§4.4 Step 1:
/// "whose enclosing container's USR is `C`").
fn container_usr_of(hd: &crate::types::HydratedDeclaration, graph: &CallGraph) -> Option<Usr> {
    let enclosing_path = hd.decl.enclosing_type_path()?;
    find_type_declaration(graph, enclosing_path)
}

/// Looks up a known type declaration by its dot-path name, matching only
/// the outer name for generic instantiations (§8 boundary behavior).
fn find_type_declaration(graph: &CallGraph, name: &str) -> Option<Usr> {
    graph
        .usr_to_decl
        .iter()
        .find(|(_, hd)| hd.decl.kind.is_type() && hd.decl.name == name)
        .map(|(usr, _)| usr.clone())
}

/// Strips a generic instantiation down to its outer type name, e.g.
/// `Array<Foo>` → `Array` (§8: "match the outer name only").
fn outer_type_name(declared_type: &str) -> &str {
    declared_type.split('<').next().unwrap_or(declared_type).trim()
}

/// Step 2 — BFS from entry points over the pruned edge map.
#[instrument(skip_all)]
pub fn reachable_from_entry_points(
    graph: &CallGraph,
    pruned_out_edges: &HashMap<Usr, HashSet<Usr>>,
) -> HashSet<Usr> {
    let mut visited: HashSet<Usr> = HashSet::new();
    let mut queue: VecDeque<Usr> = VecDeque::new();

    for (usr, hd) in &graph.usr_to_decl {
        if hd.decl.is_entry_point() && visited.insert(usr.clone()) {
            queue.push_back(usr.clone());
        }
    }

    while let Some(current) = queue.pop_front() {
        let Some(next) = pruned_out_edges.get(&current) else {
            continue;
        };
        for callee in next {
            if visited.insert(callee.clone()) {
                queue.push_back(callee.clone());
            }
        }
    }

    visited
}

/// Step 3 — a declaration is a dead candidate iff it is not an entry
/// point, its USR is not reachable, and it was hydrated.
#[must_use]
pub fn select_candidates(graph: &CallGraph, reachable: &HashSet<Usr>) -> HashSet<Usr> {
    graph
        .usr_to_decl
        .iter()
        .filter(|(usr, hd)| !hd.decl.is_entry_point() && !reachable.contains(*usr))
        .map(|(usr, _)| usr.clone())
        .collect()
}

/// Step 4 — rescue functions/variables whose immediately enclosing
/// struct/class is itself reachable (covers UI action-handler closures
/// and framework-implicit accessors).
#[must_use]
pub fn rescue_pass(graph: &CallGraph, candidates: HashSet<Usr>, reachable: &HashSet<Usr>) -> HashSet<Usr> {
    candidates
        .into_iter()
        .filter(|usr| {
            let Some(hd) = graph.usr_to_decl.get(usr) else {
                return true;
            };
            if !matches!(hd.decl.kind, DeclKind::Function | DeclKind::Variable) {
                return true;
            }
            let Some(enclosing_name) = hd.decl.enclosing_type_path() else {
                return true;
            };
            let Some(parent_usr) = find_type_declaration(graph, enclosing_name) else {
                return true;
            };
            let parent_is_reachable = reachable.contains(&parent_usr);
            let parent_is_struct_or_class = graph
                .usr_to_decl
                .get(&parent_usr)
                .is_some_and(|p| matches!(p.decl.kind, DeclKind::Struct | DeclKind::Class));

            !(parent_is_reachable && parent_is_struct_or_class)
        })
        .collect()
}

/// Step 5 — grouped reporting: weakly-connected components over the dead
/// subgraph, numbered `k.0, k.1, …` from leaves, then `parent.child`
/// walking incoming dead edges breadth-first.
#[must_use]
pub fn number_dead_symbols(graph: &CallGraph, dead: &HashSet<Usr>) -> Vec<DeadSymbol> {
    let components = weakly_connected_components(graph, dead);
    let mut results = Vec::new();

    for (component_index, component) in components.iter().enumerate() {
        let k = u32::try_from(component_index).unwrap_or(u32::MAX);
        results.extend(number_component(graph, component, k));
    }

    results
}

fn weakly_connected_components(graph: &CallGraph, dead: &HashSet<Usr>) -> Vec<Vec<Usr>> {
    let mut undirected: HashMap<Usr, HashSet<Usr>> = HashMap::new();
    for usr in dead {
        undirected.entry(usr.clone()).or_default();
    }
    for usr in dead {
        if let Some(outs) = graph.out_edges.get(usr) {
            for callee in outs.iter().filter(|c| dead.contains(*c)) {
                undirected.entry(usr.clone()).or_default().insert(callee.clone());
                undirected.entry(callee.clone()).or_default().insert(usr.clone());
            }
        }
    }

    let mut visited: HashSet<Usr> = HashSet::new();
    let mut components = Vec::new();

    let mut sorted: Vec<&Usr> = dead.iter().collect();
    sorted.sort();

    for start in sorted {
        if visited.contains(start) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start.clone());
        visited.insert(start.clone());
        while let Some(current) = queue.pop_front() {
            component.push(current.clone());
            if let Some(neighbors) = undirected.get(&current) {
                let mut sorted_neighbors: Vec<&Usr> = neighbors.iter().collect();
                sorted_neighbors.sort();
                for neighbor in sorted_neighbors {
                    if visited.insert(neighbor.clone()) {
                        queue.push_back(neighbor.clone());
                    }
                }
            }
        }
        component.sort();
        components.push(component);
    }

    components
}

/// Numbers a single component: leaves (no outgoing edge to another dead
/// USR within the component) get `k.0, k.1, …`; walking *incoming* dead
/// edges breadth-first assigns `parent.child` suffixes; anything unreached
/// by that walk falls back to the bare component number.
fn number_component(graph: &CallGraph, component: &[Usr], k: u32) -> Vec<DeadSymbol> {
    let member_set: HashSet<Usr> = component.iter().cloned().collect();

    let is_leaf = |usr: &Usr| -> bool {
        graph
            .out_edges
            .get(usr)
            .is_none_or(|outs| !outs.iter().any(|c| member_set.contains(c)))
    };

    let mut leaves: Vec<&Usr> = component.iter().filter(|u| is_leaf(u)).collect();
    leaves.sort();

    let mut numbers: HashMap<Usr, NumberPath> = HashMap::new();
    let mut queue: VecDeque<Usr> = VecDeque::new();

    for (i, leaf) in leaves.iter().enumerate() {
        let path = NumberPath(vec![k, u32::try_from(i).unwrap_or(u32::MAX)]);
        numbers.insert((*leaf).clone(), path);
        queue.push_back((*leaf).clone());
    }

    while let Some(current) = queue.pop_front() {
        let current_path = numbers.get(&current).cloned().unwrap_or(NumberPath(vec![k]));
        let Some(parents) = graph.in_edges.get(&current) else {
            continue;
        };
        let mut sorted_parents: Vec<&Usr> = parents.iter().filter(|p| member_set.contains(*p)).collect();
        sorted_parents.sort();
        for (child_index, parent) in sorted_parents.into_iter().enumerate() {
            if numbers.contains_key(parent) {
                continue;
            }
            let mut path = current_path.0.clone();
            path.push(u32::try_from(child_index).unwrap_or(u32::MAX));
            let path = NumberPath(path);
            numbers.insert(parent.clone(), path);
            queue.push_back(parent.clone());
        }
    }

    let mut results: Vec<DeadSymbol> = component
        .iter()
        .map(|usr| DeadSymbol {
            usr: usr.clone(),
            number: numbers.get(usr).cloned().unwrap_or(NumberPath(vec![k])),
        })
        .collect();
    results.sort_by(|a, b| a.number.cmp(&b.number));
    results
}
