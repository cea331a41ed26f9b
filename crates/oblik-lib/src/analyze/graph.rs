//! Object graph: property-reference edges, SCC grouping, dependency order.
//!
//! Vertices are property ids. Stored edges run from the referenced property
//! to the referencer (and from a contained child to its container), so that
//! Kahn's algorithm — which emits indegree-zero groups first — yields
//! dependencies before their dependents.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};

use crate::parser::PropId;

/// A directed edge between two properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: PropId,
    pub to: PropId,
}

impl Edge {
    pub fn new(from: PropId, to: PropId) -> Self {
        Self { from, to }
    }
}

/// Reference graph over property ids.
#[derive(Clone, Debug, Default)]
pub struct ObjectGraph {
    adjacency: IndexMap<PropId, IndexSet<PropId>>,
    edges: IndexSet<Edge>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotently ensure the vertex exists.
    pub fn add_vertex(&mut self, id: PropId) {
        self.adjacency.entry(id).or_default();
    }

    /// Insert an edge, registering both endpoints as vertices.
    pub fn add_edge(&mut self, from: PropId, to: PropId) {
        self.add_vertex(to);
        self.adjacency.entry(from).or_default().insert(to);
        self.edges.insert(Edge::new(from, to));
    }

    pub fn contains_edge(&self, from: PropId, to: PropId) -> bool {
        self.edges.contains(&Edge::new(from, to))
    }

    pub fn contains_vertex(&self, id: PropId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Vertices in first-insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = PropId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn successors(&self, id: PropId) -> impl Iterator<Item = PropId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    pub fn edges(&self) -> &IndexSet<Edge> {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }
}

/// One strongly connected component of the reference graph: the unit of
/// type inference. Ids are assigned in first-visit order and double as the
/// deterministic tie-break for the topological order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: usize,
    pub members: IndexSet<PropId>,
}

/// Group the graph into SCCs and order them dependencies-first.
pub fn compute_order(graph: &ObjectGraph) -> Vec<Group> {
    let closure = transitive_closure(graph);
    let (assignment, mut groups) = create_groups(graph, &closure);
    quotient_edges(graph, &assignment, &mut groups);
    generate_order(groups)
}

/// Warshall-style closure over the edge set: for every connector `c`, an
/// edge `u -> v` is added whenever `u -> c` and `c -> v` are present.
/// Running it on its own output is a no-op.
pub fn transitive_closure(graph: &ObjectGraph) -> IndexSet<Edge> {
    let mut closure = graph.edges().clone();

    for connector in graph.vertices() {
        for from in graph.vertices() {
            if !closure.contains(&Edge::new(from, connector)) {
                continue;
            }
            for to in graph.vertices() {
                if closure.contains(&Edge::new(connector, to)) {
                    closure.insert(Edge::new(from, to));
                }
            }
        }
    }

    closure
}

struct GroupData {
    members: IndexSet<PropId>,
    successors: IndexSet<usize>,
    indegree: usize,
}

/// Assign every vertex to the SCC of the first unassigned vertex it is
/// mutually reachable with. Vertices with no cycle get singleton groups.
fn create_groups(
    graph: &ObjectGraph,
    closure: &IndexSet<Edge>,
) -> (IndexMap<PropId, usize>, Vec<GroupData>) {
    let mut assignment: IndexMap<PropId, usize> = IndexMap::new();
    let mut groups: Vec<GroupData> = Vec::new();

    for u in graph.vertices() {
        if assignment.contains_key(&u) {
            continue;
        }

        let group_id = groups.len();
        let mut members = IndexSet::new();
        members.insert(u);
        assignment.insert(u, group_id);

        for v in graph.vertices() {
            if v == u || assignment.contains_key(&v) {
                continue;
            }
            if closure.contains(&Edge::new(u, v)) && closure.contains(&Edge::new(v, u)) {
                assignment.insert(v, group_id);
                members.insert(v);
            }
        }

        groups.push(GroupData {
            members,
            successors: IndexSet::new(),
            indegree: 0,
        });
    }

    (assignment, groups)
}

/// Project original edges onto the group quotient, deduplicated, tracking
/// indegrees for the topological sort.
fn quotient_edges(
    graph: &ObjectGraph,
    assignment: &IndexMap<PropId, usize>,
    groups: &mut [GroupData],
) {
    for u in graph.vertices() {
        let from_group = assignment[&u];
        for v in graph.successors(u) {
            let to_group = assignment[&v];
            if from_group == to_group {
                continue;
            }
            if groups[from_group].successors.insert(to_group) {
                groups[to_group].indegree += 1;
            }
        }
    }
}

/// Kahn's algorithm over the quotient DAG. The queue is seeded in ascending
/// group-id order, which makes ties deterministic for a given AST.
fn generate_order(mut groups: Vec<GroupData>) -> Vec<Group> {
    let mut queue: VecDeque<usize> = (0..groups.len())
        .filter(|&id| groups[id].indegree == 0)
        .collect();
    let mut output = Vec::with_capacity(groups.len());

    while let Some(id) = queue.pop_front() {
        let members = std::mem::take(&mut groups[id].members);
        let successors: Vec<usize> = groups[id].successors.iter().copied().collect();
        output.push(Group { id, members });

        for successor in successors {
            groups[successor].indegree -= 1;
            if groups[successor].indegree == 0 {
                queue.push_back(successor);
            }
        }
    }

    debug_assert_eq!(output.len(), groups.len(), "quotient graph is acyclic");
    output
}
