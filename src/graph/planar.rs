use std::collections::{BTreeSet, HashMap};

use crate::core::coordinate::Coordinate;

use super::edge::{DirectedEdge, EdgeIndex};
use super::node::Node;

pub type NodeIndex = usize;

/// Planar graph over factor-annotated coordinates.
///
/// Nodes and edges live in arenas addressed by integer handles; the
/// coordinate map resolves epsilon-equivalent positions to their node.
/// Removing an edge vacates its arena slot and detaches it from both
/// endpoints and from its twin, so handles held elsewhere never move.
///
/// The same structure backs the persistent terrain graph (bidirectional
/// edges, built once) and the per-step stream tree (one outbound edge
/// per non-ocean node).
#[derive(Debug, Default)]
pub struct PlanarGraph {
    nodes: Vec<Node>,
    edges: Vec<Option<DirectedEdge>>,
    index: HashMap<Coordinate, NodeIndex>,
    sinks: BTreeSet<NodeIndex>,
}

impl PlanarGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, or returns the handle of the node already keyed by
    /// an epsilon-equivalent coordinate.
    pub fn insert(&mut self, node: Node) -> NodeIndex {
        if let Some(&existing) = self.index.get(node.coordinate()) {
            return existing;
        }
        let index = self.nodes.len();
        self.index.insert(*node.coordinate(), index);
        self.sinks.insert(index);
        self.nodes.push(node);
        index
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index]
    }

    pub fn node_index(&self, coordinate: &Coordinate) -> Option<NodeIndex> {
        self.index.get(coordinate).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes.iter().enumerate()
    }

    pub fn edge(&self, index: EdgeIndex) -> &DirectedEdge {
        self.edges[index]
            .as_ref()
            .expect("edge handle points at a removed edge")
    }

    /// Live edges, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &DirectedEdge> {
        self.edges.iter().flatten()
    }

    /// Nodes without outbound edges, ascending.
    pub fn sinks(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.sinks.iter().copied()
    }

    /// Adds a directed edge. The outbound list of `from` stays sorted
    /// by bearing; equal bearings keep insertion order.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) -> EdgeIndex {
        let bearing = self.nodes[from]
            .coordinate()
            .bearing(self.nodes[to].coordinate());
        let index = self.edges.len();
        let position = {
            let outbound = self.nodes[from].outbound();
            outbound.partition_point(|&e| self.edge(e).bearing() <= bearing)
        };
        self.edges.push(Some(DirectedEdge::new(from, to, bearing)));
        self.nodes[from].insert_outbound(position, index);
        self.nodes[to].push_inbound(from);
        self.sinks.remove(&from);
        index
    }

    /// Adds the edge pair between `a` and `b` with linked `sym`
    /// handles.
    pub fn add_twin_edges(&mut self, a: NodeIndex, b: NodeIndex) -> (EdgeIndex, EdgeIndex) {
        let ab = self.add_edge(a, b);
        let ba = self.add_edge(b, a);
        self.edges[ab]
            .as_mut()
            .expect("freshly added edge")
            .set_sym(ba);
        self.edges[ba]
            .as_mut()
            .expect("freshly added edge")
            .set_sym(ab);
        (ab, ba)
    }

    /// Detaches the edge from both endpoints and from its twin's `sym`
    /// handle, leaving the arena slot vacant.
    pub fn remove_edge(&mut self, index: EdgeIndex) {
        let Some(edge) = self.edges[index].take() else {
            return;
        };
        self.nodes[edge.from()].remove_outbound(index);
        self.nodes[edge.to()].remove_inbound(edge.from());
        if let Some(sym) = edge.sym() {
            if let Some(twin) = self.edges[sym].as_mut() {
                twin.clear_sym();
            }
        }
        if self.nodes[edge.from()].outbound().is_empty() {
            self.sinks.insert(edge.from());
        }
    }

    /// Breadth-first traversal of everything draining into `root`
    /// (following inbound handles), `root` first.
    pub fn inbound_closure(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut traversal = vec![root];
        let mut i = 0;
        while i < traversal.len() {
            let it = traversal[i];
            traversal.extend_from_slice(self.nodes[it].inbound());
            i += 1;
        }
        traversal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn land(x: f64, y: f64) -> Node {
        Node::new(Coordinate::with_factors(x, y, 1.0, 0.5, 0.5), 1e-4, 0.5, 1.0)
    }

    #[test]
    fn twin_edges_are_symmetric() {
        let mut graph = PlanarGraph::new();
        let a = graph.insert(land(0.0, 0.0));
        let b = graph.insert(land(1.0, 0.0));
        let (ab, ba) = graph.add_twin_edges(a, b);

        let forward = graph.edge(ab);
        let reverse = graph.edge(ba);
        assert_eq!(forward.sym(), Some(ba));
        assert_eq!(reverse.sym(), Some(ab));
        assert_eq!(forward.from(), reverse.to());
        assert_eq!(forward.to(), reverse.from());
    }

    #[test]
    fn outbound_edges_stay_sorted_by_bearing() {
        let mut graph = PlanarGraph::new();
        let center = graph.insert(land(0.0, 0.0));
        let east = graph.insert(land(1.0, 0.0));
        let north = graph.insert(land(0.0, 1.0));
        let west = graph.insert(land(-1.0, 0.0));
        let south = graph.insert(land(0.0, -1.0));

        // insertion order differs from angular order on purpose
        graph.add_edge(center, north);
        graph.add_edge(center, west);
        graph.add_edge(center, east);
        graph.add_edge(center, south);

        let bearings: Vec<f64> = graph
            .node(center)
            .outbound()
            .iter()
            .map(|&e| graph.edge(e).bearing())
            .collect();
        let mut sorted = bearings.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(bearings, sorted);
    }

    #[test]
    fn removing_an_edge_restores_the_sink() {
        let mut graph = PlanarGraph::new();
        let a = graph.insert(land(0.0, 0.0));
        let b = graph.insert(land(1.0, 0.0));
        let edge = graph.add_edge(a, b);
        assert!(!graph.sinks().any(|s| s == a));

        graph.remove_edge(edge);
        assert!(graph.sinks().any(|s| s == a));
        assert!(graph.node(b).inbound().is_empty());
        assert_eq!(graph.edges().count(), 0);
    }

    #[test]
    fn duplicate_coordinates_collapse() {
        let mut graph = PlanarGraph::new();
        let a = graph.insert(land(0.0, 0.0));
        let b = graph.insert(land(1e-9, 0.0));
        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 1);
    }
}
