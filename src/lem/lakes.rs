use std::collections::{BTreeMap, BinaryHeap};

use log::warn;
use rand::rngs::StdRng;
use rand::Rng;

use crate::core::units::{Height, UpliftRate};
use crate::graph::{NodeIndex, PlanarGraph};

use super::stream_tree::StreamTree;

/// Tags every node of the stream tree (and the terrain graph) with the
/// id of the basin it drains into. Ids are assigned in ascending sink
/// order; the returned vector maps each id to its sink node.
pub(crate) fn assign_lakes(stream: &mut StreamTree, terrain: &mut PlanarGraph) -> Vec<NodeIndex> {
    for index in 0..terrain.node_count() {
        terrain.node_mut(index).set_lake(None);
    }

    let sinks: Vec<NodeIndex> = stream.graph().sinks().collect();
    let mut sinks_of = Vec::with_capacity(sinks.len());
    for sink in sinks {
        let id = sinks_of.len();
        for index in stream.graph().inbound_closure(sink) {
            stream.graph_mut().node_mut(index).set_lake(Some(id));
            terrain.node_mut(index).set_lake(Some(id));
        }
        sinks_of.push(sink);
    }
    sinks_of
}

/// The saddle chosen to drain one lake into a neighbouring one.
pub(crate) struct LakeOutlet {
    pub(crate) saddle_from: NodeIndex,
    pub(crate) saddle_to: NodeIndex,
    pub(crate) pass_height: Height,
}

struct LakeEdge {
    from: usize,
    to: usize,
    pass_height: Height,
    saddle_from: NodeIndex,
    saddle_to: NodeIndex,
    sym: usize,
}

/// Candidate outlet in the priority set. The heap is a max-heap, so the
/// comparison is reversed: the lowest pass (then the lowest uplift at
/// the receiving and giving sinks, then insertion order) pops first.
struct SaddleElement {
    pass_height: Height,
    uplift_to: UpliftRate,
    uplift_from: UpliftRate,
    order: u64,
    edge: usize,
}

impl PartialEq for SaddleElement {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for SaddleElement {}

impl PartialOrd for SaddleElement {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SaddleElement {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .pass_height
            .total_cmp(&self.pass_height)
            .then(other.uplift_to.total_cmp(&self.uplift_to))
            .then(other.uplift_from.total_cmp(&self.uplift_from))
            .then(other.order.cmp(&self.order))
    }
}

/// Adjacency of lakes: one node per basin, bidirectional edges between
/// touching basins annotated with their lowest shared saddle.
pub(crate) struct LakeGraph {
    sinks_of: Vec<NodeIndex>,
    outbound: Vec<Vec<usize>>,
    edges: Vec<LakeEdge>,
}

impl LakeGraph {
    /// Scans every terrain edge crossing between two lakes and keeps,
    /// per lake pair, the saddle with the lowest pass (the lower of
    /// the two crest heights wins ties by scan order). Pairs of two
    /// ocean basins need no routing and are skipped.
    pub(crate) fn construct(terrain: &PlanarGraph, sinks_of: Vec<NodeIndex>) -> Self {
        struct Candidate {
            pass_height: Height,
            low_side: NodeIndex,
            high_side: NodeIndex,
        }

        let mut best: BTreeMap<(usize, usize), Candidate> = BTreeMap::new();
        for (index, node) in terrain.nodes() {
            let Some(lake) = node.lake() else { continue };
            for &e in node.outbound() {
                let target = terrain.edge(e).to();
                let Some(other) = terrain.node(target).lake() else {
                    continue;
                };
                if other == lake {
                    continue;
                }
                if terrain.node(sinks_of[lake]).is_sea() && terrain.node(sinks_of[other]).is_sea() {
                    continue;
                }
                let pass_height = node.height().max(terrain.node(target).height());
                let key = (lake.min(other), lake.max(other));
                let (low_side, high_side) = if lake < other {
                    (index, target)
                } else {
                    (target, index)
                };
                let better = best
                    .get(&key)
                    .map_or(true, |candidate| pass_height < candidate.pass_height);
                if better {
                    best.insert(
                        key,
                        Candidate {
                            pass_height,
                            low_side,
                            high_side,
                        },
                    );
                }
            }
        }

        let mut edges = Vec::with_capacity(best.len() * 2);
        let mut outbound = vec![Vec::new(); sinks_of.len()];
        for ((a, b), candidate) in best {
            let forward = edges.len();
            let reverse = forward + 1;
            edges.push(LakeEdge {
                from: a,
                to: b,
                pass_height: candidate.pass_height,
                saddle_from: candidate.low_side,
                saddle_to: candidate.high_side,
                sym: reverse,
            });
            edges.push(LakeEdge {
                from: b,
                to: a,
                pass_height: candidate.pass_height,
                saddle_from: candidate.high_side,
                saddle_to: candidate.low_side,
                sym: forward,
            });
            outbound[a].push(forward);
            outbound[b].push(reverse);
        }

        Self {
            sinks_of,
            outbound,
            edges,
        }
    }

    /// Chooses one outgoing saddle per non-ocean lake, forming a tree
    /// rooted at the ocean basins. When no basin touches the sea, one
    /// sink is promoted to an ocean outlet so the drainage has
    /// somewhere to go.
    pub(crate) fn spanning_tree(
        &self,
        terrain: &mut PlanarGraph,
        rng: &mut StdRng,
    ) -> Vec<LakeOutlet> {
        let lake_count = self.sinks_of.len();
        let mut roots: Vec<usize> = (0..lake_count)
            .filter(|&lake| terrain.node(self.sinks_of[lake]).is_sea())
            .collect();

        if roots.is_empty() && lake_count > 0 {
            let pick = if lake_count > 1 {
                rng.gen_range(0..lake_count - 1)
            } else {
                0
            };
            let sink = self.sinks_of[pick];
            terrain.node_mut(sink).promote_to_sea();
            let c = terrain.node(sink).coordinate();
            warn!(
                "no drainage basin reaches the sea; promoting the sink at ({:.1}, {:.1}) to an ocean outlet",
                c.x(),
                c.y()
            );
            roots.push(pick);
        }

        let mut heap: BinaryHeap<SaddleElement> = BinaryHeap::new();
        let mut order: u64 = 0;
        for &root in &roots {
            for &e in &self.outbound[root] {
                self.push_candidate(&mut heap, &mut order, terrain, self.edges[e].sym);
            }
        }

        let mut chosen: Vec<Option<usize>> = vec![None; lake_count];
        let mut outlets = Vec::new();
        while let Some(element) = heap.pop() {
            let edge = &self.edges[element.edge];
            if chosen[edge.from].is_some() {
                continue;
            }
            chosen[edge.from] = Some(element.edge);
            outlets.push(LakeOutlet {
                saddle_from: edge.saddle_from,
                saddle_to: edge.saddle_to,
                pass_height: edge.pass_height,
            });
            for &other in &self.outbound[edge.from] {
                if other == element.edge {
                    continue;
                }
                let sym = self.edges[other].sym;
                if terrain.node(self.sinks_of[self.edges[sym].from]).is_sea() {
                    continue;
                }
                self.push_candidate(&mut heap, &mut order, terrain, sym);
            }
        }

        outlets
    }

    fn push_candidate(
        &self,
        heap: &mut BinaryHeap<SaddleElement>,
        order: &mut u64,
        terrain: &PlanarGraph,
        edge: usize,
    ) {
        let e = &self.edges[edge];
        heap.push(SaddleElement {
            pass_height: e.pass_height,
            uplift_to: terrain.node(self.sinks_of[e.to]).uplift(),
            uplift_from: terrain.node(self.sinks_of[e.from]).uplift(),
            order: *order,
            edge,
        });
        *order += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coordinate::Coordinate;
    use crate::graph::Node;
    use rand::SeedableRng;

    fn chain(heights: &[f64]) -> PlanarGraph {
        let mut graph = PlanarGraph::new();
        let nodes: Vec<_> = heights
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                let sea = h == 0.0;
                let coordinate =
                    Coordinate::with_factors(i as f64, 0.0, if sea { -1.0 } else { 1.0 }, 0.5, 0.5);
                let index = graph.insert(Node::new(coordinate, 1e-4, 0.5, 1.0));
                graph.node_mut(index).set_height(h);
                index
            })
            .collect();
        for pair in nodes.windows(2) {
            graph.add_twin_edges(pair[0], pair[1]);
        }
        graph
    }

    #[test]
    fn basins_chain_towards_the_sea_over_their_lowest_passes() {
        // sea - 10 - 2 - 8 - 1: two closed basins, {2} spilling at the
        // 10 m crest and {8, 1} spilling at the 8 m crest behind it
        let mut terrain = chain(&[0.0, 10.0, 2.0, 8.0, 1.0]);
        let mut tree = StreamTree::construct(&terrain).unwrap();
        let sinks_of = assign_lakes(&mut tree, &mut terrain);
        assert_eq!(sinks_of.len(), 3);

        let lakes = LakeGraph::construct(&terrain, sinks_of);
        let mut rng = StdRng::seed_from_u64(0);
        let outlets = lakes.spanning_tree(&mut terrain, &mut rng);

        assert_eq!(outlets.len(), 2);
        // the basin of node 2 connects first, over the crest at node 1
        assert_eq!(outlets[0].saddle_from, 2);
        assert_eq!(outlets[0].saddle_to, 1);
        assert_eq!(outlets[0].pass_height, 10.0);
        // the basin of node 4 then drains into it over the crest at
        // node 3
        assert_eq!(outlets[1].saddle_from, 3);
        assert_eq!(outlets[1].saddle_to, 2);
        assert_eq!(outlets[1].pass_height, 8.0);
    }

    #[test]
    fn landlocked_terrain_promotes_one_sink_to_the_sea() {
        let mut terrain = chain(&[5.0, 3.0, 4.0]);
        let mut tree = StreamTree::construct(&terrain).unwrap();
        let sinks_of = assign_lakes(&mut tree, &mut terrain);
        assert_eq!(sinks_of.len(), 1);

        let lakes = LakeGraph::construct(&terrain, sinks_of.clone());
        let mut rng = StdRng::seed_from_u64(0);
        let outlets = lakes.spanning_tree(&mut terrain, &mut rng);

        assert!(outlets.is_empty());
        let sink = sinks_of[0];
        assert!(terrain.node(sink).is_sea());
        assert_eq!(terrain.node(sink).height(), 0.0);
        assert_eq!(terrain.node(sink).uplift(), 0.0);
    }
}
