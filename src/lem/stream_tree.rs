use crate::core::coordinate::Coordinate;
use crate::core::units::Height;
use crate::graph::{NodeIndex, PlanarGraph};

use super::generator::SimulationError;

/// Per-step forest describing where each node's water flows.
///
/// Nodes are snapshots of the terrain graph (same handles, same
/// heights); every non-ocean node keeps at most one outbound edge,
/// pointing at its lowest strictly-descending neighbour. Nodes without
/// such a neighbour stay sinks until the lake routing drains them.
pub(crate) struct StreamTree {
    graph: PlanarGraph,
}

impl StreamTree {
    pub(crate) fn construct(terrain: &PlanarGraph) -> Result<Self, SimulationError> {
        let mut graph = PlanarGraph::new();
        for (_, node) in terrain.nodes() {
            graph.insert(node.snapshot());
        }

        for (index, node) in terrain.nodes() {
            if node.is_sea() {
                continue;
            }
            let mut chosen: Option<(NodeIndex, Height)> = None;
            for &e in node.outbound() {
                let target = terrain.edge(e).to();
                let height = terrain.node(target).height();
                // strict comparison keeps the first of equal neighbours
                if chosen.map_or(true, |(_, best)| height < best) {
                    chosen = Some((target, height));
                }
            }
            let Some((downstream, downstream_height)) = chosen else {
                let c = node.coordinate();
                return Err(SimulationError::IsolatedNode { x: c.x(), y: c.y() });
            };
            if downstream_height < node.height() {
                graph.add_edge(index, downstream);
            }
        }

        Ok(Self { graph })
    }

    pub(crate) fn graph(&self) -> &PlanarGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut PlanarGraph {
        &mut self.graph
    }

    /// Drains a closed basin over the given saddle: the flow path from
    /// the saddle node back down to the basin's sink is reversed, then
    /// the saddle node is routed over the pass into the next basin.
    pub(crate) fn attach_outlet(
        &mut self,
        saddle_from: &Coordinate,
        saddle_to: &Coordinate,
    ) -> Result<(), SimulationError> {
        let from = self
            .graph
            .node_index(saddle_from)
            .ok_or(SimulationError::MissingSaddle {
                x: saddle_from.x(),
                y: saddle_from.y(),
            })?;
        let to = self
            .graph
            .node_index(saddle_to)
            .ok_or(SimulationError::MissingSaddle {
                x: saddle_to.x(),
                y: saddle_to.y(),
            })?;

        let mut current = from;
        let mut target = to;
        loop {
            match self.graph.node(current).outbound().first().copied() {
                Some(edge) => {
                    let next = self.graph.edge(edge).to();
                    self.graph.remove_edge(edge);
                    self.graph.add_edge(current, target);
                    target = current;
                    current = next;
                }
                None => {
                    self.graph.add_edge(current, target);
                    break;
                }
            }
        }
        Ok(())
    }
}
