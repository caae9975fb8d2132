use crate::core::coordinate::Coordinate;
use crate::graph::{NodeIndex, PlanarGraph};

/// A set of fundamental data required for generating terrain.
///
/// ### Properties
/// - `graph` is the planar terrain graph whose node heights are the
///   authoritative elevation state.
/// - `triangles` is the full triangle list of the Delaunay
///   triangulation, kept verbatim for mesh output (including triangles
///   whose vertices were culled from the graph).
/// - `sites` is the factor-annotated coordinate of every triangulation
///   vertex, indexed like the triangle corners.
pub struct TerrainModel {
    graph: PlanarGraph,
    triangles: Vec<[usize; 3]>,
    sites: Vec<Coordinate>,
    site_nodes: Vec<Option<NodeIndex>>,
}

impl TerrainModel {
    pub(crate) fn new(
        graph: PlanarGraph,
        triangles: Vec<[usize; 3]>,
        sites: Vec<Coordinate>,
        site_nodes: Vec<Option<NodeIndex>>,
    ) -> Self {
        Self {
            graph,
            triangles,
            sites,
            site_nodes,
        }
    }

    /// Assembles a model from a hand-built graph, for small experiments
    /// and tests. Sites absent from the graph are treated as culled
    /// ocean vertices.
    pub fn from_parts(
        graph: PlanarGraph,
        triangles: Vec<[usize; 3]>,
        sites: Vec<Coordinate>,
    ) -> Self {
        let site_nodes = sites.iter().map(|site| graph.node_index(site)).collect();
        Self {
            graph,
            triangles,
            sites,
            site_nodes,
        }
    }

    pub fn graph(&self) -> &PlanarGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut PlanarGraph {
        &mut self.graph
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn sites(&self) -> &[Coordinate] {
        &self.sites
    }

    /// Graph node of the triangulation vertex `site`, if it survived
    /// the ocean culling.
    pub fn site_node(&self, site: usize) -> Option<NodeIndex> {
        self.site_nodes.get(site).copied().flatten()
    }
}
