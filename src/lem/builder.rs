use std::collections::BTreeSet;

use log::debug;
use thiserror::Error;
use voronoice::{BoundingBox, Point, VoronoiBuilder};

use crate::core::coordinate::Coordinate;
use crate::core::parameters::GeologyParameters;
use crate::core::traits::InputProvider;
use crate::core::units::{lerp, Area};
use crate::graph::{Node, NodeIndex, PlanarGraph};

use super::model::TerrainModel;
use super::sampling;

#[derive(Error, Debug)]
pub enum ModelBuilderError {
    #[error("the provider's size and level of detail must both be positive")]
    InvalidSampling,
    #[error("failed to calculate voronoi diagram")]
    VoronoiError,
}

/// Provides methods to construct a [`TerrainModel`] from an input
/// provider: sample distribution, Delaunay/Voronoi pass, and assembly
/// of the terrain graph with ocean-crossing edges culled.
pub struct TerrainModelBuilder<'a, P: InputProvider> {
    provider: &'a mut P,
    parameters: &'a GeologyParameters,
}

impl<'a, P: InputProvider> TerrainModelBuilder<'a, P> {
    pub fn new(provider: &'a mut P, parameters: &'a GeologyParameters) -> Self {
        Self {
            provider,
            parameters,
        }
    }

    pub fn build(self) -> Result<TerrainModel, ModelBuilderError> {
        let size = self.provider.size() as f64;
        let half = size / 2.0;

        let samples = sampling::distribute(&mut *self.provider)?;

        let voronoi = VoronoiBuilder::default()
            .set_sites(
                samples
                    .iter()
                    .map(|s| Point { x: s.x(), y: s.y() })
                    .collect(),
            )
            .set_bounding_box(BoundingBox::new(Point { x: 0.0, y: 0.0 }, size, size))
            .build()
            .ok_or(ModelBuilderError::VoronoiError)?;

        let areas: Vec<Area> = voronoi
            .iter_cells()
            .map(|cell| {
                let vertices = cell.iter_vertices().collect::<Vec<_>>();
                let mut area = 0.0;
                for i in 0..vertices.len() {
                    let j = (i + 1) % vertices.len();
                    area += vertices[i].x * vertices[j].y - vertices[j].x * vertices[i].y;
                }
                area.abs() / 2.0
            })
            .collect();

        let triangles: Vec<[usize; 3]> = voronoi
            .triangulation()
            .triangles
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        let sites: Vec<Coordinate> = samples
            .iter()
            .map(|s| self.provider.get_data(s.x(), s.y(), half))
            .collect();

        // unique undirected edges of the triangulation, ascending
        let mut edge_set: BTreeSet<(usize, usize)> = BTreeSet::new();
        for t in &triangles {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                edge_set.insert((a.min(b), a.max(b)));
            }
        }

        let mut graph = PlanarGraph::new();
        let mut site_nodes: Vec<Option<NodeIndex>> = vec![None; sites.len()];
        for &(a, b) in &edge_set {
            let (sea_a, sea_b) = (sites[a].is_sea(), sites[b].is_sea());
            if sea_a && sea_b {
                continue;
            }
            if !sea_a && !sea_b && self.crosses_ocean(&sites[a], &sites[b], half) {
                continue;
            }
            let ia = Self::materialize(&mut graph, &mut site_nodes, a, &sites, &areas, self.parameters);
            let ib = Self::materialize(&mut graph, &mut site_nodes, b, &sites, &areas, self.parameters);
            graph.add_twin_edges(ia, ib);
        }

        debug!(
            "terrain model: {} sites, {} nodes, {} edges kept",
            sites.len(),
            graph.node_count(),
            graph.edges().count() / 2
        );

        Ok(TerrainModel::new(graph, triangles, sites, site_nodes))
    }

    /// Whether the straight segment between two land sites touches the
    /// ocean. The segment is probed at clamp(floor(len), 2, 50) evenly
    /// spaced interior points.
    fn crosses_ocean(&self, from: &Coordinate, to: &Coordinate, half: f64) -> bool {
        let length = from.distance(to);
        let count = (length.floor() as usize).clamp(2, 50);
        (1..=count).any(|s| {
            let t = s as f64 / (count + 1) as f64;
            let x = lerp(from.x(), to.x(), t);
            let y = lerp(from.y(), to.y(), t);
            self.provider.get_data(x, y, half).is_sea()
        })
    }

    fn materialize(
        graph: &mut PlanarGraph,
        site_nodes: &mut [Option<NodeIndex>],
        site: usize,
        sites: &[Coordinate],
        areas: &[Area],
        parameters: &GeologyParameters,
    ) -> NodeIndex {
        if let Some(node) = site_nodes[site] {
            return node;
        }
        let coordinate = sites[site];
        let node = graph.insert(Node::new(
            coordinate,
            parameters.uplift_for(coordinate.uplift_factor()),
            parameters.slope_for(coordinate.slope_factor()),
            areas[site],
        ));
        site_nodes[site] = Some(node);
        node
    }
}
