//! Result surface of a generation run: a triangle mesh over the full
//! triangulation, the stream polylines of the last step, and
//! natural-neighbor interpolated height queries.

use naturalneighbor::{Interpolator, Point};

use crate::core::coordinate::Coordinate;
use crate::core::units::{lerp, Height};
use crate::graph::PlanarGraph;
use crate::lem::model::TerrainModel;

/// Depth assigned to ocean vertices that were culled from the terrain
/// graph, scaled by how deep their sea factor marks them.
const CULLED_SEA_DEPTH: Height = -1500.0;

/// One segment of a stream polyline, with 3D endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamSegment {
    pub from: [f64; 3],
    pub to: [f64; 3],
}

pub struct Terrain {
    sites: Vec<Coordinate>,
    heights: Vec<Height>,
    triangles: Vec<[usize; 3]>,
    streams: Vec<StreamSegment>,
    interpolator: Interpolator,
}

impl Terrain {
    pub(crate) fn extract(model: &TerrainModel, stream: Option<&PlanarGraph>) -> Self {
        let graph = model.graph();
        let sites = model.sites().to_vec();
        let heights: Vec<Height> = sites
            .iter()
            .enumerate()
            .map(|(site, coordinate)| match model.site_node(site) {
                Some(node) => graph.node(node).height(),
                None => lerp(0.0, CULLED_SEA_DEPTH, coordinate.sea_factor().abs()),
            })
            .collect();

        let streams = stream
            .map(|tree| {
                tree.edges()
                    .map(|edge| {
                        let from = graph.node(edge.from());
                        let to = graph.node(edge.to());
                        StreamSegment {
                            from: [
                                from.coordinate().x(),
                                from.coordinate().y(),
                                from.height(),
                            ],
                            to: [to.coordinate().x(), to.coordinate().y(), to.height()],
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let interpolator = Interpolator::new(&sites);

        Self {
            sites,
            heights,
            triangles: model.triangles().to_vec(),
            streams,
            interpolator,
        }
    }

    pub fn sites(&self) -> &[Coordinate] {
        &self.sites
    }

    /// Mesh height of each site, indexed like [`sites`](Self::sites).
    pub fn heights(&self) -> &[Height] {
        &self.heights
    }

    /// 3D position of one mesh vertex.
    pub fn position(&self, site: usize) -> [f64; 3] {
        [
            self.sites[site].x(),
            self.sites[site].y(),
            self.heights[site],
        ]
    }

    /// Triangles of the mesh as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [[f64; 3]; 3]> + '_ {
        self.triangles
            .iter()
            .map(|t| [self.position(t[0]), self.position(t[1]), self.position(t[2])])
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Stream segments of the last simulation step.
    pub fn streams(&self) -> &[StreamSegment] {
        &self.streams
    }

    /// Interpolated height at an arbitrary point, `None` outside the
    /// triangulation.
    pub fn height_at(&self, x: f64, y: f64) -> Option<Height> {
        self.interpolator.interpolate(&self.heights, Point { x, y })
    }
}
