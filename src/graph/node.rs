use crate::core::coordinate::Coordinate;
use crate::core::units::{Area, Height, Slope, UpliftRate};

use super::edge::EdgeIndex;
use super::planar::NodeIndex;

/// A vertex of the terrain graph.
///
/// Scalar state (height, uplift rate, slope limit, catchment areas) is
/// carried next to the adjacency so the per-step passes never chase
/// more than one handle. Ocean nodes hold zero uplift, slope limit and
/// local catchment, and their height stays at sea level.
#[derive(Debug, Clone)]
pub struct Node {
    coordinate: Coordinate,
    height: Height,
    uplift: UpliftRate,
    max_slope: Slope,
    local_catchment_area: Area,
    upstream_catchment_area: Area,
    lake: Option<usize>,
    outbound: Vec<EdgeIndex>,
    inbound: Vec<NodeIndex>,
}

impl Node {
    pub fn new(
        coordinate: Coordinate,
        uplift: UpliftRate,
        max_slope: Slope,
        local_catchment_area: Area,
    ) -> Self {
        let sea = coordinate.is_sea();
        Self {
            coordinate,
            height: 0.0,
            uplift: if sea { 0.0 } else { uplift },
            max_slope: if sea { 0.0 } else { max_slope },
            local_catchment_area: if sea { 0.0 } else { local_catchment_area },
            upstream_catchment_area: 0.0,
            lake: None,
            outbound: Vec::new(),
            inbound: Vec::new(),
        }
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn height(&self) -> Height {
        self.height
    }

    pub fn uplift(&self) -> UpliftRate {
        self.uplift
    }

    pub fn max_slope(&self) -> Slope {
        self.max_slope
    }

    pub fn local_catchment_area(&self) -> Area {
        self.local_catchment_area
    }

    pub fn upstream_catchment_area(&self) -> Area {
        self.upstream_catchment_area
    }

    pub fn total_catchment_area(&self) -> Area {
        self.upstream_catchment_area + self.local_catchment_area
    }

    pub fn lake(&self) -> Option<usize> {
        self.lake
    }

    pub fn is_sea(&self) -> bool {
        self.coordinate.is_sea()
    }

    /// Outbound edge handles, sorted by bearing.
    pub fn outbound(&self) -> &[EdgeIndex] {
        &self.outbound
    }

    /// Handles of the nodes whose edges point here.
    pub fn inbound(&self) -> &[NodeIndex] {
        &self.inbound
    }

    /// Copy of the scalar state with empty adjacency, for the per-step
    /// stream tree.
    pub(crate) fn snapshot(&self) -> Self {
        Self {
            coordinate: self.coordinate,
            height: self.height,
            uplift: self.uplift,
            max_slope: self.max_slope,
            local_catchment_area: self.local_catchment_area,
            upstream_catchment_area: self.upstream_catchment_area,
            lake: None,
            outbound: Vec::new(),
            inbound: Vec::new(),
        }
    }

    pub(crate) fn set_height(&mut self, height: Height) {
        self.height = height;
    }

    pub(crate) fn set_upstream_catchment_area(&mut self, area: Area) {
        self.upstream_catchment_area = area;
    }

    pub(crate) fn set_lake(&mut self, lake: Option<usize>) {
        self.lake = lake;
    }

    /// Demotes the node to an ocean outlet: flow ends here and neither
    /// uplift nor the slope limit applies any more.
    pub(crate) fn promote_to_sea(&mut self) {
        self.coordinate.make_sea();
        self.height = 0.0;
        self.uplift = 0.0;
        self.max_slope = 0.0;
    }

    pub(crate) fn insert_outbound(&mut self, position: usize, edge: EdgeIndex) {
        self.outbound.insert(position, edge);
    }

    pub(crate) fn push_inbound(&mut self, node: NodeIndex) {
        self.inbound.push(node);
    }

    pub(crate) fn remove_outbound(&mut self, edge: EdgeIndex) {
        self.outbound.retain(|&e| e != edge);
    }

    pub(crate) fn remove_inbound(&mut self, node: NodeIndex) {
        if let Some(position) = self.inbound.iter().position(|&n| n == node) {
            self.inbound.remove(position);
        }
    }
}
