use super::planar::NodeIndex;

pub type EdgeIndex = usize;

/// A directed edge between two nodes of a [`PlanarGraph`].
///
/// Edges added in pairs keep a handle to their reverse twin in `sym`;
/// the per-step stream tree adds single edges whose `sym` is `None`.
///
/// [`PlanarGraph`]: super::planar::PlanarGraph
#[derive(Debug, Clone)]
pub struct DirectedEdge {
    from: NodeIndex,
    to: NodeIndex,
    bearing: f64,
    sym: Option<EdgeIndex>,
}

impl DirectedEdge {
    pub(crate) fn new(from: NodeIndex, to: NodeIndex, bearing: f64) -> Self {
        Self {
            from,
            to,
            bearing,
            sym: None,
        }
    }

    pub fn from(&self) -> NodeIndex {
        self.from
    }

    pub fn to(&self) -> NodeIndex {
        self.to
    }

    /// Direction of the edge in the plane, in [-pi, pi].
    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    pub fn sym(&self) -> Option<EdgeIndex> {
        self.sym
    }

    pub(crate) fn set_sym(&mut self, sym: EdgeIndex) {
        self.sym = Some(sym);
    }

    pub(crate) fn clear_sym(&mut self) {
        self.sym = None;
    }
}
