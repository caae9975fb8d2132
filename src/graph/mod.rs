//! Module `graph` provides the arena-backed planar graph shared by the
//! persistent terrain state and the per-step stream tree.

pub mod edge;
pub mod node;
pub mod planar;

pub use edge::{DirectedEdge, EdgeIndex};
pub use node::Node;
pub use planar::{NodeIndex, PlanarGraph};
