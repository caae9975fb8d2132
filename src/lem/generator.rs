use log::{debug, trace};
use thiserror::Error;

use crate::core::parameters::GeologyParameters;
use crate::core::traits::InputProvider;
use crate::core::units::{Area, Height, Length, Slope, Step};
use crate::graph::{NodeIndex, PlanarGraph};
use crate::terrain::Terrain;

use super::builder::{ModelBuilderError, TerrainModelBuilder};
use super::lakes::{self, LakeGraph};
use super::model::TerrainModel;
use super::stream_tree::StreamTree;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("terrain node at ({x}, {y}) has no outbound edges")]
    IsolatedNode { x: f64, y: f64 },
    #[error("stream node at ({x}, {y}) carries {outbound} outbound edges, expected exactly one")]
    BrokenStreamPath { x: f64, y: f64, outbound: usize },
    #[error("saddle endpoint at ({x}, {y}) is missing from the stream tree")]
    MissingSaddle { x: f64, y: f64 },
}

/// Thermal-shock slope limit.
///
/// `height` is the candidate height of a node, `reference` the height
/// of its lowest upstream neighbour and `length` their distance (1.0
/// when the neighbour is the sea). A node below its neighbour is left
/// alone; one rising above it at more than `max_slope` is cut back to
/// the steepest stable profile.
pub fn thermal_shock(
    height: Height,
    reference: Height,
    length: Length,
    angle: Slope,
    max_slope: Slope,
) -> Height {
    if height <= reference {
        height
    } else if angle > max_slope {
        reference + length * max_slope.tan()
    } else {
        height
    }
}

/// Drives the landscape evolution over a [`TerrainModel`].
///
/// Every step rebuilds the stream tree, routes closed basins over
/// their lowest saddles, and integrates one implicit stream-power
/// update with uplift and thermal-shock clamping. The terrain graph of
/// the model is the only state carried between steps.
pub struct TerrainGenerator<P: InputProvider> {
    provider: P,
    parameters: GeologyParameters,
    model: TerrainModel,
    stream: Option<StreamTree>,
    step: Step,
    max_height: Height,
}

impl<P: InputProvider> TerrainGenerator<P> {
    pub fn new(model: TerrainModel, provider: P, parameters: GeologyParameters) -> Self {
        Self {
            provider,
            parameters,
            model,
            stream: None,
            step: 0,
            max_height: 0.0,
        }
    }

    /// Builds the model from the provider and wraps it in a generator.
    pub fn from_provider(
        mut provider: P,
        parameters: GeologyParameters,
    ) -> Result<Self, ModelBuilderError> {
        let model = TerrainModelBuilder::new(&mut provider, &parameters).build()?;
        Ok(Self::new(model, provider, parameters))
    }

    pub fn model(&self) -> &TerrainModel {
        &self.model
    }

    pub fn graph(&self) -> &PlanarGraph {
        self.model.graph()
    }

    /// Stream tree of the last completed step.
    pub fn stream_graph(&self) -> Option<&PlanarGraph> {
        self.stream.as_ref().map(|tree| tree.graph())
    }

    pub fn parameters(&self) -> &GeologyParameters {
        &self.parameters
    }

    pub fn step_count(&self) -> Step {
        self.step
    }

    /// Highest node height written by the last step.
    pub fn max_height(&self) -> Height {
        self.max_height
    }

    /// Runs steps until `stop` returns true. The predicate sees the
    /// generator after each completed step.
    pub fn generate<F>(&mut self, mut stop: F) -> Result<Step, SimulationError>
    where
        F: FnMut(&Self) -> bool,
    {
        loop {
            self.step()?;
            if stop(self) {
                return Ok(self.step);
            }
        }
    }

    /// Runs one simulation step.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        self.stream = None;
        self.step += 1;

        let mut stream = StreamTree::construct(self.model.graph())?;
        let sinks_of = lakes::assign_lakes(&mut stream, self.model.graph_mut());
        let lake_count = sinks_of.len();
        let lake_graph = LakeGraph::construct(self.model.graph(), sinks_of);
        let outlets = lake_graph.spanning_tree(self.model.graph_mut(), self.provider.random());
        for outlet in &outlets {
            let from = *self.model.graph().node(outlet.saddle_from).coordinate();
            let to = *self.model.graph().node(outlet.saddle_to).coordinate();
            trace!("lake outlet over the pass at {:.1} m", outlet.pass_height);
            stream.attach_outlet(&from, &to)?;
        }

        self.apply_uplift_and_erosion(&stream)?;
        debug!(
            "step {}: {} lakes, {} outlets, max height {:.1} m",
            self.step,
            lake_count,
            outlets.len(),
            self.max_height
        );
        self.stream = Some(stream);
        Ok(())
    }

    /// Extraction of the current surface: triangle mesh, stream
    /// polylines and interpolated height queries.
    pub fn terrain(&self) -> Terrain {
        Terrain::extract(&self.model, self.stream.as_ref().map(|tree| tree.graph()))
    }

    /// Integrates one implicit stream-power step over every drainage
    /// basin, root first so a node's downstream neighbour is always
    /// up to date when the node itself is visited.
    fn apply_uplift_and_erosion(&mut self, stream: &StreamTree) -> Result<(), SimulationError> {
        let dt = self.parameters.time_step;
        let erodibility = self.parameters.erodibility;
        let m_exp = self.parameters.m_exp;
        let graph = self.model.graph_mut();
        let mut max_height: Height = 0.0;

        let roots: Vec<NodeIndex> = stream.graph().sinks().collect();
        for root in roots {
            let order = stream.graph().inbound_closure(root);

            // drainage accumulation, deepest upstream first
            for &index in order.iter().rev() {
                let upstream: Area = stream
                    .graph()
                    .node(index)
                    .inbound()
                    .iter()
                    .map(|&child| graph.node(child).total_catchment_area())
                    .sum();
                graph.node_mut(index).set_upstream_catchment_area(upstream);
            }

            for &index in &order {
                if graph.node(index).is_sea() {
                    continue;
                }
                let outbound = stream.graph().node(index).outbound();
                if outbound.len() != 1 {
                    let c = graph.node(index).coordinate();
                    return Err(SimulationError::BrokenStreamPath {
                        x: c.x(),
                        y: c.y(),
                        outbound: outbound.len(),
                    });
                }
                let downstream = stream.graph().edge(outbound[0]).to();

                let node = graph.node(index);
                let downstream_node = graph.node(downstream);
                let drainage = node.total_catchment_area();
                let length = node.coordinate().distance(downstream_node.coordinate());
                let k_term = erodibility * drainage.powf(m_exp) / length;
                let mut new_height = (node.height()
                    + dt * (node.uplift() + k_term * downstream_node.height()))
                    / (1.0 + dt * k_term);

                // clamp against the lowest upstream neighbour
                let mut lowest: Option<NodeIndex> = None;
                for &neighbour in node.inbound() {
                    if lowest
                        .map_or(true, |low| graph.node(neighbour).height() < graph.node(low).height())
                    {
                        lowest = Some(neighbour);
                    }
                }
                if let Some(lowest) = lowest {
                    let low = graph.node(lowest);
                    let length = if low.is_sea() {
                        1.0
                    } else {
                        node.coordinate().distance(low.coordinate())
                    };
                    let angle = (new_height - low.height()).atan2(length);
                    new_height =
                        thermal_shock(new_height, low.height(), length, angle, node.max_slope());
                }

                graph.node_mut(index).set_height(new_height);
                max_height = max_height.max(new_height);
            }
        }

        self.max_height = max_height;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn thermal_shock_cuts_overly_steep_rises() {
        let parameters = GeologyParameters::default();
        let max_slope = parameters.slope_for(0.5);
        let limited = thermal_shock(100.0, 50.0, 10.0, 78.7_f64.to_radians(), max_slope);
        assert_abs_diff_eq!(limited, 56.24869351909327, epsilon = 1e-9);
    }

    #[test]
    fn thermal_shock_keeps_gentle_and_descending_profiles() {
        let parameters = GeologyParameters::default();
        let max_slope = parameters.slope_for(0.5);

        // below the reference height: untouched even at a wild angle
        assert_eq!(
            thermal_shock(40.0, 50.0, 10.0, 78.7_f64.to_radians(), max_slope),
            40.0
        );
        // rising, but within the stable slope
        let angle = (55.0_f64 - 50.0).atan2(10.0);
        assert_eq!(thermal_shock(55.0, 50.0, 10.0, angle, max_slope), 55.0);
    }
}
