use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use orogen::core::coordinate::Coordinate;
use orogen::core::parameters::GeologyParameters;
use orogen::core::traits::InputProvider;
use orogen::core::units::Length;
use orogen::lem::builder::TerrainModelBuilder;

extern crate orogen;

/// Land split by a sea strait: the strip 10 < x < 15 and the band
/// -5 < y < 0 are ocean, as is everything at or beyond 20 m from the
/// axes. All land shares the same factors.
struct StraitProvider {
    rng: StdRng,
}

impl StraitProvider {
    fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(812316320),
        }
    }
}

impl InputProvider for StraitProvider {
    fn get_data(&self, x: Length, y: Length, max_size: Length) -> Coordinate {
        let (x, y) = if max_size > 0.0 {
            (x.clamp(-max_size, max_size), y.clamp(-max_size, max_size))
        } else {
            (x, y)
        };
        let sea = (10.0 < x && x < 15.0)
            || (-5.0 < y && y < 0.0)
            || x.abs() >= 20.0
            || y.abs() >= 20.0;
        if sea {
            Coordinate::with_factors(x, y, -1.0, 0.0, 0.0)
        } else {
            Coordinate::with_factors(x, y, 0.5, 0.5, 0.3)
        }
    }

    fn size(&self) -> u32 {
        40
    }

    fn lod(&self) -> u32 {
        20
    }

    fn seed(&self) -> i64 {
        812316320
    }

    fn random(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

/// Uniform land everywhere, for area accounting.
struct PlainProvider {
    size: u32,
    lod: u32,
    rng: StdRng,
}

impl PlainProvider {
    fn new(size: u32, lod: u32, seed: i64) -> Self {
        Self {
            size,
            lod,
            rng: StdRng::seed_from_u64(seed as u64),
        }
    }
}

impl InputProvider for PlainProvider {
    fn get_data(&self, x: Length, y: Length, _max_size: Length) -> Coordinate {
        Coordinate::with_factors(x, y, 0.5, 0.5, 0.5)
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn lod(&self) -> u32 {
        self.lod
    }

    fn seed(&self) -> i64 {
        0
    }

    fn random(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

#[test]
fn ocean_crossing_edges_are_culled() {
    let parameters = GeologyParameters::default();
    let mut provider = StraitProvider::new();
    let model = TerrainModelBuilder::new(&mut provider, &parameters)
        .build()
        .unwrap();

    let graph = model.graph();
    assert!(graph.node_count() > 0);

    for edge in graph.edges() {
        let from = graph.node(edge.from()).coordinate();
        let to = graph.node(edge.to()).coordinate();

        // no edge connects two ocean nodes
        assert!(!(from.is_sea() && to.is_sea()));

        // no edge jumps the strait between the mainland and the island
        let crosses = (from.x() < 10.0 && to.x() > 15.0) || (from.x() > 15.0 && to.x() < 10.0);
        assert!(
            !crosses,
            "edge from ({}, {}) to ({}, {}) jumps the strait",
            from.x(),
            from.y(),
            to.x(),
            to.y()
        );
    }
}

#[test]
fn twin_edges_mirror_each_other() {
    let parameters = GeologyParameters::default();
    let mut provider = StraitProvider::new();
    let model = TerrainModelBuilder::new(&mut provider, &parameters)
        .build()
        .unwrap();

    let graph = model.graph();
    let mut checked = 0;
    for (index, node) in graph.nodes() {
        for &e in node.outbound() {
            let edge = graph.edge(e);
            assert_eq!(edge.from(), index);
            let sym = graph.edge(edge.sym().unwrap());
            assert_eq!(sym.from(), edge.to());
            assert_eq!(sym.to(), edge.from());
            assert_eq!(sym.sym(), Some(e));
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn ocean_nodes_start_inert() {
    let parameters = GeologyParameters::default();
    let mut provider = StraitProvider::new();
    let model = TerrainModelBuilder::new(&mut provider, &parameters)
        .build()
        .unwrap();

    for (_, node) in model.graph().nodes() {
        if node.is_sea() {
            assert_eq!(node.height(), 0.0);
            assert_eq!(node.uplift(), 0.0);
            assert_eq!(node.max_slope(), 0.0);
            assert_eq!(node.local_catchment_area(), 0.0);
        } else {
            assert!(node.uplift() > 0.0);
            assert!(node.max_slope() > 0.0);
            assert!(node.local_catchment_area() > 0.0);
        }
    }
}

#[test]
fn voronoi_cells_cover_the_terrain() {
    let parameters = GeologyParameters::default();
    let mut provider = PlainProvider::new(40, 100, 3);
    let model = TerrainModelBuilder::new(&mut provider, &parameters)
        .build()
        .unwrap();

    // with land everywhere, every cell survives and their areas tile
    // the bounding square
    let total: f64 = model
        .graph()
        .nodes()
        .map(|(_, node)| node.local_catchment_area())
        .sum();
    assert_abs_diff_eq!(total, 40.0 * 40.0, epsilon = 1e-3);
}
