use std::collections::HashSet;

use rand_distr::{Distribution, Poisson};

use crate::core::coordinate::Coordinate;
use crate::core::traits::InputProvider;

use super::builder::ModelBuilderError;

/// Distributes sample points over the terrain as a jittered grid.
///
/// The grid has `m = round(sqrt(lod))` cells per side of width
/// `j = size / m`; each cell's point is offset by Poisson(2j) draws
/// (one per axis) and clamped one meter inside the terrain bounds.
/// Points collapsing onto an earlier point are dropped, so the result
/// holds at most `m * m` coordinates.
pub(crate) fn distribute<P: InputProvider>(
    provider: &mut P,
) -> Result<Vec<Coordinate>, ModelBuilderError> {
    let size = provider.size() as f64;
    let m = (provider.lod() as f64).sqrt().round() as usize;
    if size <= 0.0 || m == 0 {
        return Err(ModelBuilderError::InvalidSampling);
    }

    let half = size / 2.0;
    let j = size / m as f64;
    let jitter = Poisson::new(2.0 * j).map_err(|_| ModelBuilderError::InvalidSampling)?;

    let mut points = Vec::with_capacity(m * m);
    let mut seen = HashSet::with_capacity(m * m);
    for i in 0..m {
        for k in 0..m {
            let px: f64 = jitter.sample(provider.random());
            let py: f64 = jitter.sample(provider.random());
            let x = ((-half + 1.0) + i as f64 * j + (px - j)).clamp(-half + 1.0, half - 1.0);
            let y = ((-half + 1.0) + k as f64 * j + (py - j)).clamp(-half + 1.0, half - 1.0);
            let point = Coordinate::new(x, y);
            if seen.insert(point) {
                points.push(point);
            }
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::Length;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct StubProvider {
        size: u32,
        lod: u32,
        rng: StdRng,
    }

    impl StubProvider {
        fn new(size: u32, lod: u32, seed: i64) -> Self {
            Self {
                size,
                lod,
                rng: StdRng::seed_from_u64(seed as u64),
            }
        }
    }

    impl InputProvider for StubProvider {
        fn get_data(&self, x: Length, y: Length, _max_size: Length) -> Coordinate {
            Coordinate::new(x, y)
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
    fn lod_rounds_down_to_a_square_grid() {
        // lod 20 rounds to a 4x4 grid; clamping near the border may
        // merge a pair of points in rare seeds
        let mut provider = StubProvider::new(40, 20, 812316320);
        let points = distribute(&mut provider).unwrap();
        assert!((15..=16).contains(&points.len()));
        for point in &points {
            assert!((-19.0..=19.0).contains(&point.x()));
            assert!((-19.0..=19.0).contains(&point.y()));
        }
    }

    #[test]
    fn wide_cells_fill_the_whole_grid() {
        let mut provider = StubProvider::new(400, 20, 7);
        let points = distribute(&mut provider).unwrap();
        assert_eq!(points.len(), 16);
    }

    #[test]
    fn zero_lod_is_rejected() {
        let mut provider = StubProvider::new(40, 0, 1);
        assert!(matches!(
            distribute(&mut provider),
            Err(ModelBuilderError::InvalidSampling)
        ));
    }
}
