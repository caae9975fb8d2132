use rand::rngs::StdRng;

use super::coordinate::Coordinate;
use super::units::Length;

/// Source of per-point factor data (sea, uplift, slope) and of the
/// sampling configuration. Implemented by the bundled noise and image
/// providers; the simulation depends on nothing else about its input.
pub trait InputProvider {
    /// Factor-annotated coordinate at (x, y). When `max_size` is
    /// positive, x and y are clamped to [-max_size, max_size] before
    /// the lookup.
    fn get_data(&self, x: Length, y: Length, max_size: Length) -> Coordinate;

    /// Side length of the terrain (unit: m).
    fn size(&self) -> u32;

    /// Target number of sample points.
    fn lod(&self) -> u32;

    /// Seed this provider's RNG was created from.
    fn seed(&self) -> i64;

    /// The RNG owned by this provider. Advanced during sampling and by
    /// the no-sea-outlet fallback of the lake routing.
    fn random(&mut self) -> &mut StdRng;
}
