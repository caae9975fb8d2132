use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::coordinate::Coordinate;
use crate::core::traits::InputProvider;
use crate::core::units::{lerp, Length};

/// Octave summation of Perlin noise, normalized to [-1, 1].
fn octaved_perlin(perlin: &Perlin, x: f64, y: f64, octaves: usize, persistence: f64) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        value += perlin.get([x * frequency, y * frequency, 0.0]) * amplitude;
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= 2.0;
    }

    value / max_value
}

/// Shape of one noise channel (sea, uplift or slope).
///
/// The raw octaved noise is remapped from [-1, 1] to [`low`, `high`].
/// Shifts left as `None` are drawn from the provider's RNG when the
/// provider is created, so two providers with the same seed sample the
/// same landscape.
#[derive(Debug, Clone)]
pub struct NoiseChannel {
    pub persistence: f64,
    pub scale: f64,
    pub low: f64,
    pub high: f64,
    pub shift_x: Option<f64>,
    pub shift_y: Option<f64>,
}

impl NoiseChannel {
    fn with_range(low: f64, high: f64) -> Self {
        Self {
            persistence: 0.5,
            scale: 500.0,
            low,
            high,
            shift_x: None,
            shift_y: None,
        }
    }
}

/// Options of the noise provider.
///
/// ### Properties
///  - `sea`, `uplift`, `slope` shape the three factor channels.
///  - `octaves` is the number of Perlin octaves summed per channel.
///  - `uplift_from_sea` derives the uplift factor from the sea channel
///    (higher land lifts faster) instead of its own noise; likewise
///    `slope_from_sea` and `slope_from_uplift` for the slope factor.
///  - `land_max_radius` forces deep ocean beyond the given distance
///    from the origin, guaranteeing an island-like outline.
#[derive(Debug, Clone)]
pub struct NoiseProviderOptions {
    pub sea: NoiseChannel,
    pub uplift: NoiseChannel,
    pub slope: NoiseChannel,
    pub octaves: usize,
    pub uplift_from_sea: bool,
    pub slope_from_sea: bool,
    pub slope_from_uplift: bool,
    pub land_max_radius: Option<f64>,
}

impl Default for NoiseProviderOptions {
    fn default() -> Self {
        Self {
            sea: NoiseChannel::with_range(-1.0, 1.0),
            uplift: NoiseChannel::with_range(0.0, 1.0),
            slope: NoiseChannel::with_range(0.0, 1.0),
            octaves: 4,
            uplift_from_sea: false,
            slope_from_sea: false,
            slope_from_uplift: false,
            land_max_radius: None,
        }
    }
}

/// Factor provider backed by layered Perlin noise.
pub struct NoiseProvider {
    perlin: Perlin,
    options: NoiseProviderOptions,
    size: u32,
    lod: u32,
    seed: i64,
    rng: StdRng,
}

impl NoiseProvider {
    pub fn new(size: u32, lod: u32, seed: i64, options: NoiseProviderOptions) -> Self {
        let mut rng = StdRng::seed_from_u64(seed as u64);
        let mut options = options;
        let span = size as f64;
        for channel in [
            &mut options.sea,
            &mut options.uplift,
            &mut options.slope,
        ] {
            if channel.shift_x.is_none() {
                channel.shift_x = Some(rng.gen_range(0.0..span));
            }
            if channel.shift_y.is_none() {
                channel.shift_y = Some(rng.gen_range(0.0..span));
            }
        }
        Self {
            perlin: Perlin::new(seed as u32),
            options,
            size,
            lod,
            seed,
            rng,
        }
    }

    fn channel_value(&self, channel: &NoiseChannel, x: Length, y: Length) -> f64 {
        let shift_x = channel.shift_x.unwrap_or(0.0);
        let shift_y = channel.shift_y.unwrap_or(0.0);
        let raw = octaved_perlin(
            &self.perlin,
            (x + shift_x) / channel.scale,
            (y + shift_y) / channel.scale,
            self.options.octaves,
            channel.persistence,
        );
        lerp(channel.low, channel.high, (raw + 1.0) / 2.0)
    }
}

impl InputProvider for NoiseProvider {
    fn get_data(&self, x: Length, y: Length, max_size: Length) -> Coordinate {
        let (x, y) = if max_size > 0.0 {
            (x.clamp(-max_size, max_size), y.clamp(-max_size, max_size))
        } else {
            (x, y)
        };

        let mut sea = self.channel_value(&self.options.sea, x, y).clamp(-1.0, 1.0);
        if let Some(radius) = self.options.land_max_radius {
            if (x * x + y * y).sqrt() > radius {
                sea = -1.0;
            }
        }

        let uplift = if self.options.uplift_from_sea {
            sea.max(0.0)
        } else {
            self.channel_value(&self.options.uplift, x, y)
        };
        let uplift = uplift.clamp(0.0, 1.0);

        let slope = if self.options.slope_from_uplift {
            uplift
        } else if self.options.slope_from_sea {
            sea.max(0.0)
        } else {
            self.channel_value(&self.options.slope, x, y).clamp(0.0, 1.0)
        };

        Coordinate::with_factors(x, y, sea, uplift, slope)
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn lod(&self) -> u32 {
        self.lod
    }

    fn seed(&self) -> i64 {
        self.seed
    }

    fn random(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
