use std::path::Path;

use image::RgbImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::core::coordinate::Coordinate;
use crate::core::traits::InputProvider;
use crate::core::units::{lerp, Length};

#[derive(Error, Debug)]
pub enum ImageProviderError {
    #[error("failed to load the factor image")]
    Image(#[from] image::ImageError),
}

/// Factor provider backed by a bitmap.
///
/// Pixels with `blue >= max(red, green)` are ocean; their sea factor is
/// `lerp(-1, 1, (255 - blue) / 255)`, so a fully blue pixel is the
/// deepest water. All other pixels are land with the uplift factor
/// taken from the green channel and the slope factor from the red
/// channel.
pub struct ImageProvider {
    image: RgbImage,
    size: u32,
    lod: u32,
    seed: i64,
    rng: StdRng,
}

impl ImageProvider {
    pub fn new(image: RgbImage, size: u32, lod: u32, seed: i64) -> Self {
        Self {
            image,
            size,
            lod,
            seed,
            rng: StdRng::seed_from_u64(seed as u64),
        }
    }

    pub fn open<P: AsRef<Path>>(
        path: P,
        size: u32,
        lod: u32,
        seed: i64,
    ) -> Result<Self, ImageProviderError> {
        let image = image::open(path)?.to_rgb8();
        Ok(Self::new(image, size, lod, seed))
    }

    fn pixel_at(&self, x: Length, y: Length) -> (u8, u8, u8) {
        let half = self.size as f64 / 2.0;
        let span = self.size as f64;
        let (width, height) = self.image.dimensions();
        let u = ((x + half) / span * (width - 1) as f64)
            .round()
            .clamp(0.0, (width - 1) as f64) as u32;
        // image rows grow downwards, the terrain's y axis upwards
        let v = ((1.0 - (y + half) / span) * (height - 1) as f64)
            .round()
            .clamp(0.0, (height - 1) as f64) as u32;
        let pixel = self.image.get_pixel(u, v);
        (pixel[0], pixel[1], pixel[2])
    }
}

impl InputProvider for ImageProvider {
    fn get_data(&self, x: Length, y: Length, max_size: Length) -> Coordinate {
        let (x, y) = if max_size > 0.0 {
            (x.clamp(-max_size, max_size), y.clamp(-max_size, max_size))
        } else {
            (x, y)
        };

        let (red, green, blue) = self.pixel_at(x, y);
        if blue >= red.max(green) {
            let sea = lerp(-1.0, 1.0, (255 - blue) as f64 / 255.0);
            Coordinate::with_factors(x, y, sea, 0.0, 0.0)
        } else {
            Coordinate::with_factors(
                x,
                y,
                1.0,
                green as f64 / 255.0,
                red as f64 / 255.0,
            )
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checker() -> RgbImage {
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(0, 0, Rgb([0, 0, 255])); // deep water, top-left
        image.put_pixel(1, 0, Rgb([60, 200, 10])); // fertile land
        image.put_pixel(0, 1, Rgb([0, 0, 128])); // shallower water
        image.put_pixel(1, 1, Rgb([255, 40, 10])); // steep land
        image
    }

    #[test]
    fn blue_dominant_pixels_are_ocean() {
        let provider = ImageProvider::new(checker(), 100, 16, 1);
        let data = provider.get_data(-50.0, 50.0, 0.0);
        assert!(data.is_sea());
        assert_eq!(data.sea_factor(), -1.0);

        let shallow = provider.get_data(-50.0, -50.0, 0.0);
        assert!(shallow.is_sea());
        assert!(shallow.sea_factor() > -1.0);
    }

    #[test]
    fn land_pixels_map_green_and_red_channels() {
        let provider = ImageProvider::new(checker(), 100, 16, 1);
        let fertile = provider.get_data(50.0, 50.0, 0.0);
        assert!(!fertile.is_sea());
        assert!((fertile.uplift_factor() - 200.0 / 255.0).abs() < 1e-12);
        assert!((fertile.slope_factor() - 60.0 / 255.0).abs() < 1e-12);

        let steep = provider.get_data(50.0, -50.0, 0.0);
        assert!(!steep.is_sea());
        assert_eq!(steep.slope_factor(), 1.0);
    }
}
