//! Module `input` provides the bundled factor providers: layered Perlin
//! noise and bitmap lookup. Both implement [`InputProvider`].
//!
//! [`InputProvider`]: crate::core::traits::InputProvider

pub mod image;
pub mod noise;
