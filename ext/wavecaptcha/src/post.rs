//! Distortion applied between rendering and encoding.

use image::{Rgba, RgbaImage};
use rand::RngCore;

use crate::noise::{speckle, DEFAULT_DOT_COUNT, PALETTE};
use crate::warp::warp;

/// Transforms the rendered text canvas before it is encoded.
///
/// Implementations must return a canvas with the same dimensions.
pub trait PostProcess: Send + Sync {
    fn apply(&self, canvas: RgbaImage, background: Rgba<u8>, rng: &mut dyn RngCore) -> RgbaImage;
}

/// Warp the canvas, then scatter noise dots over what is still background.
#[derive(Debug, Clone)]
pub struct WarpAndSpeckle {
    pub palette: Vec<Rgba<u8>>,
    pub dot_count: usize,
}

impl Default for WarpAndSpeckle {
    fn default() -> Self {
        WarpAndSpeckle {
            palette: PALETTE.to_vec(),
            dot_count: DEFAULT_DOT_COUNT,
        }
    }
}

impl PostProcess for WarpAndSpeckle {
    fn apply(&self, canvas: RgbaImage, background: Rgba<u8>, rng: &mut dyn RngCore) -> RgbaImage {
        let mut warped = warp(&canvas, background, &mut *rng);
        speckle(&mut warped, background, &self.palette, self.dot_count, rng);
        warped
    }
}

impl<F> PostProcess for F
where
    F: Fn(RgbaImage, Rgba<u8>, &mut dyn RngCore) -> RgbaImage + Send + Sync,
{
    fn apply(&self, canvas: RgbaImage, background: Rgba<u8>, rng: &mut dyn RngCore) -> RgbaImage {
        self(canvas, background, rng)
    }
}
