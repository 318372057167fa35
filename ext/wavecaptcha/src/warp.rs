//! Column-wise vertical warp.
//!
//! Each column is shifted up or down by an amount that grows with the
//! logarithm of its distance from the middle column, in opposite directions
//! on the two halves. The middle column is not moved.

use image::{Rgba, RgbaImage};
use rand::Rng;

/// Vertical source offset for column `x` of a `width`x`height` canvas.
///
/// `sign` is `1` or `-1` and picks which half rises.
pub fn column_offset(x: u32, width: u32, height: u32, sign: i32) -> i32 {
    let mid = i64::from(width / 2);
    let x = i64::from(x);
    let scale = f64::from(height) / 72.0 * 5.0;
    if x <= mid {
        sign * (((mid - x + 1) as f64).log10() * scale).round() as i32
    } else {
        -sign * (((x - mid + 1) as f64).log10() * scale).round() as i32
    }
}

/// Warp `canvas` into a new image of the same size using a random sign.
pub fn warp<R: Rng + ?Sized>(canvas: &RgbaImage, background: Rgba<u8>, rng: &mut R) -> RgbaImage {
    let sign = if rng.gen::<bool>() { 1 } else { -1 };
    warp_with_sign(canvas, background, sign)
}

/// Warp with a fixed sign. Rows sampled from outside the canvas become
/// `background`; nothing wraps or clamps.
pub fn warp_with_sign(canvas: &RgbaImage, background: Rgba<u8>, sign: i32) -> RgbaImage {
    let (width, height) = canvas.dimensions();
    let mut out = RgbaImage::from_pixel(width, height, background);

    for x in 0..width {
        let offset = column_offset(x, width, height, sign);
        for y in 0..height {
            let src_y = i64::from(y) + i64::from(offset);
            if (0..i64::from(height)).contains(&src_y) {
                out.put_pixel(x, y, *canvas.get_pixel(x, src_y as u32));
            }
        }
    }

    out
}
