use image::{Rgba, RgbaImage};
use rand::Rng;

/// Muted red, blue, purple, brown and green.
pub static PALETTE: [Rgba<u8>; 5] = [
    Rgba([0xd3, 0xb9, 0xb2, 0xff]),
    Rgba([0xba, 0xbe, 0xd4, 0xff]),
    Rgba([0xc2, 0xb4, 0xc0, 0xff]),
    Rgba([0xcf, 0xc0, 0xb8, 0xff]),
    Rgba([0xbc, 0xd0, 0xce, 0xff]),
];

pub const DEFAULT_DOT_COUNT: usize = 35;

#[inline(always)]
fn rand_sign<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    if rng.gen::<bool>() {
        1
    } else {
        -1
    }
}

// Paints a 2x2 block, skipping pixels that are off the canvas or no longer
// background.
fn paint_block(canvas: &mut RgbaImage, x: i64, y: i64, background: Rgba<u8>, color: Rgba<u8>) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for (px, py) in [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)] {
        if px < 0 || py < 0 || px >= width || py >= height {
            continue;
        }
        let pixel = canvas.get_pixel_mut(px as u32, py as u32);
        if *pixel == background {
            *pixel = color;
        }
    }
}

/// Scatter `dot_count` short streaks of palette colors over `canvas`.
///
/// Only pixels exactly equal to `background` are painted over. A streak
/// keeps going with probability 14/15 per step and stops once it reaches
/// the one-pixel margin around the canvas.
pub fn speckle<R: Rng + ?Sized>(
    canvas: &mut RgbaImage,
    background: Rgba<u8>,
    palette: &[Rgba<u8>],
    dot_count: usize,
    rng: &mut R,
) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    if palette.is_empty() || width == 0 || height == 0 {
        return;
    }

    for _ in 0..dot_count {
        let mut x = rng.gen_range(0..width);
        let step_x = rand_sign(rng) * rng.gen_range(0..4);
        let mut y = rng.gen_range(0..height);
        let step_y = rand_sign(rng) * rng.gen_range(0..4);
        let color = palette[rng.gen_range(0..palette.len())];

        while rng.gen_range(0..15) > 0 {
            paint_block(canvas, x, y, background, color);
            x += step_x + rng.gen_range(0..3);
            y += step_y + rng.gen_range(0..3);
            if x <= 1 || x >= width - 1 || y <= 1 || y >= height - 1 {
                break;
            }
        }
    }
}
