//! Glyph layout and rasterization onto a fresh canvas.

use image::{Rgba, RgbaImage};

use crate::error::{CaptchaError, Result};
use crate::font::GlyphSource;

/// How the cursor advances between characters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Each character advances by its own measured width.
    #[default]
    Advance,
    /// Every character advances by the same pitch derived from the font size.
    FixedPitch,
}

/// Text placement and colors for [`render`].
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font_size: f32,
    pub color: Rgba<u8>,
    pub background: Rgba<u8>,
    pub layout: Layout,
}

impl Layout {
    fn advances(self, text: &str, glyphs: &dyn GlyphSource, size: f32) -> Result<Vec<i32>> {
        match self {
            Layout::Advance => text.chars().map(|ch| glyphs.advance_width(ch, size)).collect(),
            Layout::FixedPitch => Ok(vec![fixed_pitch(size); text.chars().count()]),
        }
    }
}

pub(crate) fn fixed_pitch(size: f32) -> i32 {
    (size * 0.6).ceil() as i32
}

/// Draw `text` centered horizontally on a `width`x`height` canvas.
///
/// The baseline sits `floor(font_size)` pixels below the top edge. Fails if
/// an advance width cannot be measured; nothing is drawn in that case.
pub fn render(
    text: &str,
    glyphs: &dyn GlyphSource,
    width: u32,
    height: u32,
    style: &TextStyle,
) -> Result<RgbaImage> {
    let mut canvas = RgbaImage::from_pixel(width, height, style.background);

    let advances = style.layout.advances(text, glyphs, style.font_size)?;
    let text_width = advances
        .iter()
        .try_fold(0i64, |sum, &advance| sum.checked_add(i64::from(advance)))
        .ok_or_else(|| CaptchaError::InvalidConfig("text width overflows".into()))?;

    let mut x = (i64::from(width) - text_width) / 2;
    let baseline = style.font_size.floor() as i32;
    for (ch, advance) in text.chars().zip(advances) {
        // Glyphs whose origin does not fit in i32 are nowhere near the canvas.
        if let Ok(origin_x) = i32::try_from(x) {
            glyphs.rasterize(ch, (origin_x, baseline), style.font_size, style.color, &mut canvas);
        }
        x = x
            .checked_add(i64::from(advance))
            .ok_or_else(|| CaptchaError::InvalidConfig("text width overflows".into()))?;
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FileFontLoader, FontLoader, DEFAULT_FONT};
    use std::sync::Mutex;

    const BG: Rgba<u8> = Rgba([0xea, 0xea, 0xea, 0xff]);
    const FG: Rgba<u8> = Rgba([0x2b, 0x2b, 0x2b, 0xff]);

    /// Records draw calls and fills a one-pixel-wide column per glyph.
    #[derive(Default)]
    struct Boxes {
        calls: Mutex<Vec<(char, i32, i32)>>,
    }

    impl GlyphSource for Boxes {
        fn advance_width(&self, ch: char, size: f32) -> Result<i32> {
            match ch {
                'w' => Ok(size as i32),
                '?' => Err(CaptchaError::Glyph { ch, size }),
                _ => Ok(size as i32 / 2),
            }
        }

        fn rasterize(
            &self,
            ch: char,
            origin: (i32, i32),
            _size: f32,
            color: Rgba<u8>,
            canvas: &mut RgbaImage,
        ) {
            self.calls.lock().unwrap().push((ch, origin.0, origin.1));
            if origin.0 >= 0 && (origin.0 as u32) < canvas.width() {
                canvas.put_pixel(origin.0 as u32, 0, color);
            }
        }
    }

    fn style(layout: Layout) -> TextStyle {
        TextStyle {
            font_size: 20.5,
            color: FG,
            background: BG,
            layout,
        }
    }

    #[test]
    fn test_centered_by_advance() {
        let glyphs = Boxes::default();
        render("awa", &glyphs, 100, 40, &style(Layout::Advance)).unwrap();

        // Advances 10 + 20 + 10 = 40, so the text starts at (100 - 40) / 2.
        let calls = glyphs.calls.lock().unwrap();
        assert_eq!(*calls, vec![('a', 30, 20), ('w', 40, 20), ('a', 60, 20)]);
    }

    #[test]
    fn test_left_bias_rounding() {
        let glyphs = Boxes::default();
        render("w", &glyphs, 25, 40, &style(Layout::Advance)).unwrap();
        assert_eq!(glyphs.calls.lock().unwrap()[0].1, 2);
    }

    #[test]
    fn test_fixed_pitch() {
        let glyphs = Boxes::default();
        // '?' has no metrics but fixed pitch never asks for them.
        render("w?w", &glyphs, 100, 40, &style(Layout::FixedPitch)).unwrap();

        let pitch = fixed_pitch(20.5);
        assert_eq!(pitch, 13);
        let start = (100 - 3 * pitch) / 2;
        let xs: Vec<i32> = glyphs.calls.lock().unwrap().iter().map(|c| c.1).collect();
        assert_eq!(xs, vec![start, start + pitch, start + 2 * pitch]);
    }

    #[test]
    fn test_missing_metrics_fails() {
        let glyphs = Boxes::default();
        let err = render("a?", &glyphs, 100, 40, &style(Layout::Advance)).unwrap_err();
        assert!(matches!(err, CaptchaError::Glyph { ch: '?', .. }));
        assert!(glyphs.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_huge_font_size_does_not_overflow() {
        let glyphs = Boxes::default();
        let huge = TextStyle {
            font_size: 1.0e9,
            ..style(Layout::FixedPitch)
        };
        // Four pitches of 6e8 px overflow i32 but not the i64 cursor.
        let canvas = render("abcd", &glyphs, 100, 40, &huge).unwrap();
        assert_eq!(canvas.dimensions(), (100, 40));

        let huge = TextStyle {
            layout: Layout::Advance,
            ..huge
        };
        render("wwww", &glyphs, 100, 40, &huge).unwrap();

        let xs: Vec<i32> = glyphs.calls.lock().unwrap().iter().map(|c| c.1).collect();
        assert_eq!(xs.len(), 8);
        assert_eq!(xs[4], -1_999_999_950);
        assert_eq!(xs[7], 1_000_000_050);
    }

    #[test]
    fn test_background_and_size() {
        let glyphs = Boxes::default();
        let canvas = render("", &glyphs, 33, 17, &style(Layout::Advance)).unwrap();
        assert_eq!(canvas.dimensions(), (33, 17));
        assert!(canvas.pixels().all(|p| *p == BG));
    }

    #[test]
    fn test_real_font_draws_inside_canvas() {
        let glyphs = FileFontLoader.load(DEFAULT_FONT).unwrap();
        let style = TextStyle {
            font_size: 50.0,
            ..style(Layout::Advance)
        };
        let canvas = render("ab3x", glyphs.as_ref(), 176, 72, &style).unwrap();

        assert_eq!(canvas.dimensions(), (176, 72));
        assert!(canvas.pixels().any(|p| *p == FG));
        assert!(canvas.pixels().any(|p| *p == BG));
        // Centered text leaves both side margins untouched.
        for y in 0..72 {
            assert_eq!(*canvas.get_pixel(0, y), BG);
            assert_eq!(*canvas.get_pixel(175, y), BG);
        }
    }
}
