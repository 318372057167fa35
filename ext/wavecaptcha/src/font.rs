//! Glyph sources and the font cache.
//!
//! A [`GlyphSource`] measures and rasterizes single characters. Parsed fonts
//! are kept in a [`FontCache`] keyed by file path for the life of the cache;
//! font files are assumed not to change on disk.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use image::{Rgba, RgbaImage};
use imageproc::pixelops::weighted_sum;
use parking_lot::Mutex;
use rusttype::{point, Font, Scale};

use crate::error::{CaptchaError, Result};

/// Font bundled with the crate, used when no font file is configured.
pub const DEFAULT_FONT: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/fonts/DejaVuSans-Bold.ttf");

/// Something that can measure and draw characters at a point size.
///
/// Sizes are points at 72 DPI, so one point is one pixel.
pub trait GlyphSource: Send + Sync {
    /// Horizontal advance of `ch` in whole pixels.
    fn advance_width(&self, ch: char, size: f32) -> Result<i32>;

    /// Draws `ch` with its baseline origin at `origin`, clipped to the canvas.
    fn rasterize(
        &self,
        ch: char,
        origin: (i32, i32),
        size: f32,
        color: Rgba<u8>,
        canvas: &mut RgbaImage,
    );
}

/// [`GlyphSource`] backed by a parsed TrueType font.
pub struct RusttypeSource {
    font: Font<'static>,
}

impl RusttypeSource {
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self { font })
    }

    // rusttype scales to the ascent-descent height, not the em square.
    fn scale(&self, size: f32) -> Scale {
        let v = self.font.v_metrics_unscaled();
        let units_per_em = f32::from(self.font.units_per_em().max(1));
        Scale::uniform(size * (v.ascent - v.descent) / units_per_em)
    }
}

impl GlyphSource for RusttypeSource {
    fn advance_width(&self, ch: char, size: f32) -> Result<i32> {
        let glyph = self.font.glyph(ch);
        if glyph.id().0 == 0 {
            return Err(CaptchaError::Glyph { ch, size });
        }
        let advance = glyph.scaled(self.scale(size)).h_metrics().advance_width;
        Ok(advance as i32)
    }

    fn rasterize(
        &self,
        ch: char,
        origin: (i32, i32),
        size: f32,
        color: Rgba<u8>,
        canvas: &mut RgbaImage,
    ) {
        let glyph = self
            .font
            .glyph(ch)
            .scaled(self.scale(size))
            .positioned(point(origin.0 as f32, origin.1 as f32));

        let Some(bb) = glyph.pixel_bounding_box() else {
            return;
        };
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);
        if bb.max.x <= 0 || bb.max.y <= 0 || bb.min.x >= width || bb.min.y >= height {
            return;
        }
        glyph.draw(|gx, gy, coverage| {
            let x = bb.min.x + gx as i32;
            let y = bb.min.y + gy as i32;
            if x < 0 || y < 0 || x >= width || y >= height || coverage <= 0.0 {
                return;
            }
            let coverage = coverage.min(1.0);
            let pixel = canvas.get_pixel_mut(x as u32, y as u32);
            *pixel = weighted_sum(*pixel, color, 1.0 - coverage, coverage);
        });
    }
}

/// Turns a font identifier into a glyph source.
pub trait FontLoader: Send + Sync {
    fn load(&self, id: &str) -> Result<Arc<dyn GlyphSource>>;
}

/// Reads the identifier as a file path and parses it with rusttype.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFontLoader;

impl FontLoader for FileFontLoader {
    fn load(&self, id: &str) -> Result<Arc<dyn GlyphSource>> {
        let path = Path::new(id);
        let bytes = std::fs::read(path).map_err(|source| CaptchaError::Resource {
            path: path.to_path_buf(),
            source,
        })?;
        let source =
            RusttypeSource::from_bytes(bytes).ok_or_else(|| CaptchaError::ResourceParse {
                path: path.to_path_buf(),
            })?;
        Ok(Arc::new(source))
    }
}

static GLOBAL: LazyLock<Arc<FontCache>> = LazyLock::new(|| Arc::new(FontCache::new()));

/// Keyed cache of parsed fonts with at-most-once load per key.
///
/// Hits read the map without taking the load lock. A miss takes one lock
/// shared by all keys, checks the map again and only then loads, so racing
/// callers for the same font parse it once. Entries are never evicted.
pub struct FontCache {
    fonts: DashMap<String, Arc<dyn GlyphSource>>,
    load_lock: Mutex<()>,
    loader: Box<dyn FontLoader>,
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FontCache {
    /// Cache that loads fonts from files.
    pub fn new() -> Self {
        Self::with_loader(FileFontLoader)
    }

    pub fn with_loader(loader: impl FontLoader + 'static) -> Self {
        Self {
            fonts: DashMap::new(),
            load_lock: Mutex::new(()),
            loader: Box::new(loader),
        }
    }

    /// Process-wide cache used when a builder is not given one.
    pub fn global() -> Arc<FontCache> {
        Arc::clone(&GLOBAL)
    }

    /// Returns the glyph source for `id`, loading it on first use.
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn GlyphSource>> {
        if let Some(source) = self.fonts.get(id) {
            log::trace!("font cache hit: {id}");
            return Ok(Arc::clone(source.value()));
        }

        let _guard = self.load_lock.lock();
        if let Some(source) = self.fonts.get(id) {
            return Ok(Arc::clone(source.value()));
        }

        log::debug!("font cache miss, loading {id}");
        let source = self.loader.load(id).inspect_err(|e| {
            log::warn!("failed to load font {id}: {e}");
        })?;
        self.fonts.insert(id.to_string(), Arc::clone(&source));
        Ok(source)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fonts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
