use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::Rgba;
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::code::{generate_code, ALPHABET};
use crate::encode::encode_png;
use crate::error::{CaptchaError, Result};
use crate::font::{FontCache, GlyphSource, DEFAULT_FONT};
use crate::post::{PostProcess, WarpAndSpeckle};
use crate::render::{render, Layout, TextStyle};

/// Largest accepted font size in points.
pub const MAX_FONT_SIZE: f32 = 1000.0;

pub struct Captcha {
    pub code: String,
    pub image: Vec<u8>,
    config: CaptchaBuilder,
    glyphs: Arc<dyn GlyphSource>,
}

impl Captcha {
    /// Replace the code and image with fresh ones, reusing the configuration
    /// and the font resolved by the first build.
    pub fn reload(&mut self) -> Result<()> {
        self.reload_with_rng(&mut StdRng::from_entropy())
    }

    pub fn reload_with_rng<R: RngCore>(&mut self, rng: &mut R) -> Result<()> {
        let (code, image) = self.config.draw(self.glyphs.as_ref(), rng)?;
        self.code = code;
        self.image = image;
        Ok(())
    }

    /// The image as a `data:image/png;base64,...` URI.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.image))
    }
}

impl fmt::Display for Captcha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\nCode:\n\t{}\nBase64Image:\n\t{}", self.code, self.data_uri())
    }
}

impl fmt::Debug for Captcha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Captcha")
            .field("code", &self.code)
            .field("image_len", &self.image.len())
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct CaptchaBuilder {
    width: u32,
    height: u32,
    font: String,
    font_size: f32,
    length: usize,
    char_color: Rgba<u8>,
    background_color: Rgba<u8>,
    post_process: Option<Arc<dyn PostProcess>>,
    unique: bool,
    layout: Layout,
    font_cache: Option<Arc<FontCache>>,
    glyphs: Option<Arc<dyn GlyphSource>>,
}

impl Default for CaptchaBuilder {
    fn default() -> Self {
        CaptchaBuilder {
            width: 176,
            height: 72,
            font: DEFAULT_FONT.to_string(),
            font_size: 50.0,
            length: 4,
            char_color: Rgba([0x2b, 0x2b, 0x2b, 0xff]),
            background_color: Rgba([0xea, 0xea, 0xea, 0xff]),
            post_process: Some(Arc::new(WarpAndSpeckle::default())),
            unique: false,
            layout: Layout::Advance,
            font_cache: None,
            glyphs: None,
        }
    }
}

impl CaptchaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn size(self, width: u32, height: u32) -> Self {
        self.width(width).height(height)
    }

    /// Path of the TrueType font file to draw with.
    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    /// Font size in points at 72 DPI.
    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn char_color(mut self, color: impl Into<Rgba<u8>>) -> Self {
        self.char_color = color.into();
        self
    }

    pub fn background_color(mut self, color: impl Into<Rgba<u8>>) -> Self {
        self.background_color = color.into();
        self
    }

    /// Replace the default warp and noise step.
    pub fn post_process(mut self, post_process: impl PostProcess + 'static) -> Self {
        self.post_process = Some(Arc::new(post_process));
        self
    }

    /// Encode the rendered text without any distortion.
    pub fn no_post_process(mut self) -> Self {
        self.post_process = None;
        self
    }

    /// Never repeat a character within one code.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Resolve fonts through `cache` instead of the process-wide one.
    pub fn font_cache(mut self, cache: Arc<FontCache>) -> Self {
        self.font_cache = Some(cache);
        self
    }

    /// Draw with an already loaded glyph source. The font path and font
    /// cache are ignored while one is set.
    pub fn glyph_source(mut self, glyphs: Arc<dyn GlyphSource>) -> Self {
        self.glyphs = Some(glyphs);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptchaError::InvalidConfig(format!(
                "canvas must not be empty, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 || self.font_size > MAX_FONT_SIZE {
            return Err(CaptchaError::InvalidConfig(format!(
                "font size must be in (0, {MAX_FONT_SIZE}], got {}",
                self.font_size
            )));
        }
        if self.length == 0 {
            return Err(CaptchaError::InvalidConfig("length must be at least 1".into()));
        }
        if self.unique && self.length > ALPHABET.len() {
            return Err(CaptchaError::InvalidConfig(format!(
                "cannot draw {} unique characters from {}",
                self.length,
                ALPHABET.len()
            )));
        }
        Ok(())
    }

    pub fn build(self) -> Result<Captcha> {
        self.build_with_rng(&mut StdRng::from_entropy())
    }

    /// Build with a caller-supplied random source, e.g. a seeded one.
    pub fn build_with_rng<R: RngCore>(self, rng: &mut R) -> Result<Captcha> {
        self.validate()?;

        let glyphs = match &self.glyphs {
            Some(glyphs) => Arc::clone(glyphs),
            None => {
                let cache = self.font_cache.clone().unwrap_or_else(FontCache::global);
                cache.resolve(&self.font)?
            }
        };
        let (code, image) = self.draw(glyphs.as_ref(), rng)?;

        Ok(Captcha {
            code,
            image,
            config: self,
            glyphs,
        })
    }

    fn draw(&self, glyphs: &dyn GlyphSource, rng: &mut dyn RngCore) -> Result<(String, Vec<u8>)> {
        log::debug!(
            "generating {}-character captcha on {}x{}",
            self.length,
            self.width,
            self.height
        );
        let code = generate_code(&mut *rng, self.length, &ALPHABET, self.unique);
        log::trace!("captcha code: {code}");

        let style = TextStyle {
            font_size: self.font_size,
            color: self.char_color,
            background: self.background_color,
            layout: self.layout,
        };
        let mut canvas = render(&code, glyphs, self.width, self.height, &style)?;

        if let Some(post_process) = &self.post_process {
            canvas = post_process.apply(canvas, self.background_color, rng);
            if canvas.dimensions() != (self.width, self.height) {
                let (w, h) = canvas.dimensions();
                return Err(CaptchaError::InvalidConfig(format!(
                    "post process resized canvas from {}x{} to {w}x{h}",
                    self.width, self.height
                )));
            }
        }

        let image = encode_png(&canvas)?;
        Ok((code, image))
    }
}
