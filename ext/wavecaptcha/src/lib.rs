//! Distorted text captcha images.
//!
//! A random code is drawn in a TrueType font, warped column by column,
//! speckled with short colored streaks and encoded as PNG.
//!
//! ```no_run
//! let captcha = wavecaptcha::CaptchaBuilder::new().length(5).build()?;
//! println!("{}", captcha.code);
//! # Ok::<(), wavecaptcha::CaptchaError>(())
//! ```

pub mod captcha;
pub mod code;
pub mod encode;
pub mod error;
pub mod font;
pub mod noise;
pub mod post;
pub mod render;
pub mod warp;

pub use captcha::{Captcha, CaptchaBuilder, MAX_FONT_SIZE};
pub use code::ALPHABET;
pub use error::{CaptchaError, Result};
pub use font::{FontCache, FontLoader, GlyphSource, DEFAULT_FONT};
pub use post::{PostProcess, WarpAndSpeckle};
pub use render::Layout;

/// Generate a captcha with the default configuration.
pub fn generate() -> Result<Captcha> {
    CaptchaBuilder::default().build()
}
