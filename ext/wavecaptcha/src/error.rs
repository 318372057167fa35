//! Error types for captcha generation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CaptchaError>;

/// Every stage of the pipeline fails with one of these; nothing is retried.
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("failed to read font file {path}: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font file {path}")]
    ResourceParse { path: PathBuf },

    #[error("no glyph for {ch:?} at {size}pt")]
    Glyph { ch: char, size: f32 },

    #[error("failed to encode captcha image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("invalid captcha config: {0}")]
    InvalidConfig(String),
}

impl CaptchaError {
    /// True for failures to read or parse the font file.
    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource { .. } | Self::ResourceParse { .. })
    }
}
