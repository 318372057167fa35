use std::io::Cursor;

use image::RgbaImage;

use crate::error::Result;

/// Serialize the canvas as an RGBA PNG.
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};

    #[test]
    fn test_png_preserves_pixels() {
        let mut canvas = RgbaImage::from_pixel(13, 7, Rgba([1, 2, 3, 255]));
        canvas.put_pixel(12, 6, Rgba([200, 100, 50, 128]));

        let bytes = encode_png(&canvas).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (13, 7));
        assert_eq!(decoded.to_rgba8(), canvas);
    }
}
