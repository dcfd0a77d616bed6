use std::io::Cursor;

use anyhow::Context;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Generates a flat synthetic mouth scan for offline runs and tests:
/// a dark background with a lighter band of tooth-like columns.
pub fn sample_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let band = y > height / 3 && y < 2 * height.max(1) / 3;
        if band && (x / 24) % 2 == 0 {
            Rgb([222, 214, 196])
        } else if band {
            Rgb([200, 188, 170])
        } else {
            Rgb([70, 48, 46])
        }
    })
}

/// Encodes an image the way the client uploads it.
pub fn encode_png(image: &RgbImage) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("encoding sample image")?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_image_has_the_requested_shape() {
        let image = sample_image(96, 60);
        assert_eq!(image.dimensions(), (96, 60));
        assert_ne!(image.get_pixel(0, 0), image.get_pixel(0, 30));
    }

    #[test]
    fn encoded_sample_round_trips_through_the_decoder() {
        let bytes = encode_png(&sample_image(48, 32)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.to_rgb8().dimensions(), (48, 32));
    }
}
