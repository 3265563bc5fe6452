use std::io::Cursor;

use anyhow::{anyhow, Context, Result};
use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use image::{DynamicImage, GenericImageView, ImageFormat};

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let format = image::guess_format(bytes).ok();

    if format == Some(ImageFormat::Gif) {
        let decoder =
            GifDecoder::new(Cursor::new(bytes)).context("Failed to decode GIF")?;
        let mut frames = decoder.into_frames();
        if let Some(frame) = frames.next() {
            let frame = frame.context("Failed to decode GIF frame")?;
            return Ok(DynamicImage::ImageRgba8(frame.into_buffer()));
        }
        return Err(anyhow!("GIF has no frames"));
    }

    match format {
        Some(fmt) => {
            image::load_from_memory_with_format(bytes, fmt).context("Failed to decode image")
        }
        None => image::load_from_memory(bytes).context("Failed to decode image"),
    }
}

/// Decodes the whole image and returns its size. Truncated or corrupt pixel
/// data fails even when the header is intact.
pub fn decoded_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let (width, height) = decode_image(bytes)?.dimensions();
    if width == 0 || height == 0 {
        return Err(anyhow!("Image has zero area ({}x{})", width, height));
    }
    Ok((width, height))
}

/// Decodes and downsizes to fit `max_side`, returning RGBA bytes.
pub fn decode_preview(bytes: &[u8], max_side: u32) -> Result<(Vec<u8>, u32, u32)> {
    let img = decode_image(bytes)?;
    let resized = img.thumbnail(max_side, max_side);
    let (width, height) = resized.dimensions();
    let rgba = resized.to_rgba8().into_raw();
    Ok((rgba, width.max(1), height.max(1)))
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0x1a, 0x1a, 0x1a, 0xff]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
