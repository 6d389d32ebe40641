use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{RunonError, RunonResult};
use anyhow::Context;
use std::io::Cursor;
use std::path::Path;

/// Decode an encoded image (PNG, JPEG, ...) into premultiplied pixels.
pub fn decode_image(bytes: &[u8]) -> RunonResult<FrameRGBA> {
    let rgba = image::load_from_memory(bytes)
        .context("decode image from memory")?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameRGBA::from_straight(width, height, rgba.into_raw())
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> RunonResult<FrameRGBA> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

/// PNG bytes of `frame`.
pub fn encode_png(frame: &FrameRGBA) -> RunonResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight())
        .ok_or_else(|| RunonError::render("frame buffer does not match its size"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Write `frame` as a PNG file, creating parent directories.
pub fn save_png(frame: &FrameRGBA, path: &Path) -> RunonResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    let bytes = encode_png(frame)?;
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/image_io.rs"]
mod tests;
