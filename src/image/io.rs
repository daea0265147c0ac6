//! I/O helpers for the tools: image decode/encode and JSON.
//!
//! - `load_rgba_image`: read a PNG/JPEG into an owned 4-channel buffer.
//! - `save_grayscale_f32`: write an `ImageF32` to a grayscale PNG, stretching
//!   its value range to bytes.
//! - `save_grayscale_u8`: write an owned 8-bit gray buffer to a PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
//!
//! The detection core never calls into this module.
use super::{ColorImage, GrayImage, ImageF32, ImageView};
use image::{ImageBuffer, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert to interleaved RGBA bytes.
pub fn load_rgba_image(path: &Path) -> Result<ColorImage, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_rgba8();
    let w = img.width() as usize;
    let h = img.height() as usize;
    Ok(ColorImage {
        w,
        h,
        channels: 4,
        data: img.into_raw(),
    })
}

/// Save a float image to a grayscale PNG, mapping `[min, max]` onto `[0, 255]`.
///
/// A constant image is written black.
pub fn save_grayscale_f32(image: &ImageF32, path: &Path) -> Result<(), String> {
    let mut out = GrayImage::new(image.w, image.h);
    if let Some((lo, hi)) = image.value_range().filter(|(lo, hi)| hi > lo) {
        let span = hi - lo;
        for (y, row) in image.rows().enumerate() {
            for (x, &px) in row.iter().enumerate() {
                let v = ((px - lo) / span * 255.0).round().clamp(0.0, 255.0);
                out.data[y * image.w + x] = v as u8;
            }
        }
    }
    save_grayscale_u8(&out, path)
}

/// Save an 8-bit grayscale buffer to a PNG.
pub fn save_grayscale_u8(buffer: &GrayImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let image: ImageBuffer<Luma<u8>, Vec<u8>> =
        ImageBuffer::from_raw(buffer.w as u32, buffer.h as u32, buffer.data.clone())
            .ok_or_else(|| "Failed to create image buffer".to_string())?;
    image
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
