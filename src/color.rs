//! Luma conversion and per-channel color similarity.
//!
//! Every comparison works on raw channel slices so that it can be used on
//! input frames, background estimates and component averages alike.
use crate::image::{GrayImage, PixelBuffer};
use rayon::prelude::*;

/// BT.709 weights for R, G, B. Alpha and further channels carry no weight.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Luma of a single pixel, saturated to `[0, 255]`.
///
/// Single- and two-channel pixels are treated as already gray.
#[inline]
pub fn luma(px: &[u8]) -> u8 {
    if px.len() < 3 {
        return px[0];
    }
    let g = px[0] as f32 * LUMA_WEIGHTS[0]
        + px[1] as f32 * LUMA_WEIGHTS[1]
        + px[2] as f32 * LUMA_WEIGHTS[2];
    g.min(255.0) as u8
}

/// Integer mean of the first three channels.
#[inline]
pub fn mean_intensity(px: &[u8]) -> u8 {
    if px.len() < 3 {
        return px[0];
    }
    let sum = px[0] as u32 + px[1] as u32 + px[2] as u32;
    (sum / 3).min(255) as u8
}

/// BT.709 grayscale of the whole frame.
pub fn grayscale(src: &PixelBuffer<'_>) -> GrayImage {
    map_pixels(src, luma)
}

/// Channel-mean grayscale of the whole frame.
pub fn grayscale_mean(src: &PixelBuffer<'_>) -> GrayImage {
    map_pixels(src, mean_intensity)
}

fn map_pixels(src: &PixelBuffer<'_>, f: fn(&[u8]) -> u8) -> GrayImage {
    let mut out = GrayImage::new(src.w, src.h);
    if src.w == 0 {
        return out;
    }
    out.data
        .par_chunks_mut(src.w)
        .enumerate()
        .for_each(|(y, row)| {
            let line = src.row(y);
            for (dst, px) in row.iter_mut().zip(line.chunks_exact(src.channels)) {
                *dst = f(px);
            }
        });
    out
}

/// `true` when no channel differs by more than `tolerance`.
#[inline]
pub fn same_color(a: &[u8], b: &[u8], tolerance: u8) -> bool {
    a.iter()
        .zip(b)
        .all(|(&p, &q)| p.abs_diff(q) <= tolerance)
}

/// Like [`same_color`], additionally returning the summed absolute channel
/// difference when the colors match.
#[inline]
pub fn color_difference(a: &[u8], b: &[u8], tolerance: u8) -> Option<u32> {
    let mut total = 0u32;
    for (&p, &q) in a.iter().zip(b) {
        let d = p.abs_diff(q);
        if d > tolerance {
            return None;
        }
        total += d as u32;
    }
    Some(total)
}
