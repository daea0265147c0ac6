//! Non-maximum suppression along the quantized gradient direction.
//!
//! Each interior pixel whose magnitude reaches [`MAGNITUDE_THRESHOLD`] is
//! compared against two weighted magnitude estimates, one on each side of
//! the pixel along its gradient. The estimates blend up to three compass
//! neighbours using the weights from [`NeighborInfo`](super::NeighborInfo),
//! which avoids the staircase artefacts of a hard 4-direction NMS.
//!
//! The outermost 1-pixel frame is always suppressed.
use super::grad::GradientField;
use crate::image::{ImageF32, ImageView};
use rayon::prelude::*;
use serde::Serialize;

/// Minimum gradient magnitude considered as an edge candidate.
pub const MAGNITUDE_THRESHOLD: f32 = 15.0;

/// A sparse edge sample suitable for ray casting and tooling output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeElement {
    /// X coordinate in pixels
    pub x: u32,
    /// Y coordinate in pixels
    pub y: u32,
    /// Gradient magnitude at (x, y)
    pub magnitude: f32,
    /// Gradient angle in degrees, `[0, 360)`
    pub angle: f32,
}

/// Dense edge map: the gradient magnitude where the pixel is a local maximum
/// along its gradient, zero elsewhere.
pub fn non_maximum_suppression(grad: &GradientField) -> ImageF32 {
    let (w, h) = (grad.width(), grad.height());
    let mut out = ImageF32::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }
    let mag = &grad.magnitude;

    out.data
        .par_chunks_mut(w)
        .enumerate()
        .skip(1)
        .take(h - 2)
        .for_each(|(y, row)| {
            let mag_row = mag.row(y);
            for x in 1..w - 1 {
                let g = mag_row[x];
                if g < MAGNITUDE_THRESHOLD {
                    continue;
                }
                let info = &grad.neighbors[y * w + x];
                let (mut g1, mut g2) = (0.0f32, 0.0f32);
                for ((ox, oy), weight) in info.taps() {
                    let (x1, y1) = ((x as i32 + ox) as usize, (y as i32 + oy) as usize);
                    let (x2, y2) = ((x as i32 - ox) as usize, (y as i32 - oy) as usize);
                    g1 += weight * mag.get(x1, y1);
                    g2 += weight * mag.get(x2, y2);
                }
                g1 *= 0.01;
                g2 *= 0.01;
                if g >= g1 && g >= g2 {
                    row[x] = g;
                }
            }
        });
    out
}

/// Edge pixels of `edges` in scanline order.
pub fn collect_edges(edges: &ImageF32, grad: &GradientField) -> Vec<EdgeElement> {
    let mut out = Vec::new();
    for (y, row) in edges.rows().enumerate() {
        for (x, &m) in row.iter().enumerate() {
            if m > 0.0 {
                out.push(EdgeElement {
                    x: x as u32,
                    y: y as u32,
                    magnitude: m,
                    angle: grad.angle.get(x, y),
                });
            }
        }
    }
    out
}
