//! Multi-channel Sobel gradients with angle and neighbour quantization.
//!
//! - Convolves every channel with a 3×3 or 5×5 kernel pair and keeps, per
//!   axis, the channel response with the largest absolute value. `dx` and
//!   `dy` may therefore come from different channels.
//! - Responses are normalised by the absolute weight sum of one kernel.
//! - The angle is `atan2(dy, -dx)` expressed in degrees over `[0, 360)`.
//!
//! Complexity: O(W·H·C·K²) per pass; memory: four float planes plus 5 bytes
//! of neighbour info per pixel.
use super::options::SobelKernel;
use crate::error::{ensure_frame, DetectError};
use crate::image::{ImageF32, PixelBuffer};
use rayon::prelude::*;

type Kernel3 = [[f32; 3]; 3];
type Kernel5 = [[f32; 5]; 5];

const SOBEL3_X: Kernel3 = [[1.0, 0.0, -1.0], [2.0, 0.0, -2.0], [1.0, 0.0, -1.0]];
const SOBEL3_Y: Kernel3 = [[1.0, 2.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -2.0, -1.0]];
const SOBEL3_NORM: f32 = 8.0;

const SOBEL5_X: Kernel5 = [
    [1.0, 2.0, 0.0, -2.0, -1.0],
    [4.0, 8.0, 0.0, -8.0, -4.0],
    [6.0, 12.0, 0.0, -12.0, -6.0],
    [4.0, 8.0, 0.0, -8.0, -4.0],
    [1.0, 2.0, 0.0, -2.0, -1.0],
];
const SOBEL5_Y: Kernel5 = [
    [1.0, 4.0, 6.0, 4.0, 1.0],
    [2.0, 8.0, 12.0, 8.0, 2.0],
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [-2.0, -8.0, -12.0, -8.0, -2.0],
    [-1.0, -4.0, -6.0, -4.0, -1.0],
];
// Sum of absolute weights, as 8 is for the 3x3 kernel; keeps both kernels'
// magnitudes comparable against the fixed NMS threshold.
const SOBEL5_NORM: f32 = 96.0;

/// Compass offsets `(dx, dy)` indexed by quantized direction, counter-clockwise
/// from east with `y` growing downwards.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),   // E
    (1, -1),  // NE
    (0, -1),  // N
    (-1, -1), // NW
    (-1, 0),  // W
    (-1, 1),  // SW
    (0, 1),   // S
    (1, 1),   // SE
];

/// Quantized gradient direction spread over adjacent compass neighbours.
///
/// Neighbour `i < count` is `direction - i` (mod 8) with weight `weights[i]`;
/// weights sum to 100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighborInfo {
    pub direction: u8,
    pub count: u8,
    pub weights: [u8; 3],
}

impl NeighborInfo {
    /// Quantize an angle in degrees `[0, 360)`.
    pub fn from_angle(angle: f32) -> Self {
        let mut a = angle + 11.25;
        if a >= 360.0 {
            a -= 360.0;
        }
        let bucket = (a / 22.5).ceil() as u8;
        let direction = ((a / 45.0).ceil() as u8) % 8;
        if bucket % 2 == 1 {
            Self {
                direction,
                count: 3,
                weights: [25, 50, 25],
            }
        } else {
            Self {
                direction,
                count: 2,
                weights: [50, 50, 0],
            }
        }
    }

    /// Iterate `(offset, weight)` pairs of the contributing neighbours.
    pub fn taps(&self) -> impl Iterator<Item = ((i32, i32), f32)> + '_ {
        (0..self.count as usize).map(move |i| {
            let n = (self.direction as usize + 8 - i) % 8;
            (NEIGHBOR_OFFSETS[n], self.weights[i] as f32)
        })
    }
}

/// Per-pixel gradient buffers.
#[derive(Clone, Debug)]
pub struct GradientField {
    /// Horizontal derivative (left minus right)
    pub dx: ImageF32,
    /// Vertical derivative (top minus bottom)
    pub dy: ImageF32,
    /// Euclidean magnitude `sqrt(dx^2 + dy^2)`
    pub magnitude: ImageF32,
    /// Gradient angle in degrees, `[0, 360)`
    pub angle: ImageF32,
    pub neighbors: Vec<NeighborInfo>,
}

impl GradientField {
    #[inline]
    pub fn width(&self) -> usize {
        self.dx.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dx.h
    }
}

/// Map a gradient vector to degrees in `[0, 360)`.
#[inline]
pub fn gradient_angle(dx: f32, dy: f32) -> f32 {
    let turns = (dy.atan2(-dx) / std::f32::consts::PI + 2.0).rem_euclid(2.0);
    turns * 180.0
}

/// Compute gradients of `src` with the requested kernel.
///
/// Rejects frames smaller than 3×3.
pub fn compute_gradients(
    src: &PixelBuffer<'_>,
    kernel: SobelKernel,
) -> Result<GradientField, DetectError> {
    ensure_frame(src.w, src.h)?;
    let (w, h) = (src.w, src.h);
    let mut dx = ImageF32::new(w, h);
    let mut dy = ImageF32::new(w, h);

    dx.data
        .par_chunks_mut(w)
        .zip(dy.data.par_chunks_mut(w))
        .enumerate()
        .for_each(|(y, (row_x, row_y))| {
            for x in 0..w {
                let (gx, gy) = match kernel {
                    SobelKernel::Sobel3 => sobel3_at(src, x, y),
                    SobelKernel::Sobel5 => sobel5_at(src, x, y),
                };
                row_x[x] = gx;
                row_y[x] = gy;
            }
        });

    let magnitude: Vec<f32> = dx
        .data
        .par_iter()
        .zip(&dy.data)
        .map(|(&gx, &gy)| (gx * gx + gy * gy).sqrt())
        .collect();
    let angle: Vec<f32> = dx
        .data
        .par_iter()
        .zip(&dy.data)
        .map(|(&gx, &gy)| gradient_angle(gx, gy))
        .collect();
    let neighbors = angle
        .par_iter()
        .map(|&a| NeighborInfo::from_angle(a))
        .collect();

    Ok(GradientField {
        dx,
        dy,
        magnitude: ImageF32::from_vec(w, h, magnitude),
        angle: ImageF32::from_vec(w, h, angle),
        neighbors,
    })
}

/// Keep the per-axis response with the largest magnitude across channels.
#[inline]
fn strongest(best: &mut (f32, f32), gx: f32, gy: f32) {
    if gx.abs() > best.0.abs() {
        best.0 = gx;
    }
    if gy.abs() > best.1.abs() {
        best.1 = gy;
    }
}

fn sobel3_at(src: &PixelBuffer<'_>, x: usize, y: usize) -> (f32, f32) {
    // centre clamped to the interior so every tap is in bounds
    let cx = x.clamp(1, src.w - 2);
    let cy = y.clamp(1, src.h - 2);
    let mut best = (0.0f32, 0.0f32);
    for c in 0..src.channels {
        let (mut gx, mut gy) = (0.0f32, 0.0f32);
        for (ky, (kx_row, ky_row)) in SOBEL3_X.iter().zip(&SOBEL3_Y).enumerate() {
            let row = src.row(cy + ky - 1);
            for k in 0..3 {
                let v = row[(cx + k - 1) * src.channels + c] as f32;
                gx += v * kx_row[k];
                gy += v * ky_row[k];
            }
        }
        strongest(&mut best, gx / SOBEL3_NORM, gy / SOBEL3_NORM);
    }
    best
}

fn sobel5_at(src: &PixelBuffer<'_>, x: usize, y: usize) -> (f32, f32) {
    let mut best = (0.0f32, 0.0f32);
    for c in 0..src.channels {
        let (mut gx, mut gy) = (0.0f32, 0.0f32);
        for (ky, (kx_row, ky_row)) in SOBEL5_X.iter().zip(&SOBEL5_Y).enumerate() {
            let sy = (y + ky).saturating_sub(2).min(src.h - 1);
            let row = src.row(sy);
            for k in 0..5 {
                let sx = (x + k).saturating_sub(2).min(src.w - 1);
                let v = row[sx * src.channels + c] as f32;
                gx += v * kx_row[k];
                gy += v * ky_row[k];
            }
        }
        strongest(&mut best, gx / SOBEL5_NORM, gy / SOBEL5_NORM);
    }
    best
}
