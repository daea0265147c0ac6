//! Windowed averaging through per-row prefix sums.
use crate::error::DetectError;
use crate::image::{ColorImage, PixelBuffer};
use rayon::prelude::*;

/// Per-row, per-channel inclusive prefix sums of an interleaved frame.
///
/// `data[(y * w + x) * c + k]` holds the sum of channel `k` over
/// `row y, columns 0..=x`.
#[derive(Clone, Debug)]
pub struct LinePrefixSums {
    pub w: usize,
    pub h: usize,
    pub channels: usize,
    pub data: Vec<u32>,
}

impl LinePrefixSums {
    pub fn compute(src: &PixelBuffer<'_>) -> Self {
        let c = src.channels;
        let mut data = vec![0u32; src.data.len()];
        if src.w > 0 {
            data.par_chunks_mut(src.w * c)
                .zip(src.data.par_chunks(src.w * c))
                .for_each(|(dst, line)| {
                    for k in 0..c {
                        let mut acc = 0u32;
                        for x in 0..src.w {
                            acc += line[x * c + k] as u32;
                            dst[x * c + k] = acc;
                        }
                    }
                });
        }
        Self {
            w: src.w,
            h: src.h,
            channels: c,
            data,
        }
    }

    /// Sum of channel `k` over columns `x0..=x1` of row `y`.
    #[inline]
    pub fn span(&self, y: usize, x0: usize, x1: usize, k: usize) -> u32 {
        let base = y * self.w * self.channels;
        let hi = self.data[base + x1 * self.channels + k];
        if x0 == 0 {
            hi
        } else {
            hi - self.data[base + (x0 - 1) * self.channels + k]
        }
    }
}

/// Average every channel over the `(2·window+1)²` neighbourhood, truncated at
/// the image border.
pub fn box_blur(src: &PixelBuffer<'_>, window: usize) -> Result<ColorImage, DetectError> {
    if window == 0 {
        return Err(DetectError::InvalidWindow);
    }
    let sums = LinePrefixSums::compute(src);
    let c = src.channels;
    let mut out = ColorImage::new(src.w, src.h, c);
    if src.w == 0 {
        return Ok(out);
    }
    out.data
        .par_chunks_mut(src.w * c)
        .enumerate()
        .for_each(|(y, row)| {
            let y0 = y.saturating_sub(window);
            let y1 = (y + window).min(src.h - 1);
            for x in 0..src.w {
                let x0 = x.saturating_sub(window);
                let x1 = (x + window).min(src.w - 1);
                let area = ((y1 - y0 + 1) * (x1 - x0 + 1)) as u32;
                for k in 0..c {
                    let sum: u32 = (y0..=y1).map(|yi| sums.span(yi, x0, x1, k)).sum();
                    row[x * c + k] = (sum / area).min(255) as u8;
                }
            }
        });
    Ok(out)
}
