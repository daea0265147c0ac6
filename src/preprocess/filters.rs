//! Separable smoothing filters over interleaved frames.
use crate::image::{ColorImage, PixelBuffer};
use rayon::prelude::*;

/// Trait implemented by separable 1D filters.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order, odd length).
    fn taps(&self) -> &[f32];
}

/// Simple wrapper around a static filter kernel.
#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f32],
}

impl Default for StaticSeparableFilter {
    fn default() -> Self {
        GAUSSIAN_3TAP
    }
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f32]) -> Self {
        Self { taps }
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        self.taps
    }
}

/// Normalised 3-tap Gaussian filter `[1, 2, 1] / 4`.
pub const GAUSSIAN_3TAP: StaticSeparableFilter = StaticSeparableFilter::new(&[0.25, 0.5, 0.25]);

/// 3×3 Gaussian smoothing.
pub fn gauss3(src: &PixelBuffer<'_>) -> ColorImage {
    apply(&GAUSSIAN_3TAP, src)
}

/// Convolve rows then columns with `filter`.
///
/// The kernel centre is clamped to the interior so that the taps never leave
/// the frame: border pixels take the value of their innermost neighbour's
/// window, the same rule the 3×3 Sobel kernel uses.
pub fn apply(filter: &dyn SeparableFilter, src: &PixelBuffer<'_>) -> ColorImage {
    let taps = filter.taps();
    let (w, h, c) = (src.w, src.h, src.channels);
    let mut out = ColorImage::new(w, h, c);
    if w == 0 || h == 0 {
        return out;
    }
    let line = w * c;

    let mut tmp = vec![0f32; w * h * c];
    tmp.par_chunks_mut(line).enumerate().for_each(|(y, row)| {
        let s = src.row(y);
        for x in 0..w {
            let taps_x = window(x, w, taps.len());
            for k in 0..c {
                row[x * c + k] = taps
                    .iter()
                    .zip(taps_x.clone())
                    .map(|(t, sx)| t * s[sx * c + k] as f32)
                    .sum();
            }
        }
    });

    out.data.par_chunks_mut(line).enumerate().for_each(|(y, row)| {
        let rows: Vec<usize> = window(y, h, taps.len()).collect();
        for i in 0..line {
            let v: f32 = taps
                .iter()
                .zip(&rows)
                .map(|(t, &sy)| t * tmp[sy * line + i])
                .sum();
            row[i] = v.round().clamp(0.0, 255.0) as u8;
        }
    });
    out
}

/// Sample positions for a kernel of `len` taps centred at `i`.
fn window(i: usize, n: usize, len: usize) -> impl Iterator<Item = usize> + Clone {
    let r = len / 2;
    let centre = if n > 2 * r { i.clamp(r, n - 1 - r) } else { i };
    (0..len).map(move |t| (centre + t).saturating_sub(r).min(n - 1))
}
