use super::options::BackgroundOptions;
use super::sort::merge_sort_pairs;
use crate::color::same_color;
use crate::error::DetectError;
use crate::image::{ColorImage, ImageU8, ImageView, PixelBuffer};
use log::debug;
use rayon::prelude::*;
use std::time::Instant;

/// Per-worker buffers sized to one window.
struct Scratch {
    gray: Vec<u8>,
    index: Vec<u32>,
    gray_buf: Vec<u8>,
    index_buf: Vec<u32>,
}

impl Scratch {
    fn new(area: usize) -> Self {
        Self {
            gray: vec![0; area],
            index: vec![0; area],
            gray_buf: vec![0; area],
            index_buf: vec![0; area],
        }
    }
}

/// Estimate the dominant surrounding color of every pixel.
///
/// `gray` must be the luma of `src`. The window is truncated at the image
/// border, so edge pixels vote over fewer samples.
pub fn estimate_background(
    src: &PixelBuffer<'_>,
    gray: &ImageU8<'_>,
    opts: &BackgroundOptions,
) -> Result<ColorImage, DetectError> {
    if opts.window == 0 {
        return Err(DetectError::InvalidWindow);
    }
    if gray.width() != src.w || gray.height() != src.h {
        return Err(DetectError::BufferSizeMismatch {
            expected: src.len(),
            actual: gray.width() * gray.height(),
        });
    }
    let t0 = Instant::now();
    let side = 2 * opts.window + 1;
    let area = side * side;
    let c = src.channels;
    let mut out = ColorImage::new(src.w, src.h, c);
    if src.is_empty() {
        return Ok(out);
    }

    out.data
        .par_chunks_mut(src.w * c)
        .enumerate()
        .for_each_init(
            || Scratch::new(area),
            |scratch, (y, row)| {
                for x in 0..src.w {
                    let winner = dominant_sample(src, gray, opts, x, y, area / 2, scratch);
                    row[x * c..(x + 1) * c].copy_from_slice(src.pixel_at(winner));
                }
            },
        );

    debug!(
        "background: {}x{} window={} took {:.3} ms",
        src.w,
        src.h,
        side,
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(out)
}

/// Linear index of the representative of the largest color cluster around
/// `(x, y)`.
fn dominant_sample(
    src: &PixelBuffer<'_>,
    gray: &ImageU8<'_>,
    opts: &BackgroundOptions,
    x: usize,
    y: usize,
    early_exit: usize,
    s: &mut Scratch,
) -> usize {
    let r = opts.window;
    let mut n = 0;
    for yn in y.saturating_sub(r)..=(y + r).min(src.h - 1) {
        for xn in x.saturating_sub(r)..=(x + r).min(src.w - 1) {
            s.gray[n] = gray.get(xn, yn);
            s.index[n] = (yn * src.w + xn) as u32;
            n += 1;
        }
    }
    merge_sort_pairs(
        &mut s.gray[..n],
        &mut s.index[..n],
        &mut s.gray_buf,
        &mut s.index_buf,
    );

    let (mut j0, mut j1) = (0usize, 0usize);
    let (mut best, mut best_k) = (0usize, 0usize);
    for k in 0..n {
        j0 = j0.max(k);
        j1 = j1.max(j0);
        let g0 = s.gray[k];
        while j1 + 1 < n && s.gray[j1 + 1].abs_diff(g0) < opts.gray_tolerance {
            j1 += 1;
        }

        let p0 = src.pixel_at(s.index[k] as usize);
        // an identical predecessor scores the same cluster
        if k > 0 && same_color(p0, src.pixel_at(s.index[k - 1] as usize), 0) {
            continue;
        }

        let hits = (j0..=j1)
            .filter(|&j| {
                j == k || same_color(p0, src.pixel_at(s.index[j] as usize), opts.color_tolerance)
            })
            .count();
        if hits > best {
            best = hits;
            best_k = k;
            if hits > early_exit {
                break;
            }
        }
    }
    s.index[best_k] as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::grayscale;

    #[test]
    fn majority_color_wins() {
        // 5x5 white frame with a dark 2x2 blob in one corner
        let mut data = vec![255u8; 5 * 5 * 4];
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let i = (y * 5 + x) * 4;
            data[i..i + 3].copy_from_slice(&[0, 0, 0]);
        }
        let buf = PixelBuffer::new(&data, 5, 5, 4).unwrap();
        let gray = grayscale(&buf);
        let bg = estimate_background(&buf, &gray.as_view(), &BackgroundOptions::default())
            .unwrap();
        assert_eq!(bg.pixel(0, 0), &[255, 255, 255, 255]);
        assert_eq!(bg.pixel(4, 4), &[255, 255, 255, 255]);
    }

    #[test]
    fn small_window_keeps_local_color() {
        // radius 1 around the blob corner sees 4 dark of 4 samples
        let mut data = vec![255u8; 6 * 6];
        for i in [0, 1, 6, 7] {
            data[i] = 0;
        }
        let buf = PixelBuffer::new(&data, 6, 6, 1).unwrap();
        let gray = grayscale(&buf);
        let opts = BackgroundOptions {
            window: 1,
            ..Default::default()
        };
        let bg = estimate_background(&buf, &gray.as_view(), &opts).unwrap();
        assert_eq!(bg.pixel(0, 0), &[0]);
        assert_eq!(bg.pixel(5, 5), &[255]);
    }

    #[test]
    fn zero_window_is_rejected() {
        let data = vec![0u8; 9];
        let buf = PixelBuffer::new(&data, 3, 3, 1).unwrap();
        let gray = grayscale(&buf);
        let opts = BackgroundOptions {
            window: 0,
            ..Default::default()
        };
        assert_eq!(
            estimate_background(&buf, &gray.as_view(), &opts).unwrap_err(),
            DetectError::InvalidWindow
        );
    }
}
