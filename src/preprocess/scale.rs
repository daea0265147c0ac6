//! 2× upscaling used to give thin strokes enough pixels for ray marching.
use crate::image::{ColorImage, PixelBuffer};
use rayon::prelude::*;

/// Double both dimensions by pixel replication.
pub fn enlarge2(src: &PixelBuffer<'_>) -> ColorImage {
    enlarge(src, false)
}

/// Double both dimensions; odd output samples average the source pixel with
/// its right, lower or diagonal neighbour (clamped at the border).
pub fn enlarge2_interpolated(src: &PixelBuffer<'_>) -> ColorImage {
    enlarge(src, true)
}

fn enlarge(src: &PixelBuffer<'_>, interpolate: bool) -> ColorImage {
    let c = src.channels;
    let ow = src.w * 2;
    let mut out = ColorImage::new(ow, src.h * 2, c);
    if ow == 0 {
        return out;
    }
    out.data
        .par_chunks_mut(ow * c)
        .enumerate()
        .for_each(|(oy, row)| {
            let y = oy / 2;
            let ny = (y + 1).min(src.h - 1);
            for ox in 0..ow {
                let x = ox / 2;
                let base = src.pixel(x, y);
                let dst = &mut row[ox * c..(ox + 1) * c];
                if !interpolate {
                    dst.copy_from_slice(base);
                    continue;
                }
                let nx = (x + 1).min(src.w - 1);
                let other = match (ox & 1, oy & 1) {
                    (0, 0) => base,
                    (1, 0) => src.pixel(nx, y),
                    (0, 1) => src.pixel(x, ny),
                    _ => src.pixel(nx, ny),
                };
                for k in 0..c {
                    dst[k] = ((base[k] as u16 + other[k] as u16) >> 1) as u8;
                }
            }
        });
    out
}
