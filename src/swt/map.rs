use crate::image::GrayImage;

/// Stroke width of pixels no ray has crossed.
pub const STROKE_NONE: u32 = u32::MAX;

/// Per-pixel stroke width in pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrokeWidthMap {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u32>,
}

impl StrokeWidthMap {
    /// Map with every pixel set to [`STROKE_NONE`].
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![STROKE_NONE; w * h],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn is_stroke(&self, idx: usize) -> bool {
        self.data[idx] != STROKE_NONE
    }

    pub fn stroke_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != STROKE_NONE).count()
    }

    /// Stretch stroke widths to `[1, 255]` for display; non-stroke pixels
    /// become 0.
    pub fn to_gray(&self) -> GrayImage {
        let mut out = GrayImage::new(self.w, self.h);
        let strokes = self.data.iter().copied().filter(|&v| v != STROKE_NONE);
        let (lo, hi) = strokes.fold((u32::MAX, 0u32), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if lo > hi {
            return out;
        }
        let span = (hi - lo).max(1) as f32;
        for (dst, &v) in out.data.iter_mut().zip(&self.data) {
            if v != STROKE_NONE {
                *dst = 1 + ((v - lo) as f32 / span * 254.0).round() as u8;
            }
        }
        out
    }
}
