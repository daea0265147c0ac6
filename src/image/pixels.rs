//! Interleaved multi-channel pixel storage.
//!
//! The detector consumes a packed `width × height × channels` byte buffer
//! (typically RGBA). `PixelBuffer` validates that contract once so that the
//! stages can index without re-checking lengths.
use crate::error::DetectError;

/// Borrowed interleaved frame, immutable for the duration of a detection run.
#[derive(Clone, Copy, Debug)]
pub struct PixelBuffer<'a> {
    pub w: usize,
    pub h: usize,
    pub channels: usize,
    pub data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    /// Wrap `data` after checking channel count and buffer length.
    ///
    /// Dimensions are not constrained here; stages that need a 3×3
    /// neighbourhood reject smaller frames themselves.
    pub fn new(
        data: &'a [u8],
        w: usize,
        h: usize,
        channels: usize,
    ) -> Result<Self, DetectError> {
        if channels == 0 {
            return Err(DetectError::InvalidChannels(channels));
        }
        let expected = w * h * channels;
        if data.len() != expected {
            return Err(DetectError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            w,
            h,
            channels,
            data,
        })
    }

    /// Number of pixels in the frame.
    #[inline]
    pub fn len(&self) -> usize {
        self.w * self.h
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Channel samples of pixel (x, y).
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &'a [u8] {
        self.pixel_at(y * self.w + x)
    }

    /// Channel samples of the pixel with linear index `idx`.
    #[inline]
    pub fn pixel_at(&self, idx: usize) -> &'a [u8] {
        let start = idx * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Interleaved bytes of row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let len = self.w * self.channels;
        &self.data[y * len..(y + 1) * len]
    }
}

/// Owned interleaved image with the same layout as [`PixelBuffer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorImage {
    pub w: usize,
    pub h: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

impl ColorImage {
    /// Zero-filled image.
    pub fn new(w: usize, h: usize, channels: usize) -> Self {
        Self {
            w,
            h,
            channels,
            data: vec![0; w * h * channels],
        }
    }

    /// Copy a borrowed frame into owned storage.
    pub fn from_buffer(src: &PixelBuffer<'_>) -> Self {
        Self {
            w: src.w,
            h: src.h,
            channels: src.channels,
            data: src.data.to_vec(),
        }
    }

    /// Borrow as a [`PixelBuffer`]; the layout invariant holds by construction.
    pub fn as_buffer(&self) -> PixelBuffer<'_> {
        PixelBuffer {
            w: self.w,
            h: self.h,
            channels: self.channels,
            data: &self.data,
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let start = (y * self.w + x) * self.channels;
        &self.data[start..start + self.channels]
    }
}
