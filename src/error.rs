//! Error type shared by every validating entry point of the pipeline.
//!
//! Bound violations inside a ray walk are not represented here: they indicate
//! a logic error and abort with a panic instead.
use thiserror::Error;

/// Failure modes of the detection stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    /// Width or height below the 3×3 minimum required by the kernels.
    #[error("image must be at least 3x3 pixels, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Zero channels per pixel.
    #[error("pixel buffer must have at least one channel, got {0}")]
    InvalidChannels(usize),
    /// Buffer length does not match `width * height * channels`.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
    /// Labels are `u32` and non-stroke pixels are offset by the pixel count.
    #[error("image with {pixels} pixels exceeds the labelable size")]
    ImageTooLarge { pixels: usize },
    /// Windowed operations need a radius of at least one pixel.
    #[error("window size must be positive")]
    InvalidWindow,
    /// Rays need room for at least one step past the neighbouring edge.
    #[error("ray length must be at least 2, got {0}")]
    InvalidRayLength(usize),
    /// The caller raised the cancellation flag; labeling stopped at a sweep boundary.
    #[error("labeling cancelled after {sweeps} sweeps")]
    Cancelled { sweeps: usize },
    /// A dedicated worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Check the frame contract shared by the gradient and SWT entry points.
pub(crate) fn ensure_frame(width: usize, height: usize) -> Result<(), DetectError> {
    if width < 3 || height < 3 {
        return Err(DetectError::InvalidDimensions { width, height });
    }
    let pixels = width * height;
    if pixels > (u32::MAX / 2) as usize {
        return Err(DetectError::ImageTooLarge { pixels });
    }
    Ok(())
}
