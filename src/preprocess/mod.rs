//! Optional smoothing and resampling applied before the detection stages.
//!
//! All operators act on interleaved byte frames and saturate to `[0, 255]`.
pub mod blur;
pub mod filters;
pub mod options;
pub mod scale;

pub use blur::{box_blur, LinePrefixSums};
pub use filters::{gauss3, SeparableFilter, StaticSeparableFilter, GAUSSIAN_3TAP};
pub use options::{EnlargeMode, PreprocessOptions};
pub use scale::{enlarge2, enlarge2_interpolated};

use crate::error::DetectError;
use crate::image::{ColorImage, PixelBuffer};

/// Apply the configured preprocessing chain (enlarge, then Gaussian, then box
/// blur). Returns `None` when no step is enabled so callers can keep using
/// the borrowed input.
pub fn preprocess(
    src: &PixelBuffer<'_>,
    opts: &PreprocessOptions,
) -> Result<Option<ColorImage>, DetectError> {
    let mut current: Option<ColorImage> = None;
    match opts.enlarge {
        EnlargeMode::None => {}
        EnlargeMode::Nearest => current = Some(enlarge2(src)),
        EnlargeMode::Interpolated => current = Some(enlarge2_interpolated(src)),
    }
    if opts.gaussian {
        let next = match &current {
            Some(img) => gauss3(&img.as_buffer()),
            None => gauss3(src),
        };
        current = Some(next);
    }
    if let Some(window) = opts.box_blur {
        let next = match &current {
            Some(img) => box_blur(&img.as_buffer(), window)?,
            None => box_blur(src, window)?,
        };
        current = Some(next);
    }
    Ok(current)
}
