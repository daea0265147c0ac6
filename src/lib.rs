#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod image;

// Stage modules – public for tools and experiments, considered internals.
pub mod background;
pub mod color;
pub mod components;
pub mod config;
pub mod edges;
pub mod preprocess;
pub mod swt;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector + results.
pub use crate::detector::{DetectorParams, TextDetector};
pub use crate::error::DetectError;

// Results and diagnostics returned by the detector.
pub use crate::components::{Bounds, Component, TextRegion};
pub use crate::diagnostics::{DetectionReport, DetectionResult, PipelineTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use text_detector::prelude::*;
///
/// # fn main() -> Result<(), DetectError> {
/// let (w, h) = (64usize, 48usize);
/// let rgba = vec![255u8; w * h * 4];
/// let frame = PixelBuffer::new(&rgba, w, h, 4)?;
///
/// let det = TextDetector::new(DetectorParams::default())?;
/// let result = det.detect(&frame)?;
/// println!("components={}", result.components.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::PixelBuffer;
    pub use crate::{DetectError, DetectionResult, DetectorParams, TextDetector};
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Stage runners.
    pub use crate::background::estimate_background;
    pub use crate::components::{
        aggregate, apply_filter, commit_merges, index_valid, merge_candidates, remove_containers,
        Coloring, ColorSimilarityRule, Labeler, StrokeWidthRule,
    };
    pub use crate::edges::{compute_gradients, non_maximum_suppression};
    pub use crate::preprocess::preprocess;
    pub use crate::swt::{stroke_width_transform, stroke_width_transform_both};

    // Structured diagnostics types.
    pub use crate::diagnostics::{InputDescriptor, StageTiming, TimingBreakdown};
}
