//! Text detector orchestrating the staged Stroke Width Transform pipeline.
//!
//! Stages, in order:
//! - optional preprocessing (2× enlarge, Gaussian, box blur);
//! - background estimation, only when color-aware labeling is enabled;
//! - Sobel gradients with quantized neighbour directions, then non-maximum
//!   suppression;
//! - the stroke width transform in the configured direction;
//! - lock-free relaxation labeling of stroke pixels;
//! - component aggregation, heuristic filtering, container removal and
//!   proximity merging.
//!
//! Modules
//! - [`params`] – configuration types used by the detector and CLI.
//! - `pipeline` – the [`TextDetector`] implementation.

pub mod params;
mod pipeline;

pub use params::DetectorParams;
pub use pipeline::TextDetector;
