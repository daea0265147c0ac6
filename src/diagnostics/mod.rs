//! Diagnostics data model returned alongside detection results.
//!
//! `DetectionReport` bundles the [`DetectionResult`] with a `PipelineTrace`
//! of per-stage timings and counters.

pub mod pipeline;
pub mod timing;

pub use pipeline::{DetectionReport, DetectionResult, InputDescriptor, PipelineTrace};
pub use timing::{StageTiming, TimingBreakdown};
