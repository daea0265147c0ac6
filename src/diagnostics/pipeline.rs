use crate::components::{Component, MergeCandidate, TextRegion};
use crate::diagnostics::TimingBreakdown;
use crate::swt::StrokeWidthMap;
use serde::Serialize;

/// Outcome of one detection run.
///
/// `components` holds every aggregated component, valid or not; the length
/// of that vector is the authoritative component count. The per-pixel maps
/// are kept in memory for tools but not serialized.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Dimensions of the analysed frame (after optional enlargement).
    pub width: usize,
    pub height: usize,
    /// 2 when the input was enlarged before analysis, else 1.
    pub scale: u32,
    pub components: Vec<Component>,
    pub merge_candidates: Vec<MergeCandidate>,
    pub regions: Vec<TextRegion>,
    /// Stroke-width components before color growth, with `parent_label`
    /// set to the lowest label color growth joined them to. Empty unless
    /// color-aware labeling ran.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stroke_components: Vec<Component>,
    #[serde(skip)]
    pub stroke_widths: StrokeWidthMap,
    /// Converged coloring, one label per pixel.
    #[serde(skip)]
    pub labels: Vec<u32>,
}

impl DetectionResult {
    pub fn valid_components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.valid)
    }
}

/// Result produced by [`TextDetector::detect_with_diagnostics`](crate::TextDetector).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub result: DetectionResult,
    pub trace: PipelineTrace,
}

/// Counters and timings describing how the detector executed.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    /// Pixels kept by non-maximum suppression.
    pub edge_pixels: usize,
    /// Rays that reached an opposite edge.
    pub rays: usize,
    pub stroke_pixels: usize,
    pub sweeps: usize,
    pub components: usize,
    pub valid_components: usize,
    pub containers_removed: usize,
    /// `components_limit` cut aggregation short.
    pub components_truncated: bool,
    /// Components described by a capped sample set.
    pub sampled_components: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    /// Worker count the run used.
    pub threads: usize,
}
