//! Parameter types configuring the detector stages.
//!
//! Every stage owns its options struct; [`DetectorParams`] collects them so a
//! single JSON document can configure a run. Missing fields fall back to the
//! defaults below.

use crate::background::BackgroundOptions;
use crate::components::{ComponentLimits, FilterOptions, LabelingOptions, MergeOptions};
use crate::edges::GradientOptions;
use crate::preprocess::PreprocessOptions;
use crate::swt::SwtOptions;
use serde::Deserialize;

/// Detector-wide parameters controlling the staged pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectorParams {
    /// Enlarge / smoothing applied before gradients.
    pub preprocess: PreprocessOptions,
    /// Background estimation, only used by color-aware labeling.
    pub background: BackgroundOptions,
    pub gradient: GradientOptions,
    pub swt: SwtOptions,
    pub labeling: LabelingOptions,
    /// Caps on the component arena.
    pub limits: ComponentLimits,
    pub filter: FilterOptions,
    pub merge: MergeOptions,
    /// Size of a dedicated worker pool. `None` runs on the global rayon pool.
    pub threads: Option<usize>,
}
