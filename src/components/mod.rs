//! Connected components over the stroke-width map: labeling, statistics,
//! filtering and spatial merging.
pub mod aggregate;
mod atomic;
pub mod component;
pub mod filter;
pub mod labeling;
pub mod merge;
pub mod options;
pub mod spatial;

pub use aggregate::aggregate;
pub use atomic::{atomic_max, atomic_min};
pub use component::{Component, ComponentSet, MAX_CHANNELS, NO_COMPONENT};
pub use filter::{
    apply_filter, classify, FilterMode, FilterOptions, FilterProfile, FilterThresholds, Rejection,
};
pub use labeling::{
    stroke_compatible, BackgroundScale, Coloring, ColorSimilarityRule, Labeler, MergeLinks,
    NeighborRule, StrokeWidthRule,
};
pub use merge::{
    commit_merges, index_valid, merge_candidates, remove_containers, MergeCandidate, MergeOptions,
    TextRegion,
};
pub use options::{ComponentLimits, LabelingOptions, LabelingStrategy};
pub use spatial::{BoxIndex, Bounds, NODE_CAPACITY};
