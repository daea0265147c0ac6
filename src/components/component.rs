use super::filter::Rejection;
use super::spatial::Bounds;
use serde::Serialize;

/// Sentinel in [`ComponentSet::label_index`] for labels without a component.
pub const NO_COMPONENT: u32 = u32::MAX;

/// Channels tracked by the per-component color average.
pub const MAX_CHANNELS: usize = 4;

/// Aggregated statistics of one connected component.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Dense index in the aggregation arena.
    pub id: u32,
    /// Root coloring label shared by every member pixel.
    pub label: u32,
    /// Inclusive bounding box.
    pub bounds: Bounds,
    /// Inclusive extents (`x1 - x0 + 1`).
    pub width: u32,
    pub height: u32,
    /// Member pixel count.
    pub size: u32,
    pub min_dimension: u32,
    pub max_dimension: u32,
    /// `max_dimension / min_dimension`.
    pub size_ratio: f32,
    /// Euclidean diagonal of the bounding box.
    pub diameter: f32,
    /// Stroke-width samples the statistics below are computed over.
    pub swt_count: u32,
    pub swt_sum: u64,
    pub swt_average: f32,
    /// Sample at index `count / 2` after sorting.
    pub swt_median: u32,
    /// Population variance of the samples.
    pub swt_variance: f32,
    pub diameter_to_median_ratio: f32,
    /// Per-channel average over all member pixels.
    pub average_color: [u8; MAX_CHANNELS],
    /// Lowest label this component was linked to by color-aware labeling;
    /// equals `label` when unlinked.
    pub parent_label: u32,
    /// Lowest component id of the merge group this component belongs to.
    pub merge_parent: Option<u32>,
    pub rejection: Rejection,
    pub valid: bool,
}

impl Component {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Result of one aggregation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentSet {
    pub components: Vec<Component>,
    /// Component id per coloring label, [`NO_COMPONENT`] when the label does
    /// not name a component root.
    pub label_index: Vec<u32>,
    /// Stroke pixel indices per component, ascending; capped components keep
    /// their first `component_size_limit` in scanline order.
    pub members: Vec<Vec<u32>>,
    /// `true` when `components_limit` stopped indexing before the end of the
    /// frame.
    pub truncated: bool,
    /// Pixels (in scanline order) that contributed to the statistics.
    pub processed_pixels: usize,
    /// Components whose stroke samples were capped at `component_size_limit`.
    pub sampled_components: usize,
}

impl ComponentSet {
    /// Authoritative component count.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.components.iter().filter(|c| c.valid).count()
    }

    /// Component whose root label is `label`.
    pub fn by_label(&self, label: u32) -> Option<&Component> {
        let id = *self.label_index.get(label as usize)?;
        (id != NO_COMPONENT).then(|| &self.components[id as usize])
    }
}
