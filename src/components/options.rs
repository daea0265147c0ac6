use serde::Deserialize;

/// How a relaxation sweep applies a smaller neighbour label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelingStrategy {
    /// Dereference the candidate label four times through the coloring, then
    /// atomically lower both the pixel's previous root slot and the pixel.
    #[default]
    Relaxation,
    /// Watershed-like: the pixel takes its neighbourhood minimum, nothing
    /// else is written.
    Plain,
}

/// Component labeling parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelingOptions {
    pub strategy: LabelingStrategy,
    /// Additionally grow components through same-colored, non-background
    /// neighbours.
    pub color_similarity: bool,
    /// Per-channel tolerance used by the color-aware rule.
    pub color_tolerance: u8,
}

impl Default for LabelingOptions {
    fn default() -> Self {
        Self {
            strategy: LabelingStrategy::Relaxation,
            color_similarity: false,
            color_tolerance: 30,
        }
    }
}

/// Soft caps on the aggregation arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentLimits {
    /// Maximum number of components indexed per frame.
    pub components_limit: usize,
    /// Maximum stroke-width samples kept per component.
    pub component_size_limit: usize,
}

impl Default for ComponentLimits {
    fn default() -> Self {
        Self {
            components_limit: 4096,
            component_size_limit: 1024,
        }
    }
}
