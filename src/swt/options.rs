use serde::Deserialize;

/// Which side of an edge rays travel to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwtDirection {
    /// Along the gradient as computed: dark strokes on a light background.
    #[default]
    Forward,
    /// Against the gradient: light strokes on a dark background.
    Backward,
}

impl SwtDirection {
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            SwtDirection::Forward => 1,
            SwtDirection::Backward => -1,
        }
    }
}

/// Stroke Width Transform parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwtOptions {
    pub direction: SwtDirection,
    /// Maximum number of steps a ray may take (at least 2).
    pub ray_length: usize,
    /// Per-channel deviation from the stroke color that ends a ray when
    /// `use_stroke_color` is set.
    pub color_difference: u8,
    pub use_stroke_color: bool,
}

impl Default for SwtOptions {
    fn default() -> Self {
        Self {
            direction: SwtDirection::Forward,
            ray_length: 20,
            color_difference: 50,
            use_stroke_color: false,
        }
    }
}
