use serde::Deserialize;

/// Resampling applied before smoothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnlargeMode {
    #[default]
    None,
    /// Pixel replication.
    Nearest,
    /// Averages with the right, lower and diagonal neighbour.
    Interpolated,
}

/// Preprocessing switches. Everything is disabled by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreprocessOptions {
    pub enlarge: EnlargeMode,
    /// 3×3 Gaussian smoothing.
    pub gaussian: bool,
    /// Box blur radius; the averaged window is `(2r+1)²`.
    pub box_blur: Option<usize>,
}
