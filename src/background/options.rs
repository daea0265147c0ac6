use serde::Deserialize;

/// Background estimator parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundOptions {
    /// Window radius; the sampled neighbourhood is `(2·window+1)²`.
    pub window: usize,
    /// Samples within this gray distance (exclusive) form a cluster run.
    pub gray_tolerance: u8,
    /// Per-channel tolerance (inclusive) for cluster membership.
    pub color_tolerance: u8,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            window: 3,
            gray_tolerance: 50,
            color_tolerance: 30,
        }
    }
}
