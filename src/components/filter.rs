//! Heuristic validity classification of aggregated components.
use super::component::Component;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Criteria a component failed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
    #[serde(transparent)]
    pub struct Rejection: u8 {
        /// Stroke-width variance too large relative to the mean.
        const HIGH_VARIANCE = 1 << 0;
        /// Bounding box too elongated.
        const SIZE_RATIO = 1 << 1;
        /// Diagonal too long relative to the median stroke width.
        const DIAMETER_RATIO = 1 << 2;
        /// Fewer member pixels than the profile minimum.
        const TOO_SMALL = 1 << 3;
        /// Box encloses several other components.
        const CONTAINS_OTHERS = 1 << 4;
    }
}

/// How failing criteria are reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterMode {
    /// Stop at the first failing criterion and record only that one.
    #[default]
    Outright,
    /// Evaluate every criterion and record all failures.
    Detailed,
}

/// Named threshold presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterProfile {
    /// Keep everything.
    Permissive,
    #[default]
    Default,
    /// Looser stroke criteria, all failures recorded.
    Passive,
}

/// Resolved thresholds. A component is valid when
/// `variance < variance_tolerance * average`, `size_ratio < size_ratio_tolerance`,
/// `diameter / median < diameter_ratio_bound` and `size >= min_pixels`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterThresholds {
    pub mode: FilterMode,
    pub variance_tolerance: f32,
    pub size_ratio_tolerance: f32,
    pub diameter_ratio_bound: f32,
    pub min_pixels: u32,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            mode: FilterMode::Outright,
            variance_tolerance: 0.5,
            size_ratio_tolerance: 10.0,
            diameter_ratio_bound: 10.0,
            min_pixels: 10,
        }
    }
}

impl FilterProfile {
    /// Thresholds of the preset; `None` for [`FilterProfile::Permissive`].
    pub fn thresholds(self) -> Option<FilterThresholds> {
        match self {
            FilterProfile::Permissive => None,
            FilterProfile::Default => Some(FilterThresholds::default()),
            FilterProfile::Passive => Some(FilterThresholds {
                mode: FilterMode::Detailed,
                variance_tolerance: 2.0,
                size_ratio_tolerance: 10.0,
                diameter_ratio_bound: 15.0,
                min_pixels: 0,
            }),
        }
    }
}

/// Filter stage configuration. `custom` replaces the profile's thresholds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    pub profile: FilterProfile,
    pub custom: Option<FilterThresholds>,
}

impl FilterOptions {
    pub fn thresholds(&self) -> Option<FilterThresholds> {
        self.custom.or_else(|| self.profile.thresholds())
    }
}

/// Evaluate `c` against `t`.
pub fn classify(c: &Component, t: &FilterThresholds) -> Rejection {
    let checks = [
        (
            Rejection::HIGH_VARIANCE,
            c.swt_variance < t.variance_tolerance * c.swt_average,
        ),
        (
            Rejection::SIZE_RATIO,
            c.size_ratio < t.size_ratio_tolerance,
        ),
        (
            Rejection::DIAMETER_RATIO,
            c.diameter_to_median_ratio < t.diameter_ratio_bound,
        ),
        (Rejection::TOO_SMALL, c.size >= t.min_pixels),
    ];
    let mut failed = Rejection::empty();
    for (flag, ok) in checks {
        if !ok {
            failed |= flag;
            if t.mode == FilterMode::Outright {
                break;
            }
        }
    }
    failed
}

/// Set `rejection`/`valid` on every component. Returns the valid count.
pub fn apply_filter(components: &mut [Component], opts: &FilterOptions) -> usize {
    let thresholds = opts.thresholds();
    for c in components.iter_mut() {
        c.rejection = match &thresholds {
            Some(t) => classify(c, t),
            None => Rejection::empty(),
        };
        c.valid = c.rejection.is_empty();
    }
    let valid = components.iter().filter(|c| c.valid).count();
    log::debug!(
        "filter: {valid}/{} valid (profile {:?})",
        components.len(),
        opts.profile
    );
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::spatial::Bounds;

    fn component(size: u32, size_ratio: f32, average: f32, variance: f32, ratio: f32) -> Component {
        Component {
            id: 0,
            label: 0,
            bounds: Bounds::new(0, 0, 9, 9),
            width: 10,
            height: 10,
            size,
            min_dimension: 10,
            max_dimension: 10,
            size_ratio,
            diameter: 14.1,
            swt_count: size,
            swt_sum: (average * size as f32) as u64,
            swt_average: average,
            swt_median: average as u32,
            swt_variance: variance,
            diameter_to_median_ratio: ratio,
            average_color: [0; 4],
            parent_label: 0,
            merge_parent: None,
            rejection: Rejection::empty(),
            valid: false,
        }
    }

    #[test]
    fn default_profile_accepts_a_clean_stroke() {
        let mut cs = vec![component(72, 4.5, 3.0, 0.0, 6.1)];
        assert_eq!(apply_filter(&mut cs, &FilterOptions::default()), 1);
        assert!(cs[0].valid);
    }

    #[test]
    fn outright_records_first_failure_only() {
        let mut cs = vec![component(1, 12.0, 1.0, 5.0, 1.4)];
        apply_filter(&mut cs, &FilterOptions::default());
        assert!(!cs[0].valid);
        assert_eq!(cs[0].rejection, Rejection::HIGH_VARIANCE);
    }

    #[test]
    fn detailed_accumulates_failures() {
        let opts = FilterOptions {
            profile: FilterProfile::Passive,
            custom: None,
        };
        let mut cs = vec![component(1, 12.0, 1.0, 5.0, 20.0)];
        apply_filter(&mut cs, &opts);
        assert_eq!(
            cs[0].rejection,
            Rejection::HIGH_VARIANCE | Rejection::SIZE_RATIO | Rejection::DIAMETER_RATIO
        );
        assert!(!cs[0].valid);
    }

    #[test]
    fn too_small_rejected_by_default_only() {
        let mut cs = vec![component(3, 1.0, 1.0, 0.0, 1.4)];
        apply_filter(&mut cs, &FilterOptions::default());
        assert_eq!(cs[0].rejection, Rejection::TOO_SMALL);
        let passive = FilterOptions {
            profile: FilterProfile::Passive,
            custom: None,
        };
        apply_filter(&mut cs, &passive);
        assert!(cs[0].valid);
    }

    #[test]
    fn permissive_and_custom() {
        let mut cs = vec![component(1, 50.0, 1.0, 9.0, 99.0)];
        let permissive = FilterOptions {
            profile: FilterProfile::Permissive,
            custom: None,
        };
        assert_eq!(apply_filter(&mut cs, &permissive), 1);

        let custom = FilterOptions {
            profile: FilterProfile::Permissive,
            custom: Some(FilterThresholds {
                mode: FilterMode::Detailed,
                variance_tolerance: 100.0,
                size_ratio_tolerance: 100.0,
                diameter_ratio_bound: 50.0,
                min_pixels: 0,
            }),
        };
        apply_filter(&mut cs, &custom);
        assert_eq!(cs[0].rejection, Rejection::DIAMETER_RATIO);
    }

    #[test]
    fn thresholds_deserialize_with_defaults() {
        let opts: FilterOptions =
            serde_json::from_str(r#"{"profile":"passive","custom":{"minPixels":4}}"#).unwrap();
        let t = opts.thresholds().unwrap();
        assert_eq!(t.min_pixels, 4);
        assert_eq!(t.variance_tolerance, 0.5);
    }
}
