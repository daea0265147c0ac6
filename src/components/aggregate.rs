//! Per-component statistics over a converged coloring.
//!
//! 1. A sequential scanline pass assigns dense component ids to label roots
//!    in first-seen order, stopping at `components_limit`.
//! 2. A parallel pass accumulates size, bounding box, channel sums and the
//!    indices of stroke pixels through atomics into a fixed arena.
//! 3. A sequential pass turns the accumulators into [`Component`] records.
//!
//! Components with more stroke pixels than `component_size_limit` are
//! described by their first `component_size_limit` samples in scanline
//! order.
use super::atomic::{atomic_max, atomic_min};
use super::component::{Component, ComponentSet, MAX_CHANNELS, NO_COMPONENT};
use super::filter::Rejection;
use super::options::ComponentLimits;
use super::spatial::Bounds;
use crate::error::DetectError;
use crate::image::PixelBuffer;
use crate::swt::{StrokeWidthMap, STROKE_NONE};
use log::{debug, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

struct Accumulator {
    size: AtomicU32,
    x0: AtomicU32,
    y0: AtomicU32,
    x1: AtomicU32,
    y1: AtomicU32,
    channel_sums: [AtomicU64; MAX_CHANNELS],
    swt_count: AtomicU32,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            size: AtomicU32::new(0),
            x0: AtomicU32::new(u32::MAX),
            y0: AtomicU32::new(u32::MAX),
            x1: AtomicU32::new(0),
            y1: AtomicU32::new(0),
            channel_sums: Default::default(),
            swt_count: AtomicU32::new(0),
        }
    }
}

/// Aggregate the components named by `labels` (a converged coloring).
pub fn aggregate(
    src: &PixelBuffer<'_>,
    swt: &StrokeWidthMap,
    labels: &[u32],
    limits: &ComponentLimits,
) -> Result<ComponentSet, DetectError> {
    let n = src.len();
    for actual in [swt.data.len(), labels.len()] {
        if actual != n {
            return Err(DetectError::BufferSizeMismatch {
                expected: n,
                actual,
            });
        }
    }
    let t0 = Instant::now();

    let mut label_index = vec![NO_COMPONENT; n];
    let mut roots: Vec<u32> = Vec::new();
    let mut end = n;
    for (i, &label) in labels.iter().enumerate() {
        if label as usize >= n {
            continue;
        }
        let slot = &mut label_index[label as usize];
        if *slot == NO_COMPONENT {
            if roots.len() == limits.components_limit {
                end = i;
                break;
            }
            *slot = roots.len() as u32;
            roots.push(label);
        }
    }
    let truncated = end < n;
    if truncated {
        warn!(
            "aggregate: components_limit={} reached at pixel {end} of {n}",
            limits.components_limit
        );
    }

    let cap = limits.component_size_limit;
    let arena: Vec<Accumulator> = (0..roots.len()).map(|_| Accumulator::new()).collect();
    let samples: Vec<AtomicU32> = (0..roots.len() * cap).map(|_| AtomicU32::new(0)).collect();
    let channels = src.channels.min(MAX_CHANNELS);

    (0..end).into_par_iter().for_each(|i| {
        let label = labels[i] as usize;
        if label >= n {
            return;
        }
        let ci = label_index[label] as usize;
        let acc = &arena[ci];
        let (x, y) = ((i % src.w) as u32, (i / src.w) as u32);
        acc.size.fetch_add(1, Ordering::Relaxed);
        atomic_min(&acc.x0, x);
        atomic_max(&acc.x1, x);
        atomic_min(&acc.y0, y);
        atomic_max(&acc.y1, y);
        let px = src.pixel_at(i);
        for (sum, &v) in acc.channel_sums.iter().zip(&px[..channels]) {
            sum.fetch_add(v as u64, Ordering::Relaxed);
        }
        if swt.data[i] != STROKE_NONE {
            let slot = acc.swt_count.fetch_add(1, Ordering::Relaxed) as usize;
            if slot < cap {
                samples[ci * cap + slot].store(i as u32, Ordering::Relaxed);
            }
        }
    });

    // capped components are re-sampled in scanline order
    let mut capped: Vec<Option<Vec<u32>>> = arena
        .iter()
        .map(|acc| (acc.swt_count.load(Ordering::Relaxed) as usize > cap).then(Vec::new))
        .collect();
    let sampled_components = capped.iter().filter(|c| c.is_some()).count();
    if sampled_components > 0 {
        warn!(
            "aggregate: {sampled_components} components exceed component_size_limit={cap}, \
             statistics use the first {cap} samples"
        );
        for i in 0..end {
            let label = labels[i] as usize;
            if label >= n || swt.data[i] == STROKE_NONE {
                continue;
            }
            if let Some(list) = capped[label_index[label] as usize].as_mut() {
                if list.len() < cap {
                    list.push(i as u32);
                }
            }
        }
    }

    let mut members: Vec<Vec<u32>> = Vec::with_capacity(arena.len());
    let components: Vec<Component> = arena
        .iter()
        .enumerate()
        .map(|(ci, acc)| {
            let pixels = match capped[ci].take() {
                Some(list) => list,
                None => {
                    let count = acc.swt_count.load(Ordering::Relaxed) as usize;
                    let mut list: Vec<u32> = samples[ci * cap..ci * cap + count]
                        .iter()
                        .map(|s| s.load(Ordering::Relaxed))
                        .collect();
                    list.sort_unstable();
                    list
                }
            };
            let mut values: Vec<u32> = pixels.iter().map(|&i| swt.data[i as usize]).collect();
            members.push(pixels);
            finalize(ci as u32, roots[ci], acc, &mut values, channels)
        })
        .collect();

    debug!(
        "aggregate: {} components over {} pixels took {:.3} ms",
        components.len(),
        end,
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(ComponentSet {
        components,
        label_index,
        members,
        truncated,
        processed_pixels: end,
        sampled_components,
    })
}

fn finalize(
    id: u32,
    label: u32,
    acc: &Accumulator,
    samples: &mut [u32],
    channels: usize,
) -> Component {
    let load = |a: &AtomicU32| a.load(Ordering::Relaxed);
    let size = load(&acc.size);
    let bounds = Bounds::new(
        load(&acc.x0) as i32,
        load(&acc.y0) as i32,
        load(&acc.x1) as i32,
        load(&acc.y1) as i32,
    );
    let width = bounds.width();
    let height = bounds.height();
    let min_dimension = width.min(height);
    let max_dimension = width.max(height);
    let diameter = (width as f32).hypot(height as f32);

    // sorted first so the float sums below do not depend on arrival order
    samples.sort_unstable();
    let swt_median = samples.get(samples.len() / 2).copied().unwrap_or(0);
    let swt_count = samples.len() as u32;
    let swt_sum: u64 = samples.iter().map(|&s| s as u64).sum();
    let (swt_average, swt_variance) = if swt_count > 0 {
        let avg = swt_sum as f32 / swt_count as f32;
        let var = samples
            .iter()
            .map(|&s| {
                let e = s as f32 - avg;
                e * e
            })
            .sum::<f32>()
            / swt_count as f32;
        (avg, var)
    } else {
        (0.0, 0.0)
    };
    let diameter_to_median_ratio = if swt_median > 0 {
        diameter / swt_median as f32
    } else {
        f32::INFINITY
    };

    let mut average_color = [0u8; MAX_CHANNELS];
    for (dst, sum) in average_color.iter_mut().zip(&acc.channel_sums).take(channels) {
        *dst = (sum.load(Ordering::Relaxed) / size.max(1) as u64).min(255) as u8;
    }

    Component {
        id,
        label,
        bounds,
        width,
        height,
        size,
        min_dimension,
        max_dimension,
        size_ratio: max_dimension as f32 / min_dimension as f32,
        diameter,
        swt_count,
        swt_sum,
        swt_average,
        swt_median,
        swt_variance,
        diameter_to_median_ratio,
        average_color,
        parent_label: label,
        merge_parent: None,
        rejection: Rejection::empty(),
        valid: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::labeling::{Coloring, Labeler, StrokeWidthRule};
    use crate::components::LabelingStrategy;

    struct Frame {
        data: Vec<u8>,
        map: StrokeWidthMap,
    }

    /// 8x6 gray frame with two blocks of stroke pixels.
    fn two_blocks() -> Frame {
        let (w, h) = (8, 6);
        let mut data = vec![200u8; w * h];
        let mut map = StrokeWidthMap::new(w, h);
        for y in 1..4 {
            for x in 1..3 {
                map.data[y * w + x] = 2 + (x as u32 % 2);
                data[y * w + x] = 20;
            }
        }
        for y in 2..5 {
            for x in 5..8 {
                map.data[y * w + x] = 4;
                data[y * w + x] = 40;
            }
        }
        Frame { data, map }
    }

    fn converge(map: &StrokeWidthMap) -> Vec<u32> {
        let coloring = Coloring::prepare(map).unwrap();
        Labeler::new(
            &coloring,
            StrokeWidthRule { swt: map },
            LabelingStrategy::Relaxation,
        )
        .run(None)
        .unwrap();
        coloring.into_labels()
    }

    #[test]
    fn statistics_of_two_blocks() {
        let frame = two_blocks();
        let src = PixelBuffer::new(&frame.data, 8, 6, 1).unwrap();
        let labels = converge(&frame.map);
        let set = aggregate(&src, &frame.map, &labels, &ComponentLimits::default()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.truncated);

        let a = &set.components[0];
        assert_eq!(a.label, 9);
        assert_eq!(a.bounds, Bounds::new(1, 1, 2, 3));
        assert_eq!((a.width, a.height, a.size), (2, 3, 6));
        assert_eq!(a.swt_count, 6);
        // samples 2,2,2,3,3,3: index 6 / 2
        assert_eq!(a.swt_median, 3);
        assert!((a.swt_average - 2.5).abs() < 1e-6);
        assert!((a.swt_variance - 0.25).abs() < 1e-6);
        assert!((a.size_ratio - 1.5).abs() < 1e-6);
        assert_eq!(a.average_color[0], 20);
        assert_eq!(set.members[0], vec![9, 10, 17, 18, 25, 26]);

        let b = set.by_label(21).unwrap();
        assert_eq!(b.id, 1);
        assert_eq!((b.width, b.height, b.size), (3, 3, 9));
        assert_eq!(b.swt_variance, 0.0);
        assert_eq!(b.average_color[0], 40);
    }

    #[test]
    fn components_limit_truncates_scan() {
        let frame = two_blocks();
        let src = PixelBuffer::new(&frame.data, 8, 6, 1).unwrap();
        let labels = converge(&frame.map);
        let limits = ComponentLimits {
            components_limit: 1,
            ..Default::default()
        };
        let set = aggregate(&src, &frame.map, &labels, &limits).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.truncated);
        // second block starts at (5, 2)
        assert_eq!(set.processed_pixels, 2 * 8 + 5);
        // pixels of the first block after the cut are not counted
        assert_eq!(set.components[0].size, 4);
    }

    #[test]
    fn size_limit_samples_in_scanline_order() {
        let frame = two_blocks();
        let src = PixelBuffer::new(&frame.data, 8, 6, 1).unwrap();
        let labels = converge(&frame.map);
        let limits = ComponentLimits {
            component_size_limit: 3,
            ..Default::default()
        };
        let set = aggregate(&src, &frame.map, &labels, &limits).unwrap();
        assert_eq!(set.sampled_components, 2);
        let a = &set.components[0];
        // first three samples: (1,1)=3, (2,1)=2, (1,2)=3
        assert_eq!(a.swt_count, 3);
        assert_eq!(a.swt_sum, 8);
        assert_eq!(a.swt_median, 3);
        assert_eq!(a.size, 6);
        assert_eq!(set.members[0], vec![9, 10, 17]);
    }

    #[test]
    fn median_takes_the_upper_middle_of_even_samples() {
        let (w, h) = (6, 3);
        let data = vec![0u8; w * h];
        let mut map = StrokeWidthMap::new(w, h);
        for (x, s) in [(1, 2), (2, 3), (3, 2), (4, 3)] {
            map.data[w + x] = s;
        }
        let src = PixelBuffer::new(&data, w, h, 1).unwrap();
        let labels = converge(&map);
        let set = aggregate(&src, &map, &labels, &ComponentLimits::default()).unwrap();
        assert_eq!(set.len(), 1);
        let c = &set.components[0];
        assert_eq!(c.swt_count, 4);
        assert_eq!(c.swt_median, 3);
        assert!((c.diameter_to_median_ratio - c.diameter / 3.0).abs() < 1e-6);
    }

    #[test]
    fn rerunning_on_converged_labels_is_idempotent() {
        let frame = two_blocks();
        let src = PixelBuffer::new(&frame.data, 8, 6, 1).unwrap();
        let labels = converge(&frame.map);
        let first = aggregate(&src, &frame.map, &labels, &ComponentLimits::default()).unwrap();
        let second = aggregate(&src, &frame.map, &labels, &ComponentLimits::default()).unwrap();
        assert_eq!(first, second);
    }
}
