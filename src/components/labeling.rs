//! Lock-free parallel component labeling by fixed-point relaxation.
//!
//! Every pixel carries a label in a shared array of atomic cells. Stroke
//! pixels start with their own index, all others with `index + N` (`N` the
//! pixel count), which keeps them out of every neighbourhood minimum.
//! A sweep visits all pixels in parallel (one scanline per task) and lowers
//! each label towards the smallest label among its compatible neighbours.
//! All cross-pixel writes are atomic minimums, so the outcome of a sweep does
//! not depend on the visiting order. Sweeps repeat, separated by a full
//! barrier, until one of them changes nothing.
//!
//! At the fixed point every connected set of compatible pixels carries the
//! index of its lowest pixel, which is its own label.
use super::atomic::atomic_min;
use super::component::{ComponentSet, NO_COMPONENT};
use super::options::LabelingStrategy;
use crate::color::{color_difference, same_color};
use crate::error::{ensure_frame, DetectError};
use crate::image::PixelBuffer;
use crate::swt::{StrokeWidthMap, STROKE_NONE};
use log::debug;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Instant;

/// Shared per-pixel label array.
#[derive(Debug)]
pub struct Coloring {
    w: usize,
    h: usize,
    labels: Vec<AtomicU32>,
}

impl Coloring {
    /// Stroke pixels start at their own index, others at `index + N`.
    pub fn prepare(swt: &StrokeWidthMap) -> Result<Self, DetectError> {
        ensure_frame(swt.w, swt.h)?;
        let n = swt.data.len() as u32;
        let labels = swt
            .data
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let i = i as u32;
                AtomicU32::new(if s != STROKE_NONE { i } else { n + i })
            })
            .collect();
        Ok(Self {
            w: swt.w,
            h: swt.h,
            labels,
        })
    }

    /// Every pixel starts at its own index.
    pub fn indexed(w: usize, h: usize) -> Result<Self, DetectError> {
        ensure_frame(w, h)?;
        let labels = (0..(w * h) as u32).map(AtomicU32::new).collect();
        Ok(Self { w, h, labels })
    }

    /// Resume from a previously converged (or partially relaxed) label array.
    pub fn from_labels(w: usize, h: usize, labels: Vec<u32>) -> Result<Self, DetectError> {
        ensure_frame(w, h)?;
        if labels.len() != w * h {
            return Err(DetectError::BufferSizeMismatch {
                expected: w * h,
                actual: labels.len(),
            });
        }
        Ok(Self {
            w,
            h,
            labels: labels.into_iter().map(AtomicU32::new).collect(),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    /// Pixel count `N`; labels `>= N` mark unassigned pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn label(&self, i: usize) -> u32 {
        self.labels[i].load(Ordering::Relaxed)
    }

    /// Copy of the current labels.
    pub fn snapshot(&self) -> Vec<u32> {
        self.labels
            .iter()
            .map(|l| l.load(Ordering::Relaxed))
            .collect()
    }

    pub fn into_labels(self) -> Vec<u32> {
        self.labels.into_iter().map(AtomicU32::into_inner).collect()
    }

    /// Slot a label refers to: unassigned labels point back at their pixel.
    #[inline]
    fn slot(&self, label: u32) -> usize {
        let n = self.labels.len();
        let l = label as usize;
        if l >= n {
            l - n
        } else {
            l
        }
    }

    /// Indices of the in-bounds 8-neighbours of `(x, y)`, row by row.
    #[inline]
    fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = usize> + '_ {
        let (w, h) = (self.w, self.h);
        let ys = y.saturating_sub(1)..=(y + 1).min(h - 1);
        ys.flat_map(move |yn| {
            (x.saturating_sub(1)..=(x + 1).min(w - 1))
                .filter(move |&xn| xn != x || yn != y)
                .map(move |xn| yn * w + xn)
        })
    }
}

/// Decides which neighbours a pixel may take its label from.
pub trait NeighborRule: Sync {
    /// Smallest label among pixel `(x, y)` and its compatible neighbours.
    fn candidate(&self, coloring: &Coloring, x: usize, y: usize) -> u32;
}

/// Both pixels are stroke pixels and their widths are within a factor of 3.
#[inline]
pub fn stroke_compatible(s0: u32, s1: u32) -> bool {
    if s0 == STROKE_NONE || s1 == STROKE_NONE {
        return false;
    }
    let (lo, hi) = if s0 <= s1 { (s0, s1) } else { (s1, s0) };
    hi as u64 <= lo as u64 * 3
}

/// Connects stroke pixels of similar width.
#[derive(Clone, Copy, Debug)]
pub struct StrokeWidthRule<'a> {
    pub swt: &'a StrokeWidthMap,
}

impl NeighborRule for StrokeWidthRule<'_> {
    fn candidate(&self, coloring: &Coloring, x: usize, y: usize) -> u32 {
        let d = y * coloring.w + x;
        let s0 = self.swt.data[d];
        coloring
            .neighbors(x, y)
            .filter(|&d1| stroke_compatible(s0, self.swt.data[d1]))
            .map(|d1| coloring.label(d1))
            .fold(coloring.label(d), u32::min)
    }
}

/// Where the background estimate is sampled relative to the labeled frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundScale {
    /// Same resolution as the labeled frame.
    #[default]
    Full,
    /// The labeled frame was enlarged 2×; sample at `(x / 2, y / 2)`.
    Half,
}

/// Stroke-width compatibility plus growth through same-colored pixels that
/// do not match the local background.
pub struct ColorSimilarityRule<'a> {
    pub swt: &'a StrokeWidthMap,
    pub source: PixelBuffer<'a>,
    pub background: PixelBuffer<'a>,
    pub background_scale: BackgroundScale,
    pub tolerance: u8,
    /// Component links lowered when a pixel adopts a smaller label through
    /// its best color match.
    pub links: Option<&'a MergeLinks>,
}

impl NeighborRule for ColorSimilarityRule<'_> {
    fn candidate(&self, coloring: &Coloring, x: usize, y: usize) -> u32 {
        let n = coloring.len() as u32;
        let d = y * coloring.w + x;
        let c0 = coloring.label(d);
        let s0 = self.swt.data[d];
        let p0 = self.source.pixel_at(d);
        let b0 = match self.background_scale {
            BackgroundScale::Full => self.background.pixel(x, y),
            BackgroundScale::Half => self.background.pixel(
                (x / 2).min(self.background.w - 1),
                (y / 2).min(self.background.h - 1),
            ),
        };
        let is_background = same_color(p0, b0, self.tolerance);

        let mut c = u32::MAX;
        let mut best_difference = u32::MAX;
        let mut best = u32::MAX;
        for d1 in coloring.neighbors(x, y) {
            let c1 = coloring.label(d1);
            if c1 == c0 || c1 >= n {
                continue;
            }
            if stroke_compatible(s0, self.swt.data[d1]) {
                c = c.min(c1);
                continue;
            }
            if is_background {
                continue;
            }
            match color_difference(p0, self.source.pixel_at(d1), self.tolerance) {
                Some(diff) if diff <= best_difference => {
                    best_difference = diff;
                    c = c.min(c1);
                    best = c1;
                }
                _ => {}
            }
        }

        if let Some(links) = self.links {
            if c0 < n && c < c0 && c == best {
                links.link(c0, c);
            }
        }
        c.min(c0)
    }
}

/// Parent links into the components of an earlier aggregation pass.
///
/// Color-aware labeling lowers `parents[component_of(label)]` whenever a
/// pixel joins a smaller label through a color match; [`MergeLinks::apply`]
/// writes the result back as [`Component::parent_label`](super::Component).
#[derive(Debug)]
pub struct MergeLinks {
    label_index: Vec<u32>,
    roots: Vec<u32>,
    parents: Vec<AtomicU32>,
}

impl MergeLinks {
    pub fn new(set: &ComponentSet) -> Self {
        Self {
            label_index: set.label_index.clone(),
            roots: set.components.iter().map(|c| c.label).collect(),
            parents: set
                .components
                .iter()
                .map(|c| AtomicU32::new(c.parent_label))
                .collect(),
        }
    }

    /// Lower the parent of the component rooted at `label` to `parent`.
    pub fn link(&self, label: u32, parent: u32) {
        let Some(&id) = self.label_index.get(label as usize) else {
            return;
        };
        if id != NO_COMPONENT {
            atomic_min(&self.parents[id as usize], parent);
        }
    }

    pub fn parent(&self, id: usize) -> u32 {
        self.parents[id].load(Ordering::Relaxed)
    }

    /// Components whose parent was lowered below their own root label.
    pub fn linked(&self) -> usize {
        self.parents
            .iter()
            .zip(&self.roots)
            .filter(|(p, &root)| p.load(Ordering::Relaxed) < root)
            .count()
    }

    /// Store the converged parents into `set`.
    pub fn apply(self, set: &mut ComponentSet) {
        for (c, p) in set.components.iter_mut().zip(self.parents) {
            c.parent_label = p.into_inner();
        }
    }
}

/// Drives relaxation sweeps over a [`Coloring`].
pub struct Labeler<'a, R> {
    coloring: &'a Coloring,
    rule: R,
    strategy: LabelingStrategy,
}

impl<'a, R: NeighborRule> Labeler<'a, R> {
    pub fn new(coloring: &'a Coloring, rule: R, strategy: LabelingStrategy) -> Self {
        Self {
            coloring,
            rule,
            strategy,
        }
    }

    /// One full parallel pass. Returns `true` when any label was lowered.
    pub fn sweep(&self) -> bool {
        let changed = AtomicBool::new(false);
        let coloring = self.coloring;
        (0..coloring.h).into_par_iter().for_each(|y| {
            let mut row_changed = false;
            for x in 0..coloring.w {
                row_changed |= self.relax(x, y);
            }
            if row_changed {
                changed.store(true, Ordering::Relaxed);
            }
        });
        changed.into_inner()
    }

    fn relax(&self, x: usize, y: usize) -> bool {
        let coloring = self.coloring;
        let d = y * coloring.w + x;
        let c0 = coloring.label(d);
        let mut cn = self.rule.candidate(coloring, x, y);
        if cn >= c0 {
            return false;
        }
        match self.strategy {
            LabelingStrategy::Relaxation => {
                for _ in 0..4 {
                    cn = coloring.label(coloring.slot(cn));
                }
                atomic_min(&coloring.labels[coloring.slot(c0)], cn);
                atomic_min(&coloring.labels[d], cn);
            }
            LabelingStrategy::Plain => {
                atomic_min(&coloring.labels[d], cn);
            }
        }
        true
    }

    /// Sweep until a pass changes nothing, returning the number of sweeps.
    ///
    /// `cancel` is checked before every sweep.
    pub fn run(&self, cancel: Option<&AtomicBool>) -> Result<usize, DetectError> {
        let t0 = Instant::now();
        let mut sweeps = 0;
        loop {
            if cancel.is_some_and(|flag| flag.load(Ordering::Acquire)) {
                debug!("labeling: cancelled after {sweeps} sweeps");
                return Err(DetectError::Cancelled { sweeps });
            }
            sweeps += 1;
            if !self.sweep() {
                break;
            }
        }
        debug!(
            "labeling[{:?}]: {} sweeps over {}x{} took {:.3} ms",
            self.strategy,
            sweeps,
            self.coloring.w,
            self.coloring.h,
            t0.elapsed().as_secs_f64() * 1000.0
        );
        Ok(sweeps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_from(rows: &[&[u32]]) -> StrokeWidthMap {
        let h = rows.len();
        let w = rows[0].len();
        let mut map = StrokeWidthMap::new(w, h);
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if v > 0 {
                    map.data[y * w + x] = v;
                }
            }
        }
        map
    }

    fn label(map: &StrokeWidthMap, strategy: LabelingStrategy) -> (Vec<u32>, usize) {
        let coloring = Coloring::prepare(map).unwrap();
        let sweeps = Labeler::new(&coloring, StrokeWidthRule { swt: map }, strategy)
            .run(None)
            .unwrap();
        (coloring.into_labels(), sweeps)
    }

    #[test]
    fn prepare_offsets_non_stroke_pixels() {
        let map = map_from(&[&[0, 3, 0], &[0, 0, 0], &[0, 0, 0]]);
        let coloring = Coloring::prepare(&map).unwrap();
        assert_eq!(coloring.label(1), 1);
        assert_eq!(coloring.label(0), 9);
        assert_eq!(coloring.label(8), 17);
        let indexed = Coloring::indexed(3, 3).unwrap();
        assert_eq!(indexed.snapshot(), (0..9).collect::<Vec<u32>>());
    }

    #[test]
    fn compatibility_is_inclusive_at_factor_three() {
        assert!(stroke_compatible(4, 12));
        assert!(stroke_compatible(12, 4));
        assert!(!stroke_compatible(4, 13));
        assert!(!stroke_compatible(4, STROKE_NONE));
    }

    #[test]
    fn snake_converges_to_lowest_index() {
        let map = map_from(&[
            &[0, 0, 0, 0, 0, 0, 2],
            &[2, 2, 2, 2, 2, 0, 2],
            &[0, 0, 0, 0, 2, 0, 2],
            &[2, 2, 2, 0, 2, 0, 2],
            &[2, 0, 2, 2, 2, 0, 2],
        ]);
        for strategy in [LabelingStrategy::Relaxation, LabelingStrategy::Plain] {
            let (labels, sweeps) = label(&map, strategy);
            assert!(sweeps >= 2);
            let snake: Vec<usize> = (0..35)
                .filter(|&i| map.data[i] != STROKE_NONE && i % 7 != 6)
                .collect();
            for &i in &snake {
                assert_eq!(labels[i], 7, "pixel {i}");
            }
            for y in 0..5 {
                assert_eq!(labels[y * 7 + 6], 6);
            }
            assert_eq!(labels[0], 35);
        }
    }

    #[test]
    fn labels_never_increase_between_sweeps() {
        let map = map_from(&[
            &[0, 0, 0, 0, 0, 0, 0, 0],
            &[0, 3, 3, 3, 3, 3, 3, 0],
            &[0, 0, 0, 0, 0, 0, 3, 0],
            &[0, 3, 3, 3, 3, 3, 3, 0],
            &[0, 3, 0, 0, 0, 0, 0, 0],
            &[0, 3, 3, 3, 3, 3, 3, 3],
        ]);
        let coloring = Coloring::prepare(&map).unwrap();
        let labeler = Labeler::new(
            &coloring,
            StrokeWidthRule { swt: &map },
            LabelingStrategy::Relaxation,
        );
        let mut previous = coloring.snapshot();
        let mut sweeps = 0;
        loop {
            sweeps += 1;
            let changed = labeler.sweep();
            let current = coloring.snapshot();
            assert!(previous.iter().zip(&current).all(|(a, b)| b <= a));
            previous = current;
            if !changed {
                break;
            }
            assert!(sweeps < 48, "no fixed point");
        }
        let root = 9;
        for (i, &l) in previous.iter().enumerate() {
            if map.data[i] != STROKE_NONE {
                assert_eq!(l, root);
            }
        }
        assert_eq!(previous[root as usize], root);
    }

    #[test]
    fn wide_gap_in_stroke_width_splits_components() {
        // widths 4 and 20 touch but must stay apart; 4 and 12 join
        let split = map_from(&[&[4, 4, 20, 20], &[4, 4, 20, 20], &[4, 4, 20, 20]]);
        let (labels, _) = label(&split, LabelingStrategy::Relaxation);
        assert_eq!(labels[0], 0);
        assert_eq!(labels[2], 2);
        assert_eq!(labels[11], 2);

        let joined = map_from(&[&[4, 4, 12, 12], &[4, 4, 12, 12], &[4, 4, 12, 12]]);
        let (labels, _) = label(&joined, LabelingStrategy::Relaxation);
        assert!(labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn cancellation_is_observed_before_the_first_sweep() {
        let map = map_from(&[&[2, 2, 2], &[2, 2, 2], &[2, 2, 2]]);
        let coloring = Coloring::prepare(&map).unwrap();
        let cancel = AtomicBool::new(true);
        let err = Labeler::new(
            &coloring,
            StrokeWidthRule { swt: &map },
            LabelingStrategy::Relaxation,
        )
        .run(Some(&cancel))
        .unwrap_err();
        assert_eq!(err, DetectError::Cancelled { sweeps: 0 });
    }

    #[test]
    fn color_rule_grows_through_matching_foreground() {
        // dark stroke pixels at both ends of a dark, non-stroke row on white
        let (w, h) = (5, 3);
        let mut src = vec![255u8; w * h];
        let bg = vec![255u8; w * h];
        for x in 0..w {
            src[w + x] = 10;
        }
        let mut map = StrokeWidthMap::new(w, h);
        map.data[w] = 2;
        map.data[w + 4] = 2;

        let source = PixelBuffer::new(&src, w, h, 1).unwrap();
        let background = PixelBuffer::new(&bg, w, h, 1).unwrap();
        let coloring = Coloring::prepare(&map).unwrap();
        let rule = ColorSimilarityRule {
            swt: &map,
            source,
            background,
            background_scale: BackgroundScale::Full,
            tolerance: 30,
            links: None,
        };
        Labeler::new(&coloring, rule, LabelingStrategy::Relaxation)
            .run(None)
            .unwrap();
        let labels = coloring.into_labels();
        assert!((w..2 * w).all(|i| labels[i] == w as u32));
        // white pixels match the background and stay unassigned
        assert_eq!(labels[0], 15);
    }

    #[test]
    fn color_growth_links_stroke_components() {
        use crate::components::aggregate::aggregate;
        use crate::components::ComponentLimits;

        // one dark row on white: widths 2 then 20, too far apart to connect
        let (w, h) = (4, 3);
        let mut src = vec![255u8; w * h];
        let bg = vec![255u8; w * h];
        let mut map = StrokeWidthMap::new(w, h);
        for x in 0..w {
            src[w + x] = 10;
            map.data[w + x] = if x < 2 { 2 } else { 20 };
        }
        let source = PixelBuffer::new(&src, w, h, 1).unwrap();
        let background = PixelBuffer::new(&bg, w, h, 1).unwrap();

        let coloring = Coloring::prepare(&map).unwrap();
        Labeler::new(
            &coloring,
            StrokeWidthRule { swt: &map },
            LabelingStrategy::Relaxation,
        )
        .run(None)
        .unwrap();
        let mut set = aggregate(
            &source,
            &map,
            &coloring.snapshot(),
            &ComponentLimits::default(),
        )
        .unwrap();
        assert_eq!(set.len(), 2);

        let links = MergeLinks::new(&set);
        let rule = ColorSimilarityRule {
            swt: &map,
            source,
            background,
            background_scale: BackgroundScale::Full,
            tolerance: 30,
            links: Some(&links),
        };
        Labeler::new(&coloring, rule, LabelingStrategy::Relaxation)
            .run(None)
            .unwrap();
        assert_eq!(links.parent(0), 4);
        assert_eq!(links.parent(1), 4);
        assert_eq!(links.linked(), 1);

        links.apply(&mut set);
        assert_eq!(set.by_label(4).unwrap().parent_label, 4);
        assert_eq!(set.by_label(6).unwrap().parent_label, 4);
        let labels = coloring.into_labels();
        assert!((w..2 * w).all(|i| labels[i] == 4));
    }
}
