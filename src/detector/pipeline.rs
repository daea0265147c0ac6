//! Detector pipeline driving text-region detection end-to-end.
//!
//! The [`TextDetector`] takes an interleaved pixel buffer and returns the
//! aggregated, filtered and merged components with per-stage diagnostics.
//!
//! Typical usage:
//! ```no_run
//! use text_detector::{DetectorParams, TextDetector};
//! use text_detector::image::PixelBuffer;
//!
//! # fn example(rgba: &[u8], w: usize, h: usize) -> Result<(), text_detector::DetectError> {
//! let detector = TextDetector::new(DetectorParams::default())?;
//! let frame = PixelBuffer::new(rgba, w, h, 4)?;
//! let result = detector.detect(&frame)?;
//! for c in result.valid_components() {
//!     println!("{:?} median stroke {}", c.bounds, c.swt_median);
//! }
//! # Ok(())
//! # }
//! ```
use super::params::DetectorParams;
use crate::background::estimate_background;
use crate::color::grayscale;
use crate::components::{
    aggregate, apply_filter, commit_merges, index_valid, merge_candidates, remove_containers,
    BackgroundScale, ColorSimilarityRule, Coloring, Component, Labeler, MergeLinks,
    StrokeWidthRule,
};
use crate::diagnostics::{
    DetectionReport, DetectionResult, InputDescriptor, PipelineTrace, TimingBreakdown,
};
use crate::edges::{compute_gradients, non_maximum_suppression};
use crate::error::{ensure_frame, DetectError};
use crate::image::{ColorImage, PixelBuffer};
use crate::preprocess::{preprocess, EnlargeMode};
use crate::swt::stroke_width_transform;
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::AtomicBool;
use std::time::Instant;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Stroke Width Transform text detector.
///
/// Holds its parameters and, when `threads` is set, a dedicated worker
/// pool. A detector is reusable across frames and may be shared between
/// threads.
pub struct TextDetector {
    params: DetectorParams,
    pool: Option<ThreadPool>,
}

impl TextDetector {
    /// Create a detector, building a worker pool if `params.threads` asks
    /// for one.
    pub fn new(params: DetectorParams) -> Result<Self, DetectError> {
        let pool = match params.threads {
            Some(n) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| DetectError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Self { params, pool })
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Run the detector, returning the compact result.
    pub fn detect(&self, src: &PixelBuffer<'_>) -> Result<DetectionResult, DetectError> {
        Ok(self.detect_with_diagnostics(src)?.result)
    }

    /// Run the detector and return both the result and a detailed trace.
    pub fn detect_with_diagnostics(
        &self,
        src: &PixelBuffer<'_>,
    ) -> Result<DetectionReport, DetectError> {
        self.install(|| self.run(src, None))
    }

    /// Like [`detect_with_diagnostics`](Self::detect_with_diagnostics), but
    /// labeling stops with [`DetectError::Cancelled`] once `cancel` is raised.
    /// The flag is polled between labeling sweeps.
    pub fn detect_with_cancel(
        &self,
        src: &PixelBuffer<'_>,
        cancel: &AtomicBool,
    ) -> Result<DetectionReport, DetectError> {
        self.install(|| self.run(src, Some(cancel)))
    }

    fn install<T: Send>(&self, op: impl FnOnce() -> T + Send) -> T {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    fn run(
        &self,
        src: &PixelBuffer<'_>,
        cancel: Option<&AtomicBool>,
    ) -> Result<DetectionReport, DetectError> {
        ensure_frame(src.w, src.h)?;
        let p = &self.params;
        debug!(
            "TextDetector::detect start w={} h={} channels={} threads={}",
            src.w,
            src.h,
            src.channels,
            rayon::current_num_threads()
        );
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();

        let stage = Instant::now();
        let prepared: Option<ColorImage> = preprocess(src, &p.preprocess)?;
        let frame = prepared.as_ref().map_or(*src, ColorImage::as_buffer);
        timings.push("preprocess", elapsed_ms(stage));

        let background = if p.labeling.color_similarity {
            let stage = Instant::now();
            let gray = grayscale(src);
            let bg = estimate_background(src, &gray.as_view(), &p.background)?;
            timings.push("background", elapsed_ms(stage));
            Some(bg)
        } else {
            None
        };

        let stage = Instant::now();
        let grad = compute_gradients(&frame, p.gradient.kernel)?;
        timings.push("gradients", elapsed_ms(stage));

        let stage = Instant::now();
        let edges = non_maximum_suppression(&grad);
        let edge_pixels = edges.count_positive();
        timings.push("nms", elapsed_ms(stage));

        let stage = Instant::now();
        let swt = stroke_width_transform(&frame, &grad, &edges, &p.swt)?;
        timings.push("swt", elapsed_ms(stage));

        let stage = Instant::now();
        let coloring = Coloring::prepare(&swt.map)?;
        let strategy = p.labeling.strategy;
        let mut sweeps = Labeler::new(&coloring, StrokeWidthRule { swt: &swt.map }, strategy)
            .run(cancel)?;
        timings.push("labeling", elapsed_ms(stage));

        // color growth continues from the stroke coloring and links the
        // stroke components it joins
        let mut stroke_components: Vec<Component> = Vec::new();
        if let Some(bg) = &background {
            let stage = Instant::now();
            let mut stroke_set = aggregate(&frame, &swt.map, &coloring.snapshot(), &p.limits)?;
            let links = MergeLinks::new(&stroke_set);
            let rule = ColorSimilarityRule {
                swt: &swt.map,
                source: frame,
                background: bg.as_buffer(),
                background_scale: match p.preprocess.enlarge {
                    EnlargeMode::None => BackgroundScale::Full,
                    _ => BackgroundScale::Half,
                },
                tolerance: p.labeling.color_tolerance,
                links: Some(&links),
            };
            sweeps += Labeler::new(&coloring, rule, strategy).run(cancel)?;
            let linked = links.linked();
            links.apply(&mut stroke_set);
            debug!(
                "labeling: color growth linked {linked} of {} stroke components",
                stroke_set.len()
            );
            stroke_components = stroke_set.components;
            timings.push("color_labeling", elapsed_ms(stage));
        }
        let labels = coloring.into_labels();

        let stage = Instant::now();
        let mut set = aggregate(&frame, &swt.map, &labels, &p.limits)?;
        timings.push("aggregate", elapsed_ms(stage));

        let stage = Instant::now();
        apply_filter(&mut set.components, &p.filter);
        timings.push("filter", elapsed_ms(stage));

        let stage = Instant::now();
        let index = index_valid(&set.components);
        let containers_removed = if p.merge.remove_containers {
            remove_containers(&mut set.components, &index, p.merge.max_contained)
        } else {
            0
        };
        let candidates = if p.merge.merge {
            merge_candidates(
                &set.components,
                &index,
                p.merge.min_margin,
                frame.w,
                frame.h,
            )
        } else {
            Vec::new()
        };
        let regions = commit_merges(&mut set.components, &candidates);
        timings.push("merge", elapsed_ms(stage));

        timings.total_ms = elapsed_ms(total_start);
        let trace = PipelineTrace {
            input: InputDescriptor {
                width: src.w,
                height: src.h,
                channels: src.channels,
                threads: rayon::current_num_threads(),
            },
            timings,
            edge_pixels,
            rays: swt.rays.len(),
            stroke_pixels: swt.map.stroke_count(),
            sweeps,
            components: set.len(),
            valid_components: set.valid_count(),
            containers_removed,
            components_truncated: set.truncated,
            sampled_components: set.sampled_components,
        };
        debug!(
            "TextDetector::detect done components={} valid={} regions={} total={:.3} ms",
            trace.components,
            trace.valid_components,
            regions.len(),
            trace.timings.total_ms
        );

        let result = DetectionResult {
            width: frame.w,
            height: frame.h,
            scale: if frame.w == src.w { 1 } else { 2 },
            components: set.components,
            merge_candidates: candidates,
            regions,
            stroke_components,
            stroke_widths: swt.map,
            labels,
        };
        Ok(DetectionReport { result, trace })
    }
}
