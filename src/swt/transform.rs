use super::map::StrokeWidthMap;
use super::options::{SwtDirection, SwtOptions};
use super::ray::{RayWalker, PERTURBATIONS};
use crate::color::same_color;
use crate::edges::{collect_edges, EdgeElement, GradientField};
use crate::error::{ensure_frame, DetectError};
use crate::image::{ImageF32, PixelBuffer};
use log::debug;
use rayon::prelude::*;
use std::time::Instant;

/// A ray that reached an opposite edge (or, in stroke-color mode, left the
/// stroke color).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayRecord {
    /// Origin edge pixel.
    pub x: u32,
    pub y: u32,
    /// Index into [`PERTURBATIONS`] used for the cast; replays reuse it.
    pub perturbation: u8,
    /// Steps taken to reach the terminating pixel.
    pub steps: u32,
    /// Truncated Euclidean distance between origin and terminating pixel.
    pub width: u32,
}

/// Stroke-width map together with the rays that produced it.
#[derive(Clone, Debug)]
pub struct SwtOutput {
    pub map: StrokeWidthMap,
    pub rays: Vec<RayRecord>,
    /// Number of edge pixels rays were cast from.
    pub edge_count: usize,
}

/// Run the transform in the direction configured in `opts`.
///
/// `edges` is the NMS edge map; every positive pixel casts rays. Rejects
/// frames below 3×3, `ray_length < 2` and gradient fields of a different
/// size than `src`.
pub fn stroke_width_transform(
    src: &PixelBuffer<'_>,
    grad: &GradientField,
    edges: &ImageF32,
    opts: &SwtOptions,
) -> Result<SwtOutput, DetectError> {
    ensure_frame(src.w, src.h)?;
    if opts.ray_length < 2 {
        return Err(DetectError::InvalidRayLength(opts.ray_length));
    }
    for (w, h) in [(grad.width(), grad.height()), (edges.w, edges.h)] {
        if (w, h) != (src.w, src.h) {
            return Err(DetectError::BufferSizeMismatch {
                expected: src.len(),
                actual: w * h,
            });
        }
    }
    let t0 = Instant::now();
    let edge_list = collect_edges(edges, grad);
    let caster = Caster {
        src,
        grad,
        edges,
        opts,
        dir: opts.direction.sign(),
    };

    let rays: Vec<RayRecord> = edge_list
        .par_iter()
        .map(|edge| caster.cast(edge))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    let mut map = StrokeWidthMap::new(src.w, src.h);
    caster.fill(&rays, &mut map);
    caster.cap_to_median(&rays, &mut map);

    debug!(
        "swt[{:?}]: edges={} rays={} strokes={} took {:.3} ms",
        opts.direction,
        edge_list.len(),
        rays.len(),
        map.stroke_count(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(SwtOutput {
        map,
        rays,
        edge_count: edge_list.len(),
    })
}

/// Run forward and backward transforms concurrently, returned in that order.
pub fn stroke_width_transform_both(
    src: &PixelBuffer<'_>,
    grad: &GradientField,
    edges: &ImageF32,
    opts: &SwtOptions,
) -> Result<(SwtOutput, SwtOutput), DetectError> {
    let forward = SwtOptions {
        direction: SwtDirection::Forward,
        ..*opts
    };
    let backward = SwtOptions {
        direction: SwtDirection::Backward,
        ..*opts
    };
    let (f, b) = rayon::join(
        || stroke_width_transform(src, grad, edges, &forward),
        || stroke_width_transform(src, grad, edges, &backward),
    );
    Ok((f?, b?))
}

struct Caster<'a> {
    src: &'a PixelBuffer<'a>,
    grad: &'a GradientField,
    edges: &'a ImageF32,
    opts: &'a SwtOptions,
    dir: i32,
}

impl Caster<'_> {
    fn walker(&self, x: u32, y: u32, perturbation: usize) -> RayWalker {
        let d = y as usize * self.src.w + x as usize;
        RayWalker::new(
            x,
            y,
            self.grad.dx.data[d],
            self.grad.dy.data[d],
            &PERTURBATIONS[perturbation],
            self.dir,
        )
    }

    /// Index of the walker's pixel; only called on positions the bound guard
    /// has already accepted.
    fn index(&self, walker: &RayWalker) -> usize {
        match walker.index(self.src.w, self.src.h) {
            Some(i) => i,
            None => panic!(
                "ray left the {}x{} frame at ({}, {}) past its bound guard",
                self.src.w, self.src.h, walker.cx, walker.cy
            ),
        }
    }

    /// Cast the perturbed rays of one edge pixel.
    fn cast(&self, edge: &EdgeElement) -> Vec<RayRecord> {
        let (w, h) = (self.src.w, self.src.h);
        let origin_angle = edge.angle;
        let mut out = Vec::new();
        for (pi, p) in PERTURBATIONS.iter().enumerate() {
            let mut walker = self.walker(edge.x, edge.y, pi);
            // the direct neighbour usually belongs to the same edge
            walker.advance();
            if walker.exited(w, h) {
                continue;
            }
            let stroke_color = self
                .opts
                .use_stroke_color
                .then(|| self.src.pixel_at(self.index(&walker)));

            for step in 2..self.opts.ray_length {
                walker.advance();
                if walker.exited(w, h) {
                    break;
                }
                let cd = self.index(&walker);
                let left_stroke = match stroke_color {
                    Some(color) => !same_color(
                        self.src.pixel_at(cd),
                        color,
                        self.opts.color_difference,
                    ),
                    None => false,
                };
                if self.edges.data[cd] > 0.0 || left_stroke {
                    let mut opposite = self.grad.angle.data[cd] + p.angle;
                    if opposite > 360.0 {
                        opposite -= 360.0;
                    }
                    let deviation = (180.0 - (origin_angle - opposite).abs()).abs();
                    if deviation < 45.0 {
                        let ddx = (edge.x as i32 - walker.cx) as f32;
                        let ddy = (edge.y as i32 - walker.cy) as f32;
                        out.push(RayRecord {
                            x: edge.x,
                            y: edge.y,
                            perturbation: pi as u8,
                            steps: step as u32,
                            width: ddx.hypot(ddy) as u32,
                        });
                    }
                    break;
                }
            }
        }
        out
    }

    /// Visit the pixels strictly between origin and terminating pixel.
    fn replay(&self, ray: &RayRecord, mut visit: impl FnMut(usize)) {
        let mut walker = self.walker(ray.x, ray.y, ray.perturbation as usize);
        walker.advance();
        for _ in 1..ray.steps {
            visit(self.index(&walker));
            walker.advance();
        }
    }

    fn fill(&self, rays: &[RayRecord], map: &mut StrokeWidthMap) {
        for ray in rays {
            self.replay(ray, |i| {
                if map.data[i] > ray.width {
                    map.data[i] = ray.width;
                }
            });
        }
    }

    fn cap_to_median(&self, rays: &[RayRecord], map: &mut StrokeWidthMap) {
        let mut samples = Vec::with_capacity(self.opts.ray_length);
        for ray in rays {
            samples.clear();
            self.replay(ray, |i| samples.push(map.data[i]));
            let Some(median) = lower_median(&mut samples) else {
                continue;
            };
            self.replay(ray, |i| {
                if map.data[i] > median {
                    map.data[i] = median;
                }
            });
        }
    }
}

/// Lower median (index `(n - 1) / 2` after sorting); sorts `values` in place.
fn lower_median(values: &mut [u32]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    Some(values[(values.len() - 1) / 2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::{compute_gradients, non_maximum_suppression, SobelKernel};
    use crate::swt::STROKE_NONE;

    fn bar(w: usize, h: usize, x0: usize, x1: usize) -> Vec<u8> {
        let mut data = vec![255u8; w * h * 4];
        for y in 0..h {
            for x in x0..x1 {
                let i = (y * w + x) * 4;
                data[i..i + 3].copy_from_slice(&[0, 0, 0]);
            }
        }
        data
    }

    fn run(data: &[u8], w: usize, h: usize, opts: &SwtOptions) -> SwtOutput {
        let buf = PixelBuffer::new(data, w, h, 4).unwrap();
        let grad = compute_gradients(&buf, SobelKernel::Sobel3).unwrap();
        let edges = non_maximum_suppression(&grad);
        stroke_width_transform(&buf, &grad, &edges, opts).unwrap()
    }

    #[test]
    fn lower_median_picks_floor_index() {
        assert_eq!(lower_median(&mut [4, 3, 3]), Some(3));
        assert_eq!(lower_median(&mut [5, 2, 9, 7]), Some(5));
        assert_eq!(lower_median(&mut []), None);
    }

    #[test]
    fn dark_bar_is_measured_forward() {
        let data = bar(20, 12, 8, 12);
        let out = run(&data, 20, 12, &SwtOptions::default());
        for y in 1..11 {
            for x in 8..12 {
                assert_eq!(out.map.get(x, y), 3, "pixel ({x}, {y})");
            }
            assert_eq!(out.map.get(5, y), STROKE_NONE);
            assert_eq!(out.map.get(14, y), STROKE_NONE);
        }
        // three perturbations from each of four edge columns
        assert_eq!(out.rays.len(), 10 * 4 * 3);
    }

    #[test]
    fn backward_rays_walk_into_the_background() {
        let data = bar(20, 12, 8, 12);
        let opts = SwtOptions {
            direction: SwtDirection::Backward,
            ..Default::default()
        };
        let out = run(&data, 20, 12, &opts);
        // only the frame's border would stop them; nothing opposite is found
        assert_eq!(out.map.stroke_count(), 0);
    }

    #[test]
    fn short_rays_miss_wide_strokes() {
        let data = bar(24, 8, 6, 18);
        let opts = SwtOptions {
            ray_length: 6,
            ..Default::default()
        };
        let out = run(&data, 24, 8, &opts);
        assert!(out.rays.is_empty());
    }

    #[test]
    fn stroke_color_ends_rays_inside_a_shaded_stroke() {
        // dark stroke lightening by 10 per column: too gentle for an edge,
        // but 60 levels from its start after six columns
        let (w, h) = (24, 12);
        let mut data = bar(w, h, 4, 20);
        for y in 0..h {
            for x in 4..20 {
                let i = (y * w + x) * 4;
                data[i..i + 3].fill(10 * (x as u8 - 4));
            }
        }
        let plain = SwtOptions {
            ray_length: 30,
            ..Default::default()
        };
        let out = run(&data, w, h, &plain);
        assert!(out.rays.iter().any(|r| r.width >= 15));
        assert_ne!(out.map.get(14, 6), STROKE_NONE);

        let colored = SwtOptions {
            use_stroke_color: true,
            ..plain
        };
        let out = run(&data, w, h, &colored);
        assert!(!out.rays.is_empty());
        assert!(out.rays.iter().all(|r| r.width <= 8), "{:?}", out.rays);
        assert_eq!(out.map.get(14, 6), STROKE_NONE);
        assert!(out.map.get(6, 6) <= 8);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let data = bar(5, 5, 2, 3);
        let buf = PixelBuffer::new(&data, 5, 5, 4).unwrap();
        let grad = compute_gradients(&buf, SobelKernel::Sobel3).unwrap();
        let edges = non_maximum_suppression(&grad);
        let opts = SwtOptions {
            ray_length: 1,
            ..Default::default()
        };
        assert_eq!(
            stroke_width_transform(&buf, &grad, &edges, &opts).unwrap_err(),
            DetectError::InvalidRayLength(1)
        );
    }
}
