//! Digital line walker used to cast rays across strokes.
//!
//! The walker keeps one error accumulator per axis, seeded with the absolute
//! gradient components. Each step moves along x while `ex >= ey` (then grows
//! `ey`), otherwise along y (then grows `ex`). The resulting path follows
//! the gradient slope without sub-pixel interpolation.

/// Direction tweak applied to a ray: scales of the gradient components and
/// the angular offset used when checking the opposite edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perturbation {
    pub scale_x: f32,
    pub scale_y: f32,
    /// Degrees added to the opposite edge's angle before the check.
    pub angle: f32,
}

/// The three rays cast from every edge pixel.
pub const PERTURBATIONS: [Perturbation; 3] = [
    Perturbation {
        scale_x: 0.75,
        scale_y: 1.0,
        angle: 15.0,
    },
    Perturbation {
        scale_x: 1.0,
        scale_y: 1.0,
        angle: 0.0,
    },
    Perturbation {
        scale_x: 1.0,
        scale_y: 0.75,
        angle: 345.0,
    },
];

#[inline]
fn sign(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Stateful walker positioned on the ray's current pixel.
#[derive(Clone, Copy, Debug)]
pub struct RayWalker {
    pub cx: i32,
    pub cy: i32,
    ix: i32,
    iy: i32,
    step_x: f32,
    step_y: f32,
    ex: f32,
    ey: f32,
}

impl RayWalker {
    /// Start at `(x, y)` heading along `(dx, dy)` scaled by `p`, with the
    /// direction sign `dir` (`+1` or `-1`).
    pub fn new(x: u32, y: u32, dx: f32, dy: f32, p: &Perturbation, dir: i32) -> Self {
        let (sdx, sdy) = (dx * p.scale_x, dy * p.scale_y);
        let (ax, ay) = (sdx.abs(), sdy.abs());
        Self {
            cx: x as i32,
            cy: y as i32,
            ix: dir * sign(sdx),
            iy: dir * sign(sdy),
            step_x: ax,
            step_y: ay,
            ex: ax,
            ey: ay,
        }
    }

    /// Move one pixel along the ray.
    #[inline]
    pub fn advance(&mut self) {
        if self.ex >= self.ey {
            self.ey += self.step_y;
            self.cx += self.ix;
        } else {
            self.ex += self.step_x;
            self.cy += self.iy;
        }
    }

    /// `true` once the walker has left a `w × h` frame on the side it is
    /// travelling towards.
    #[inline]
    pub fn exited(&self, w: usize, h: usize) -> bool {
        let mx = if self.ix > 0 { w as i32 } else { -1 };
        let my = if self.iy > 0 { h as i32 } else { -1 };
        self.cx == mx || self.cy == my
    }

    /// Linear index of the current pixel, or `None` outside the frame.
    #[inline]
    pub fn index(&self, w: usize, h: usize) -> Option<usize> {
        if self.cx < 0 || self.cy < 0 || self.cx >= w as i32 || self.cy >= h as i32 {
            return None;
        }
        Some(self.cy as usize * w + self.cx as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRAIGHT: Perturbation = PERTURBATIONS[1];

    fn path(mut walker: RayWalker, steps: usize) -> Vec<(i32, i32)> {
        (0..steps)
            .map(|_| {
                walker.advance();
                (walker.cx, walker.cy)
            })
            .collect()
    }

    #[test]
    fn horizontal_ray_moves_along_x() {
        let w = RayWalker::new(5, 5, 10.0, 0.0, &STRAIGHT, 1);
        assert_eq!(path(w, 3), vec![(6, 5), (7, 5), (8, 5)]);
        let back = RayWalker::new(5, 5, 10.0, 0.0, &STRAIGHT, -1);
        assert_eq!(path(back, 2), vec![(4, 5), (3, 5)]);
    }

    #[test]
    fn diagonal_ray_alternates_axes() {
        let w = RayWalker::new(0, 0, 4.0, 4.0, &STRAIGHT, 1);
        assert_eq!(path(w, 4), vec![(1, 0), (1, 1), (2, 1), (2, 2)]);
    }

    #[test]
    fn steep_ray_favours_y() {
        let w = RayWalker::new(0, 0, 1.0, 3.0, &STRAIGHT, 1);
        assert_eq!(path(w, 4), vec![(0, 1), (0, 2), (1, 2), (1, 3)]);
    }

    #[test]
    fn exit_is_detected_on_travel_side() {
        let mut w = RayWalker::new(2, 1, 10.0, 0.0, &STRAIGHT, 1);
        w.advance();
        assert!(w.exited(3, 3));
        let mut up = RayWalker::new(1, 0, 0.0, 5.0, &STRAIGHT, -1);
        up.advance();
        assert!(up.exited(3, 3));
        assert_eq!(up.index(3, 3), None);
    }
}
