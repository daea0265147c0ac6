//! Edge processing: per-pixel gradients and weighted non-maximum suppression.
//!
//! - Gradient computation (Sobel 3×3 / 5×5) over every channel of an
//!   interleaved frame, keeping the strongest channel response per axis.
//!   Outputs `dx`, `dy`, magnitude, angle in degrees and a quantized
//!   neighbour table (`NeighborInfo`) that splits the gradient direction
//!   across up to three compass neighbours.
//! - Non-maximum suppression that compares each pixel against the weighted
//!   magnitudes on both sides along its gradient, producing a dense edge map.
//!
//! Border handling: the 3×3 kernel clamps its centre to the interior, the
//! 5×5 kernel clamps every sample to the edge. NMS always suppresses the
//! outermost 1-pixel frame.

pub mod grad;
pub mod nms;
pub mod options;

/// Per-pixel gradients with angle and neighbour weights.
pub use grad::{compute_gradients, gradient_angle, GradientField, NeighborInfo, NEIGHBOR_OFFSETS};
/// Weighted NMS producing a dense edge map plus a sparse edge list.
pub use nms::{collect_edges, non_maximum_suppression, EdgeElement, MAGNITUDE_THRESHOLD};
pub use options::{GradientOptions, SobelKernel};
