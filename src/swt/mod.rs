//! Stroke Width Transform.
//!
//! Rays are cast from every edge pixel along its gradient (three slightly
//! perturbed variants per pixel) until they meet a roughly opposite edge.
//! Paired rays then assign their length to the pixels they cross, first as
//! a running minimum and then capped at the median along each ray.
//!
//! The stroke-width map uses [`STROKE_NONE`] for pixels no ray crossed.
pub mod map;
pub mod options;
pub mod ray;
pub mod transform;

pub use map::{StrokeWidthMap, STROKE_NONE};
pub use options::{SwtDirection, SwtOptions};
pub use ray::{Perturbation, RayWalker, PERTURBATIONS};
pub use transform::{stroke_width_transform, stroke_width_transform_both, RayRecord, SwtOutput};
