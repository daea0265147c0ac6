//! Image containers used by the detection stages.
//!
//! - [`PixelBuffer`]: borrowed, interleaved multi-channel input frame.
//! - [`ColorImage`]: owned interleaved buffer produced by preprocessing and
//!   the background estimator.
//! - [`GrayImage`] / [`ImageU8`]: owned and borrowed single-channel bytes.
//! - [`ImageF32`]: owned float plane used for gradients and edge magnitudes.
pub mod f32;
pub mod io;
pub mod pixels;
pub mod traits;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::pixels::{ColorImage, PixelBuffer};
pub use self::traits::{ImageView, Rows};
pub use self::u8::{GrayImage, ImageU8};
