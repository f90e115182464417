//! Filters over planar float images.
//!
//! ## Precision
//!
//! All filters operate on [`PlanarImage`](crate::planar::PlanarImage) planes:
//!
//! | Stage | Type | Range |
//! |-------|------|-------|
//! | Input (decoded) | u8 / u16 | widened to 16-bit scale |
//! | Processing | f32 planes | nominally 0.0-65535.0, unclamped |
//! | Output (encodable) | u8 RGBA | `v / 256`, clamped, alpha 255 |
//!
//! Intermediate results are never clamped, so chained filters keep their
//! precision.
//!
//! ## Architecture
//!
//! - **kernel** - odd square kernels: mean, Gaussian, Laplacians
//! - **convolve** - per-plane convolution with a pluggable edge policy
//! - **elementwise** - n-ary per-pixel combination of same-sized images
//! - **sharpen** - unsharp mask and Laplacian sharpen, built from the above
//! - **resample** - bilinear and bicubic scaling
//!
//! Planes are independent and processed in parallel with rayon.

pub mod kernel;
pub mod convolve;
pub mod elementwise;
pub mod sharpen;
pub mod resample;
