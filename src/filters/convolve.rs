//! Direct 2D convolution of planar images.
//!
//! Every plane is convolved independently with the same kernel:
//!
//! ```text
//! out[y, x] = Σ  plane[E(y + dy, h), E(x + dx, w)] * k[dy + r, dx + r]
//!            dy,dx ∈ [-r, r]
//! ```
//!
//! where `E` is the edge-extension policy resolving coordinates that fall
//! outside the plane. This is a plain spatial convolution (not separable, no
//! FFT), O(width · height · diameter²) per plane. Planes run in parallel.

use ndarray::{Array2, ArrayView2, ArrayViewMut2};
use rayon::prelude::*;

use super::kernel::ConvKernel;
use crate::error::{Error, Result};
use crate::planar::PlanarImage;

// ============================================================================
// Edge extension
// ============================================================================

/// Maps a coordinate that may lie outside `0..limit` onto a valid index.
///
/// Implementations are only called with `limit > 0` by the convolution
/// engine and must return a value in `0..limit`.
pub trait EdgeExtension: Sync {
    fn extend(&self, coord: isize, limit: usize) -> usize;
}

/// The standard edge-extension policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgePolicy {
    /// Repeat the border sample.
    #[default]
    Clamp,
    /// Tile the plane (`coord mod limit`, always non-negative).
    Wrap,
}

impl EdgeExtension for EdgePolicy {
    #[inline]
    fn extend(&self, coord: isize, limit: usize) -> usize {
        match self {
            Self::Clamp => {
                if coord < 0 {
                    0
                } else {
                    (coord as usize).min(limit.saturating_sub(1))
                }
            }
            Self::Wrap => {
                if limit == 0 {
                    return 0;
                }
                // rem_euclid keeps negative coordinates in range: -1 -> limit - 1
                coord.rem_euclid(limit as isize) as usize
            }
        }
    }
}

impl<F> EdgeExtension for F
where
    F: Fn(isize, usize) -> usize + Sync,
{
    #[inline]
    fn extend(&self, coord: isize, limit: usize) -> usize {
        self(coord, limit)
    }
}

/// Mapped indices for every position along one axis and every kernel tap.
///
/// Entry `pos * diameter + k` holds `edge(pos + k - radius)`.
fn offset_table<E>(limit: usize, radius: usize, edge: &E) -> Result<Vec<usize>>
where
    E: EdgeExtension + ?Sized,
{
    let diameter = 2 * radius + 1;
    let mut table = Vec::with_capacity(limit * diameter);
    for pos in 0..limit {
        for k in 0..diameter {
            let coord = pos as isize + k as isize - radius as isize;
            let mapped = edge.extend(coord, limit);
            if mapped >= limit {
                return Err(Error::EdgeOutOfRange {
                    coord,
                    mapped,
                    limit,
                });
            }
            table.push(mapped);
        }
    }
    Ok(table)
}

// ============================================================================
// Convolution
// ============================================================================

/// Convolve one plane into an explicit destination of the same shape.
///
/// `dst` must not alias `src`; both public forms pass a freshly allocated
/// destination.
fn convolve_plane_into<E>(
    src: ArrayView2<f32>,
    kernel: &ConvKernel,
    edge: &E,
    mut dst: ArrayViewMut2<f32>,
) -> Result<()>
where
    E: EdgeExtension + ?Sized,
{
    let (height, width) = src.dim();
    let radius = kernel.radius();
    let diameter = kernel.diameter();
    let weights = kernel.weights();

    let xmap = offset_table(width, radius, edge)?;
    let ymap = offset_table(height, radius, edge)?;

    for y in 0..height {
        let rows = &ymap[y * diameter..(y + 1) * diameter];
        for x in 0..width {
            let cols = &xmap[x * diameter..(x + 1) * diameter];
            let mut sum = 0.0f32;
            for (ky, &sy) in rows.iter().enumerate() {
                for (kx, &sx) in cols.iter().enumerate() {
                    sum += src[[sy, sx]] * weights[[ky, kx]];
                }
            }
            dst[[y, x]] = sum;
        }
    }

    Ok(())
}

/// Convolve every plane of `image`, returning a new image.
///
/// # Errors
/// Returns [`Error::EdgeOutOfRange`] if `edge` maps a coordinate outside the
/// plane.
pub fn convolve<E>(image: &PlanarImage, kernel: &ConvKernel, edge: &E) -> Result<PlanarImage>
where
    E: EdgeExtension + ?Sized,
{
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        radius = kernel.radius(),
        "convolve"
    );

    let mut result = PlanarImage::new(image.width(), image.height())?;
    result
        .planes
        .par_iter_mut()
        .zip(image.planes.par_iter())
        .try_for_each(|(dst, src)| convolve_plane_into(src.view(), kernel, edge, dst.view_mut()))?;

    Ok(result)
}

/// Convolve every plane of `image` in place.
///
/// Each plane is computed into a fresh buffer and swapped in, so later pixels
/// never read already-convolved values. Observably identical to [`convolve`].
pub fn convolve_in_place<E>(image: &mut PlanarImage, kernel: &ConvKernel, edge: &E) -> Result<()>
where
    E: EdgeExtension + ?Sized,
{
    let result = convolve(image, kernel, edge)?;
    image.planes = result.planes;
    Ok(())
}

/// Convolve with [`EdgePolicy::Clamp`].
pub fn convolve_clamp(image: &PlanarImage, kernel: &ConvKernel) -> Result<PlanarImage> {
    convolve(image, kernel, &EdgePolicy::Clamp)
}

/// Convolve a single plane with an explicit policy (e.g. for one-channel data).
pub fn convolve_plane<E>(
    plane: ArrayView2<f32>,
    kernel: &ConvKernel,
    edge: &E,
) -> Result<Array2<f32>>
where
    E: EdgeExtension + ?Sized,
{
    let mut dst = Array2::<f32>::zeros(plane.dim());
    convolve_plane_into(plane, kernel, edge, dst.view_mut())?;
    Ok(dst)
}
