//! Square convolution kernels with odd diameter.
//!
//! A kernel of radius `r` has `diameter = 2r + 1` and stores its weights as a
//! `(diameter, diameter)` array in row-major order.

use std::f64::consts::PI;

use ndarray::Array2;

use crate::error::{Error, Result};

/// Tolerance used for kernel sums and kernel comparisons.
pub const TOLERANCE: f64 = 1e-7;

/// Odd-sized square convolution kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvKernel {
    weights: Array2<f32>,
    radius: usize,
}

/// Diameter and weight count of a kernel with the given radius.
fn kernel_extent(radius: usize) -> Result<(usize, usize)> {
    radius
        .checked_mul(2)
        .and_then(|d| d.checked_add(1))
        .and_then(|d| Some((d, d.checked_mul(d)?)))
        .ok_or_else(|| Error::invalid("radius", format!("kernel radius {radius} is too large")))
}

impl ConvKernel {
    /// Build a kernel from `diameter²` row-major weights.
    ///
    /// # Errors
    /// - [`Error::InvalidParameter`] if `diameter²` overflows.
    /// - [`Error::KernelShape`] if `weights.len() != diameter²`.
    pub fn new(radius: usize, weights: Vec<f32>) -> Result<Self> {
        let (diameter, area) = kernel_extent(radius)?;
        let actual = weights.len();
        let shape_error = Error::KernelShape {
            radius,
            expected: area,
            actual,
        };
        if actual != area {
            return Err(shape_error);
        }

        let weights =
            Array2::from_shape_vec((diameter, diameter), weights).map_err(|_| shape_error)?;
        Ok(Self { weights, radius })
    }

    /// Build a 3x3 kernel from its nine weights, row by row.
    #[rustfmt::skip]
    #[allow(clippy::too_many_arguments)]
    pub fn new3(
        a: f32, b: f32, c: f32,
        d: f32, e: f32, f: f32,
        g: f32, h: f32, i: f32,
    ) -> Self {
        Self {
            weights: ndarray::arr2(&[[a, b, c], [d, e, f], [g, h, i]]),
            radius: 1,
        }
    }

    /// Zero-filled kernel of the given radius.
    fn zeros(radius: usize) -> Result<Self> {
        let (diameter, _) = kernel_extent(radius)?;
        Ok(Self {
            weights: Array2::zeros((diameter, diameter)),
            radius,
        })
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn diameter(&self) -> usize {
        2 * self.radius + 1
    }

    /// Weights as a `(diameter, diameter)` array; `weights[[ky, kx]]`.
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Sum of all weights, accumulated in f64.
    pub fn sum(&self) -> f64 {
        self.weights.iter().map(|&w| f64::from(w)).sum()
    }

    /// Divide every weight by the kernel sum.
    ///
    /// Only acts when the sum differs from both 0 and 1 by at least
    /// [`TOLERANCE`]; otherwise the kernel is left as is. Idempotent.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum.abs() < TOLERANCE || (sum - 1.0).abs() < TOLERANCE {
            tracing::trace!(sum, radius = self.radius, "kernel left unnormalized");
            return;
        }

        tracing::trace!(sum, radius = self.radius, "normalizing kernel");
        self.weights.mapv_inplace(|w| (f64::from(w) / sum) as f32);
    }
}

// ============================================================================
// Filter kernels
// ============================================================================

/// Mean filter: every weight is `1 / diameter²`.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] if the radius is too large to address.
pub fn mean_filter(radius: usize) -> Result<ConvKernel> {
    let mut kernel = ConvKernel::zeros(radius)?;
    let mean = 1.0 / kernel.weights.len() as f32;
    kernel.weights.fill(mean);
    Ok(kernel)
}

/// Sampled Gaussian, normalized to sum 1.
///
/// `G(x, y) = β·exp(-α(x² + y²))` with `α = 1 / (2·variance)` and `β = α / π`.
/// One quadrant is evaluated and mirrored to the other three.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] unless `variance` is finite and positive,
/// or if the radius is too large to address.
pub fn gaussian_filter(radius: usize, variance: f64) -> Result<ConvKernel> {
    if !(variance.is_finite() && variance > 0.0) {
        return Err(Error::invalid(
            "variance",
            format!("must be finite and positive, got {variance}"),
        ));
    }

    let alpha = 0.5 / variance;
    let beta = alpha / PI;

    let mut kernel = ConvKernel::zeros(radius)?;
    for y in 0..=radius {
        for x in 0..=radius {
            let gauss = (beta * (-alpha * (x * x + y * y) as f64).exp()) as f32;

            // (x,y), (-x,y), (x,-y), (-x,-y) share a weight
            let (x1, x2) = (radius + x, radius - x);
            let (y1, y2) = (radius + y, radius - y);
            kernel.weights[[y1, x1]] = gauss;
            kernel.weights[[y1, x2]] = gauss;
            kernel.weights[[y2, x1]] = gauss;
            kernel.weights[[y2, x2]] = gauss;
        }
    }

    kernel.normalize();
    Ok(kernel)
}

/// Laplacian without diagonals.
///
/// ```text
/// 0  1  0
/// 1 -4  1
/// 0  1  0
/// ```
pub fn laplace_without_diagonal() -> ConvKernel {
    let (c, m, o) = (0.0, 1.0, -4.0); // corner, middle, origin
    ConvKernel::new3(c, m, c, m, o, m, c, m, c)
}

/// Laplacian with half-weighted diagonals.
///
/// ```text
/// 0.5  1.0  0.5
/// 1.0 -6.0  1.0
/// 0.5  1.0  0.5
/// ```
pub fn laplace_with_diagonal() -> ConvKernel {
    let (c, m, o) = (0.5, 1.0, -6.0);
    ConvKernel::new3(c, m, c, m, o, m, c, m, c)
}

/// Laplacian with diagonals weighted like direct neighbours.
///
/// ```text
/// 1  1  1
/// 1 -8  1
/// 1  1  1
/// ```
pub fn laplace_spherical() -> ConvKernel {
    let (n, o) = (1.0, -8.0);
    ConvKernel::new3(n, n, n, n, o, n, n, n, n)
}
