//! Sharpening filters composed from convolution and elementwise combination.
//!
//! Both filters work on the full-precision planes and never clamp; values may
//! leave the nominal range until the image is converted back to 8 bits.

use super::convolve::{convolve, EdgePolicy};
use super::elementwise::{apply, PixelFn};
use super::kernel::{gaussian_filter, laplace_spherical};
use crate::error::{Error, Result};
use crate::planar::PlanarImage;

// ============================================================================
// Unsharp Mask
// ============================================================================

/// Parameters for [`unsharp`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnsharpParams {
    /// Radius of the Gaussian blur kernel.
    pub radius: usize,
    /// Variance of the Gaussian blur kernel.
    pub amount: f64,
    /// Minimum absolute difference to the blurred image for a sample to be
    /// sharpened, on the 16-bit scale.
    pub threshold: f64,
}

impl Default for UnsharpParams {
    fn default() -> Self {
        Self {
            radius: 2,
            amount: 1.0,
            threshold: 0.0,
        }
    }
}

/// Apply an unsharp mask in place.
///
/// Each sample whose difference to the Gaussian-blurred image exceeds
/// `threshold` gets that difference added once more: `orig + (orig - blurred)`.
/// Other samples keep their value, so an infinite threshold leaves the image
/// unchanged.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] if `amount` is not a valid variance or
/// `threshold` is NaN.
pub fn unsharp_in_place(image: &mut PlanarImage, params: &UnsharpParams) -> Result<()> {
    let UnsharpParams {
        radius,
        amount,
        threshold,
    } = *params;

    if threshold.is_nan() {
        return Err(Error::invalid("threshold", "must not be NaN"));
    }

    tracing::debug!(radius, amount, threshold, "unsharp mask");

    let kernel = gaussian_filter(radius, amount)?;
    let blurred = convolve(image, &kernel, &EdgePolicy::Clamp)?;

    let sharpen = PixelFn::new(2, |v: &[f32]| {
        let (orig, blur) = (v[0], v[1]);
        let diff = orig - blur;
        if f64::from(diff).abs() > threshold {
            orig + diff
        } else {
            orig
        }
    })?;

    apply(&sharpen, image, &[&blurred])
}

/// Apply an unsharp mask, returning a new image.
pub fn unsharp(image: &PlanarImage, params: &UnsharpParams) -> Result<PlanarImage> {
    let mut result = image.clone();
    unsharp_in_place(&mut result, params)?;
    Ok(result)
}

// ============================================================================
// Laplacian Sharpen
// ============================================================================

/// Add the spherical Laplacian response to every sample.
///
/// The Laplacian is not inverted, so flat regions are unchanged while edges
/// shift in brightness; no compensation is applied.
pub fn sharpen_laplace_in_place(image: &mut PlanarImage) -> Result<()> {
    tracing::debug!(width = image.width(), height = image.height(), "laplace sharpen");

    let edges = convolve(image, &laplace_spherical(), &EdgePolicy::Clamp)?;
    let add = PixelFn::new(2, |v: &[f32]| v[0] + v[1])?;
    apply(&add, image, &[&edges])
}

/// Laplacian sharpen, returning a new image.
pub fn sharpen_laplace(image: &PlanarImage) -> Result<PlanarImage> {
    let mut result = image.clone();
    sharpen_laplace_in_place(&mut result)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(size: usize, value: f32) -> PlanarImage {
        let mut img = PlanarImage::new(size, size).unwrap();
        for c in 0..3 {
            img.set(c, size / 2, size / 2, value);
        }
        img
    }

    fn noisy(width: usize, height: usize) -> PlanarImage {
        let mut img = PlanarImage::new(width, height).unwrap();
        for c in 0..3 {
            for y in 0..height {
                for x in 0..width {
                    let v = ((x * 7919 + y * 104729 + c * 31) % 65536) as f32;
                    img.set(c, x, y, v);
                }
            }
        }
        img
    }

    #[test]
    fn test_default_params() {
        let params = UnsharpParams::default();
        assert_eq!(params.radius, 2);
        assert_eq!(params.amount, 1.0);
        assert_eq!(params.threshold, 0.0);
    }

    #[test]
    fn test_unsharp_infinite_threshold_is_identity() {
        let img = noisy(9, 6);
        let params = UnsharpParams {
            threshold: f64::INFINITY,
            ..Default::default()
        };
        assert_eq!(unsharp(&img, &params).unwrap(), img);
    }

    #[test]
    fn test_unsharp_boosts_impulse() {
        let img = impulse(7, 1000.0);
        let out = unsharp(&img, &UnsharpParams::default()).unwrap();

        for c in 0..3 {
            assert!(out.get(c, 3, 3).unwrap() > 1000.0);
            // neighbours are pushed below their original zero
            assert!(out.get(c, 2, 3).unwrap() < 0.0);
            assert!(out.get(c, 3, 4).unwrap() < 0.0);
        }
        // input untouched
        assert_eq!(img.get(0, 3, 3), Some(1000.0));
    }

    #[test]
    fn test_unsharp_threshold_skips_small_differences() {
        let img = impulse(7, 1000.0);
        let params = UnsharpParams {
            threshold: 1e5,
            ..Default::default()
        };
        assert_eq!(unsharp(&img, &params).unwrap(), img);
    }

    #[test]
    fn test_unsharp_flat_image_nearly_unchanged() {
        let mut img = PlanarImage::new(6, 5).unwrap();
        for c in 0..3 {
            img.plane_mut(c).unwrap().fill(30000.0);
        }
        let out = unsharp(&img, &UnsharpParams::default()).unwrap();
        for plane in out.planes() {
            assert!(plane.iter().all(|&v| (v - 30000.0).abs() < 0.5));
        }
    }

    #[test]
    fn test_unsharp_rejects_bad_params() {
        let img = impulse(3, 1.0);
        let bad_variance = UnsharpParams {
            amount: 0.0,
            ..Default::default()
        };
        assert!(unsharp(&img, &bad_variance).is_err());

        let nan_threshold = UnsharpParams {
            threshold: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            unsharp(&img, &nan_threshold),
            Err(Error::InvalidParameter { name: "threshold", .. })
        ));
    }

    #[test]
    fn test_sharpen_laplace_impulse() {
        let img = impulse(5, 10.0);
        let out = sharpen_laplace(&img).unwrap();

        for c in 0..3 {
            assert_eq!(out.get(c, 2, 2), Some(10.0 - 80.0));
            assert_eq!(out.get(c, 1, 2), Some(10.0));
            assert_eq!(out.get(c, 1, 1), Some(10.0));
            assert_eq!(out.get(c, 0, 0), Some(0.0));
        }
    }

    #[test]
    fn test_sharpen_laplace_flat_is_identity() {
        let mut img = PlanarImage::new(4, 4).unwrap();
        for c in 0..3 {
            img.plane_mut(c).unwrap().fill(100.0 * (c + 1) as f32);
        }
        let mut in_place = img.clone();
        sharpen_laplace_in_place(&mut in_place).unwrap();
        assert_eq!(in_place, img);
    }
}
