//! Image scaling with bilinear or bicubic interpolation.
//!
//! Output pixel centres are mapped back onto the source grid with
//! `src = (o + 0.5) / factor - 0.5`, clamped to the first and last sample.
//! Neighbours that fall outside the plane repeat the border sample.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use super::convolve::{EdgeExtension, EdgePolicy};
use crate::error::{Error, Result};
use crate::interpolate::{bicubic_interpolation, bilerp};
use crate::planar::PlanarImage;

/// Interpolation method used by [`scale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    Bilinear,
    #[default]
    Bicubic,
}

/// Parameters for [`scale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleParams {
    pub x_factor: f64,
    pub y_factor: f64,
    pub method: Interpolation,
}

impl ScaleParams {
    /// Same factor on both axes, bicubic.
    pub fn uniform(factor: f64) -> Self {
        Self {
            x_factor: factor,
            y_factor: factor,
            ..Default::default()
        }
    }
}

impl Default for ScaleParams {
    fn default() -> Self {
        Self {
            x_factor: 2.0,
            y_factor: 2.0,
            method: Interpolation::default(),
        }
    }
}

/// Source sample index below the target and the exact target position.
#[derive(Debug, Clone, Copy)]
struct Tap {
    base: isize,
    pos: f32,
}

fn check_factor(name: &'static str, factor: f64) -> Result<()> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(name, format!("must be finite and positive, got {factor}")))
    }
}

/// Scaled side length; never 0 for a non-empty side.
fn scaled_len(len: usize, factor: f64) -> Option<usize> {
    if len == 0 {
        return Some(0);
    }
    let scaled = (len as f64 * factor).round().max(1.0);
    if scaled < usize::MAX as f64 {
        Some(scaled as usize)
    } else {
        None
    }
}

fn axis_taps(out_len: usize, in_len: usize, factor: f64) -> Vec<Tap> {
    let last = in_len.saturating_sub(1) as f64;
    (0..out_len)
        .map(|o| {
            let src = ((o as f64 + 0.5) / factor - 0.5).clamp(0.0, last);
            Tap {
                base: src.floor() as isize,
                pos: src as f32,
            }
        })
        .collect()
}

fn sample(plane: &ArrayView2<f32>, x: isize, y: isize) -> f32 {
    let (height, width) = plane.dim();
    let edge = EdgePolicy::Clamp;
    plane[[edge.extend(y, height), edge.extend(x, width)]]
}

fn bilinear_at(plane: &ArrayView2<f32>, xt: Tap, yt: Tap) -> Result<f32> {
    let (x0, y0) = (xt.base, yt.base);
    let (px0, py0) = (x0 as f32, y0 as f32);
    bilerp(
        px0,
        xt.pos,
        px0 + 1.0,
        py0,
        yt.pos,
        py0 + 1.0,
        sample(plane, x0, y0),
        sample(plane, x0, y0 + 1),
        sample(plane, x0 + 1, y0),
        sample(plane, x0 + 1, y0 + 1),
    )
}

fn bicubic_at(plane: &ArrayView2<f32>, xt: Tap, yt: Tap) -> Result<f32> {
    let known = |base: isize| [base - 1, base, base + 1, base + 2];
    let positions = |tap: Tap| {
        let b = tap.base as f32;
        [b - 1.0, b, tap.pos, b + 1.0, b + 2.0]
    };

    let (xk, yk) = (known(xt.base), known(yt.base));
    let mut samples = [[0.0f32; 4]; 4];
    for (row, &y) in samples.iter_mut().zip(&yk) {
        for (v, &x) in row.iter_mut().zip(&xk) {
            *v = sample(plane, x, y);
        }
    }

    bicubic_interpolation(positions(xt), positions(yt), &samples)
}

fn scale_plane(
    src: ArrayView2<f32>,
    dst: &mut Array2<f32>,
    xtaps: &[Tap],
    ytaps: &[Tap],
    method: Interpolation,
) -> Result<()> {
    for ((y, x), v) in dst.indexed_iter_mut() {
        let (xt, yt) = (xtaps[x], ytaps[y]);
        *v = match method {
            Interpolation::Bilinear => bilinear_at(&src, xt, yt)?,
            Interpolation::Bicubic => bicubic_at(&src, xt, yt)?,
        };
    }
    Ok(())
}

/// Resize `image` by the given factors.
///
/// The output is `round(width * x_factor)` by `round(height * y_factor)`,
/// at least one pixel on each non-empty side.
///
/// # Errors
/// - [`Error::InvalidParameter`] unless both factors are finite and positive.
/// - [`Error::DimensionOverflow`] if the output cannot be allocated.
pub fn scale(image: &PlanarImage, params: &ScaleParams) -> Result<PlanarImage> {
    check_factor("x_factor", params.x_factor)?;
    check_factor("y_factor", params.y_factor)?;

    let (width, height) = (image.width(), image.height());
    let overflow = || Error::DimensionOverflow { width, height };
    let out_width = scaled_len(width, params.x_factor).ok_or_else(overflow)?;
    let out_height = scaled_len(height, params.y_factor).ok_or_else(overflow)?;

    tracing::debug!(
        width,
        height,
        out_width,
        out_height,
        method = ?params.method,
        "scale"
    );

    let mut result = PlanarImage::new(out_width, out_height)?;
    if width == 0 || height == 0 {
        return Ok(result);
    }

    let xtaps = axis_taps(out_width, width, params.x_factor);
    let ytaps = axis_taps(out_height, height, params.y_factor);

    result
        .planes
        .par_iter_mut()
        .zip(image.planes.par_iter())
        .try_for_each(|(dst, src)| scale_plane(src.view(), dst, &xtaps, &ytaps, params.method))?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHODS: [Interpolation; 2] = [Interpolation::Bilinear, Interpolation::Bicubic];

    fn noisy(width: usize, height: usize) -> PlanarImage {
        let mut img = PlanarImage::new(width, height).unwrap();
        for c in 0..3 {
            for y in 0..height {
                for x in 0..width {
                    img.set(c, x, y, ((x * 7919 + y * 104729 + c * 131) % 65536) as f32);
                }
            }
        }
        img
    }

    fn ramp_x(width: usize, height: usize, step: f32) -> PlanarImage {
        let mut img = PlanarImage::new(width, height).unwrap();
        for c in 0..3 {
            for y in 0..height {
                for x in 0..width {
                    img.set(c, x, y, x as f32 * step);
                }
            }
        }
        img
    }

    #[test]
    fn test_default_params() {
        let params = ScaleParams::default();
        assert_eq!((params.x_factor, params.y_factor), (2.0, 2.0));
        assert_eq!(params.method, Interpolation::Bicubic);
        assert_eq!(ScaleParams::uniform(0.5).y_factor, 0.5);
    }

    #[test]
    fn test_factor_one_is_identity() {
        let img = noisy(7, 5);
        for method in METHODS {
            let params = ScaleParams {
                x_factor: 1.0,
                y_factor: 1.0,
                method,
            };
            assert_eq!(scale(&img, &params).unwrap(), img, "{method:?}");
        }
    }

    #[test]
    fn test_output_size() {
        let img = noisy(5, 3);
        let out = scale(&img, &ScaleParams::default()).unwrap();
        assert_eq!((out.width(), out.height()), (10, 6));

        let params = ScaleParams {
            x_factor: 0.1,
            y_factor: 1.5,
            method: Interpolation::Bilinear,
        };
        let out = scale(&img, &params).unwrap();
        assert_eq!((out.width(), out.height()), (1, 5));

        let empty = PlanarImage::new(0, 4).unwrap();
        let out = scale(&empty, &ScaleParams::default()).unwrap();
        assert_eq!((out.width(), out.height()), (0, 8));
    }

    #[test]
    fn test_bilinear_upscale_ramp() {
        let img = ramp_x(4, 2, 100.0);
        let params = ScaleParams {
            method: Interpolation::Bilinear,
            ..Default::default()
        };
        let out = scale(&img, &params).unwrap();

        // output x=3 maps to source x=1.25
        assert!((out.get(0, 3, 1).unwrap() - 125.0).abs() < 1e-3);
        // border outputs clamp onto the first and last sample
        assert_eq!(out.get(0, 0, 0), Some(0.0));
        assert_eq!(out.get(0, 7, 3), Some(300.0));
    }

    #[test]
    fn test_bicubic_reproduces_interior_ramp() {
        let img = ramp_x(6, 3, 100.0);
        let out = scale(&img, &ScaleParams::default()).unwrap();
        for o in 3..8 {
            let expected = ((o as f32 + 0.5) / 2.0 - 0.5) * 100.0;
            let got = out.get(1, o, 2).unwrap();
            assert!((got - expected).abs() < 1e-2, "x={o}: {got} vs {expected}");
        }
    }

    #[test]
    fn test_downscale_averages_neighbours() {
        let img = ramp_x(4, 4, 10.0);
        let params = ScaleParams {
            x_factor: 0.5,
            y_factor: 0.5,
            method: Interpolation::Bilinear,
        };
        let out = scale(&img, &params).unwrap();
        assert_eq!((out.width(), out.height()), (2, 2));
        assert!((out.get(2, 0, 0).unwrap() - 5.0).abs() < 1e-4);
        assert!((out.get(2, 1, 1).unwrap() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_constant_image_stays_constant() {
        let mut img = PlanarImage::new(3, 3).unwrap();
        img.plane_mut(1).unwrap().fill(4242.0);
        for method in METHODS {
            let params = ScaleParams {
                x_factor: 2.5,
                y_factor: 1.7,
                method,
            };
            let out = scale(&img, &params).unwrap();
            assert!(out.planes()[1].iter().all(|&v| (v - 4242.0).abs() < 1e-2));
            assert!(out.planes()[0].iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_rejects_bad_factors() {
        let img = noisy(2, 2);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let params = ScaleParams {
                x_factor: bad,
                ..Default::default()
            };
            assert!(matches!(
                scale(&img, &params),
                Err(Error::InvalidParameter { name: "x_factor", .. })
            ));
            let params = ScaleParams {
                y_factor: bad,
                ..Default::default()
            };
            assert!(scale(&img, &params).is_err());
        }
    }
}
