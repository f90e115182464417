//! Scalar interpolation primitives used by resampling.
//!
//! Naming follows the sample positions: `x0 <= x1 <= x2` for linear
//! interpolation, where `f0 = f(x0)` and `f2 = f(x2)` are known and `f1` is
//! computed. Cubic interpolation uses the four equally spaced known positions
//! `x0, x1, x3, x4` and computes `f2` for `x1 <= x2 <= x3`.
//!
//! Preconditions are checked and reported, never clamped.

use crate::error::{Error, Result};

/// Relative tolerance when checking that cubic sample positions are equally spaced.
const SPACING_TOLERANCE: f32 = 1e-5;

fn nearly_equal(a: f32, b: f32) -> bool {
    (a - b).abs() <= SPACING_TOLERANCE * a.abs().max(b.abs())
}

/// Linear interpolation of `f1` at `x1`, given `f0` at `x0` and `f2` at `x2`.
///
/// The endpoints are returned exactly.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] unless `x0 <= x1 <= x2` and `x0 < x2`.
pub fn lerp(x0: f32, x1: f32, x2: f32, f0: f32, f2: f32) -> Result<f32> {
    if !(x0 <= x1 && x1 <= x2 && x0 < x2) {
        return Err(Error::invalid(
            "x",
            format!("lerp needs x0 <= x1 <= x2 and x0 < x2, got {x0}, {x1}, {x2}"),
        ));
    }

    if x1 == x0 {
        return Ok(f0);
    }
    if x1 == x2 {
        return Ok(f2);
    }

    // each end is weighted by the distance to the other end
    let (d0, d2) = (x1 - x0, x2 - x1);
    Ok((f0 * d2 + f2 * d0) / (d0 + d2))
}

/// Bilinear interpolation of `f11` at `(x1, y1)`.
///
/// `fij` is the value at `(xi, yj)`: `f00 = f(x0, y0)`, `f02 = f(x0, y2)`,
/// `f20 = f(x2, y0)`, `f22 = f(x2, y2)`. Interpolates along x on both rows
/// first, then along y.
///
/// # Errors
/// Same preconditions as [`lerp`], for both axes.
#[rustfmt::skip]
#[allow(clippy::too_many_arguments)]
pub fn bilerp(
    x0: f32, x1: f32, x2: f32,
    y0: f32, y1: f32, y2: f32,
    f00: f32, f02: f32, f20: f32, f22: f32,
) -> Result<f32> {
    let f10 = lerp(x0, x1, x2, f00, f20)?;
    let f12 = lerp(x0, x1, x2, f02, f22)?;
    lerp(y0, y1, y2, f10, f12)
}

/// Cubic convolution (Keys, `a = -0.5`) of `f2` at `x2`.
///
/// Known samples `f0, f1, f3, f4` sit at the equally spaced positions
/// `x0 < x1 < x3 < x4`; `x2` must lie in `[x1, x3]`. At `x2 == x1` the result
/// is exactly `f1`, at `x2 == x3` exactly `f3`.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] if the spacing is not positive and
/// equal, or if `x2` is outside `[x1, x3]`.
#[rustfmt::skip]
#[allow(clippy::too_many_arguments)]
pub fn cubic_interpolation(
    x0: f32, x1: f32, x2: f32, x3: f32, x4: f32,
    f0: f32, f1: f32, f3: f32, f4: f32,
) -> Result<f32> {
    let step = x1 - x0;
    let equally_spaced = step > 0.0 && nearly_equal(x3 - x1, step) && nearly_equal(x4 - x3, step);
    if !equally_spaced {
        return Err(Error::invalid(
            "x",
            format!("cubic samples must be equally spaced, got {x0}, {x1}, {x3}, {x4}"),
        ));
    }
    if !(x1 <= x2 && x2 <= x3) {
        return Err(Error::invalid(
            "x",
            format!("cubic target {x2} outside [{x1}, {x3}]"),
        ));
    }

    if x2 == x1 {
        return Ok(f1);
    }
    if x2 == x3 {
        return Ok(f3);
    }

    let t = (x2 - x1) / (x3 - x1);

    // Horner form, highest power first
    let mut res = 3.0 * (f1 - f3) - f0 + f4;
    res *= t;
    res += 2.0 * f0 - 5.0 * f1 + 4.0 * f3 - f4;
    res *= t;
    res += f3 - f0;
    res *= 0.5 * t;
    res += f1;
    Ok(res)
}

/// Bicubic interpolation at `(xs[2], ys[2])` from a 4x4 grid.
///
/// `samples[j][i]` is the value at the i-th known x position and the j-th
/// known y position, where the known positions are indices `0, 1, 3, 4` of
/// `xs` and `ys`. Each row is interpolated along x, then the four row results
/// along y.
///
/// # Errors
/// Same preconditions as [`cubic_interpolation`], for both axes.
pub fn bicubic_interpolation(xs: [f32; 5], ys: [f32; 5], samples: &[[f32; 4]; 4]) -> Result<f32> {
    let [x0, x1, x2, x3, x4] = xs;
    let [y0, y1, y2, y3, y4] = ys;

    let mut column = [0.0f32; 4];
    for (out, row) in column.iter_mut().zip(samples) {
        *out = cubic_interpolation(x0, x1, x2, x3, x4, row[0], row[1], row[2], row[3])?;
    }

    cubic_interpolation(y0, y1, y2, y3, y4, column[0], column[1], column[2], column[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints_exact() {
        let cases = [(0.0, 1.0, 3.7, -12.1), (-5.5, 17.25, 0.1, 0.3), (2.0, 2.5, 1e6, 1e-6)];
        for (x0, x2, f0, f2) in cases {
            assert_eq!(lerp(x0, x0, x2, f0, f2).unwrap(), f0);
            assert_eq!(lerp(x0, x2, x2, f0, f2).unwrap(), f2);
        }
    }

    #[test]
    fn test_lerp_midpoint() {
        assert_eq!(lerp(0.0, 0.5, 1.0, 2.0, 4.0).unwrap(), 3.0);
        assert_eq!(lerp(10.0, 13.0, 14.0, 0.0, 8.0).unwrap(), 6.0);
    }

    #[test]
    fn test_lerp_rejects_bad_order() {
        assert!(lerp(1.0, 0.5, 2.0, 0.0, 1.0).is_err());
        assert!(lerp(0.0, 3.0, 2.0, 0.0, 1.0).is_err());
        assert!(lerp(1.0, 1.0, 1.0, 0.0, 1.0).is_err());
        assert!(lerp(0.0, f32::NAN, 1.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_bilerp_uses_each_corner() {
        // f(x, y) = x + 10y is reproduced exactly by bilinear interpolation
        let f = |x: f32, y: f32| x + 10.0 * y;
        let (x0, x2, y0, y2) = (0.0, 4.0, 0.0, 2.0);
        let (f00, f02, f20, f22) = (f(x0, y0), f(x0, y2), f(x2, y0), f(x2, y2));
        let v = bilerp(x0, 1.0, x2, y0, 0.5, y2, f00, f02, f20, f22).unwrap();
        assert!((v - f(1.0, 0.5)).abs() < 1e-5, "got {v}");

        // corners come back as given
        let corner = bilerp(x0, x0, x2, y0, y2, y2, 1.0, 2.0, 3.0, 4.0).unwrap();
        assert_eq!(corner, 2.0);
        let corner = bilerp(x0, x2, x2, y0, y0, y2, 1.0, 2.0, 3.0, 4.0).unwrap();
        assert_eq!(corner, 3.0);
    }

    #[test]
    fn test_cubic_endpoints_exact() {
        let (f0, f1, f3, f4) = (0.3, -1.7, 42.5, 9.9);
        assert_eq!(cubic_interpolation(0.0, 1.0, 1.0, 2.0, 3.0, f0, f1, f3, f4).unwrap(), f1);
        assert_eq!(cubic_interpolation(0.0, 1.0, 2.0, 2.0, 3.0, f0, f1, f3, f4).unwrap(), f3);
        assert_eq!(cubic_interpolation(-3.0, -1.5, -1.5, 0.0, 1.5, f0, f1, f3, f4).unwrap(), f1);
    }

    #[test]
    fn test_cubic_reproduces_linear_data() {
        // cubic convolution is exact for linear functions
        let f = |x: f32| 2.0 * x + 1.0;
        let (f0, f1, f3, f4) = (f(0.0), f(1.0), f(2.0), f(3.0));
        let v = cubic_interpolation(0.0, 1.0, 1.25, 2.0, 3.0, f0, f1, f3, f4).unwrap();
        assert!((v - f(1.25)).abs() < 1e-5, "got {v}");
    }

    #[test]
    fn test_cubic_midpoint_formula() {
        // t = 0.5: (-f0 + 9f1 + 9f3 - f4) / 16
        let v = cubic_interpolation(0.0, 1.0, 1.5, 2.0, 3.0, 16.0, 32.0, 0.0, 16.0).unwrap();
        assert_eq!(v, (-16.0 + 9.0 * 32.0 - 16.0) / 16.0);
    }

    #[test]
    fn test_cubic_rejects_bad_positions() {
        // uneven spacing
        assert!(cubic_interpolation(0.0, 1.0, 1.5, 2.5, 3.5, 0.0, 0.0, 0.0, 0.0).is_err());
        // target outside [x1, x3]
        assert!(cubic_interpolation(0.0, 1.0, 2.5, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0).is_err());
        // zero step
        assert!(cubic_interpolation(1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0).is_err());
        // descending
        assert!(cubic_interpolation(3.0, 2.0, 1.5, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_bicubic_grid_corners() {
        let xs = [0.0, 1.0, 1.0, 2.0, 3.0];
        let ys = [10.0, 20.0, 20.0, 30.0, 40.0];
        let mut samples = [[0.0f32; 4]; 4];
        for (j, row) in samples.iter_mut().enumerate() {
            for (i, v) in row.iter_mut().enumerate() {
                *v = (10 * j + i) as f32;
            }
        }
        // (x1, y1) is samples[1][1]
        assert_eq!(bicubic_interpolation(xs, ys, &samples).unwrap(), 11.0);

        let xs = [0.0, 1.0, 2.0, 2.0, 3.0];
        let ys = [10.0, 20.0, 30.0, 30.0, 40.0];
        // (x3, y3) is samples[2][2]
        assert_eq!(bicubic_interpolation(xs, ys, &samples).unwrap(), 22.0);
    }

    #[test]
    fn test_bicubic_bilinear_data() {
        let f = |x: f32, y: f32| 3.0 * x - y + 0.5;
        let known = [0.0f32, 1.0, 2.0, 3.0];
        let mut samples = [[0.0f32; 4]; 4];
        for (j, row) in samples.iter_mut().enumerate() {
            for (i, v) in row.iter_mut().enumerate() {
                *v = f(known[i], known[j]);
            }
        }
        let xs = [0.0, 1.0, 1.5, 2.0, 3.0];
        let ys = [0.0, 1.0, 1.75, 2.0, 3.0];
        let v = bicubic_interpolation(xs, ys, &samples).unwrap();
        assert!((v - f(1.5, 1.75)).abs() < 1e-4, "got {v}");

        let uneven = [0.0, 1.0, 1.5, 2.0, 4.0];
        assert!(bicubic_interpolation(uneven, ys, &samples).is_err());
    }
}
