//! Elementwise combination of same-sized planar images.
//!
//! A [`PixelFn`] receives, for one plane and one pixel index, the ordered
//! values `[image, other_1, ..., other_n]` and returns the new value for
//! `image`. Arity and image sizes are checked once per call, before any pixel
//! is written.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::planar::PlanarImage;

/// Per-pixel function with a declared number of inputs.
#[derive(Debug, Clone, Copy)]
pub struct PixelFn<F> {
    arity: usize,
    func: F,
}

impl<F> PixelFn<F>
where
    F: Fn(&[f32]) -> f32 + Sync,
{
    /// Wrap `func`, which will always be called with exactly `arity` values.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if `arity` is zero.
    pub fn new(arity: usize, func: F) -> Result<Self> {
        if arity == 0 {
            return Err(Error::invalid("arity", "a pixel function needs at least one input"));
        }
        Ok(Self { arity, func })
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    #[inline]
    pub fn call(&self, values: &[f32]) -> f32 {
        (self.func)(values)
    }
}

fn check_inputs<F>(func: &PixelFn<F>, image: &PlanarImage, others: &[&PlanarImage]) -> Result<()>
where
    F: Fn(&[f32]) -> f32 + Sync,
{
    let actual = others.len() + 1;
    if func.arity() != actual {
        return Err(Error::ArityMismatch {
            expected: func.arity(),
            actual,
        });
    }

    if let Some(other) = others.iter().find(|o| !image.same_size(o)) {
        return Err(Error::SizeMismatch {
            expected_width: image.width(),
            expected_height: image.height(),
            width: other.width(),
            height: other.height(),
        });
    }

    Ok(())
}

/// Overwrite every sample of `image` with `func([image, others...])`.
///
/// # Errors
/// - [`Error::ArityMismatch`] if `func` does not take `1 + others.len()` values.
/// - [`Error::SizeMismatch`] if any other image differs in width or height.
pub fn apply<F>(func: &PixelFn<F>, image: &mut PlanarImage, others: &[&PlanarImage]) -> Result<()>
where
    F: Fn(&[f32]) -> f32 + Sync,
{
    check_inputs(func, image, others)?;

    image
        .planes
        .par_iter_mut()
        .enumerate()
        .for_each(|(c, plane)| {
            let mut values = Vec::with_capacity(func.arity());
            for (idx, v) in plane.indexed_iter_mut() {
                values.clear();
                values.push(*v);
                values.extend(others.iter().map(|o| o.planes[c][idx]));
                *v = func.call(&values);
            }
        });

    Ok(())
}

/// Like [`apply`], but leaves the inputs untouched.
///
/// The first image is cloned and the remaining images are passed as others.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] for an empty image list, otherwise the
/// errors of [`apply`].
pub fn apply_new<F>(func: &PixelFn<F>, images: &[&PlanarImage]) -> Result<PlanarImage>
where
    F: Fn(&[f32]) -> f32 + Sync,
{
    let (first, others) = images
        .split_first()
        .ok_or_else(|| Error::invalid("images", "at least one image is required"))?;

    let mut result = (*first).clone();
    apply(func, &mut result, others)?;
    Ok(result)
}
