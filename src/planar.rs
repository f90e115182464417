//! Floating-point planar image container.
//!
//! A [`PlanarImage`] stores three independent intensity planes (R, G, B of
//! the source image), each an `Array2<f32>` of shape `(height, width)` in
//! row-major order. Samples use a 16-bit-equivalent scale, nominally
//! `[0, 65536)`, so chained operations do not lose precision. Values may leave
//! that range between operations; only [`PlanarImage::to_encodable`] clamps.
//!
//! Keeping planes separate (rather than interleaving) keeps the per-plane
//! filters cache friendly and lets planes be processed in parallel.

use std::ops::Deref;

use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, ArrayViewMut2};

use crate::error::{Error, Result};

/// Number of intensity planes.
pub const PLANES: usize = 3;

/// Converting from `[0, 65536)` to `[0, 256)`.
const SCALE: f64 = 256.0;

/// Widening factor from 8-bit to 16-bit samples (`v | v << 8`).
const WIDEN_U8: f32 = 257.0;

const OPAQUE: u8 = 255;

/// Three same-sized float planes, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarImage {
    width: usize,
    height: usize,
    pub(crate) planes: [Array2<f32>; PLANES],
}

impl PlanarImage {
    /// Create a zero-filled image.
    ///
    /// # Errors
    /// Returns [`Error::DimensionOverflow`] if `width * height` cannot be
    /// allocated as a single plane.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let area = width
            .checked_mul(height)
            .ok_or(Error::DimensionOverflow { width, height })?;
        if area > isize::MAX as usize / std::mem::size_of::<f32>() {
            return Err(Error::DimensionOverflow { width, height });
        }

        Ok(Self {
            width,
            height,
            planes: [
                Array2::zeros((height, width)),
                Array2::zeros((height, width)),
                Array2::zeros((height, width)),
            ],
        })
    }

    /// Sample a decoded image into three planes.
    ///
    /// Red, green and blue are read directly at 16-bit precision; no gamma
    /// correction or alpha compositing is applied and alpha is ignored.
    pub fn from_decoded(img: &DynamicImage) -> Result<Self> {
        Self::from_rgba16(&img.to_rgba16())
    }

    /// Sample a 16-bit RGBA buffer into three planes (alpha ignored).
    pub fn from_rgba16<C>(buffer: &ImageBuffer<Rgba<u16>, C>) -> Result<Self>
    where
        C: Deref<Target = [u16]>,
    {
        let (width, height) = buffer.dimensions();
        let mut result = Self::new(width as usize, height as usize)?;

        for (x, y, pixel) in buffer.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            let [r, g, b, _] = pixel.0;
            result.planes[0][[y, x]] = f32::from(r);
            result.planes[1][[y, x]] = f32::from(g);
            result.planes[2][[y, x]] = f32::from(b);
        }

        Ok(result)
    }

    /// Sample an interleaved `(height, width, channels)` u8 array.
    ///
    /// Channels 0..3 are taken as R, G, B and widened to 16-bit; any further
    /// channel (alpha) is ignored.
    pub fn from_interleaved_u8(input: ArrayView3<u8>) -> Result<Self> {
        let (height, width, channels) = input.dim();
        if channels < PLANES {
            return Err(Error::invalid(
                "channels",
                format!("need at least {PLANES} channels, got {channels}"),
            ));
        }

        let mut result = Self::new(width, height)?;
        for (c, plane) in result.planes.iter_mut().enumerate() {
            for ((y, x), v) in plane.indexed_iter_mut() {
                *v = f32::from(input[[y, x, c]]) * WIDEN_U8;
            }
        }

        Ok(result)
    }

    /// Convert to an 8-bit RGBA image for an external encoder.
    ///
    /// Each sample is divided by 256, clamped to `[0, 255]` and truncated.
    /// Alpha is fully opaque.
    ///
    /// # Errors
    /// Returns [`Error::DimensionOverflow`] if a dimension exceeds `u32`.
    pub fn to_encodable(&self) -> Result<RgbaImage> {
        let overflow = Error::DimensionOverflow {
            width: self.width,
            height: self.height,
        };
        let width = u32::try_from(self.width).map_err(|_| overflow.clone())?;
        let height = u32::try_from(self.height).map_err(|_| overflow)?;

        Ok(ImageBuffer::from_fn(width, height, |x, y| {
            let idx = [y as usize, x as usize];
            Rgba([
                quantize(self.planes[0][idx]),
                quantize(self.planes[1][idx]),
                quantize(self.planes[2][idx]),
                OPAQUE,
            ])
        }))
    }

    /// Convert to an interleaved `(height, width, 4)` RGBA u8 array.
    pub fn to_interleaved_u8(&self) -> Array3<u8> {
        let mut output = Array3::<u8>::zeros((self.height, self.width, 4));
        for y in 0..self.height {
            for x in 0..self.width {
                for c in 0..PLANES {
                    output[[y, x, c]] = quantize(self.planes[c][[y, x]]);
                }
                output[[y, x, 3]] = OPAQUE;
            }
        }
        output
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `other` has the same width and height.
    pub fn same_size(&self, other: &PlanarImage) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// All three planes.
    pub fn planes(&self) -> &[Array2<f32>; PLANES] {
        &self.planes
    }

    /// View of plane `c`, or `None` if `c >= PLANES`.
    pub fn plane(&self, c: usize) -> Option<ArrayView2<'_, f32>> {
        self.planes.get(c).map(|p| p.view())
    }

    /// Mutable view of plane `c`, or `None` if `c >= PLANES`.
    pub fn plane_mut(&mut self, c: usize) -> Option<ArrayViewMut2<'_, f32>> {
        self.planes.get_mut(c).map(|p| p.view_mut())
    }

    /// Sample of plane `c` at `(x, y)`.
    pub fn get(&self, c: usize, x: usize, y: usize) -> Option<f32> {
        self.planes.get(c)?.get([y, x]).copied()
    }

    /// Set the sample of plane `c` at `(x, y)`. Returns `false` when out of bounds.
    pub fn set(&mut self, c: usize, x: usize, y: usize, value: f32) -> bool {
        match self.planes.get_mut(c).and_then(|p| p.get_mut([y, x])) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }
}

/// Map a 16-bit-scale sample to 8 bits: divide, clamp, truncate.
#[inline]
fn quantize(v: f32) -> u8 {
    (f64::from(v) / SCALE).clamp(0.0, 255.0) as u8
}
