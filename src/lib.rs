//! Planar float image processing.
//!
//! Images are held as three independent `f32` planes on a 16-bit scale, so
//! chained filters keep full precision until the final 8-bit conversion.
//!
//! ## Image Format
//! - **Input**: any decoded `image::DynamicImage`, a 16-bit RGBA buffer, or an
//!   interleaved `(height, width, channels)` u8 array with at least 3 channels
//! - **Processing**: [`PlanarImage`], three `(height, width)` planes
//! - **Output**: 8-bit RGBA, alpha always 255
//!
//! ## Modules
//! - [`filters`]: kernels, convolution, elementwise combination, sharpening,
//!   scaling
//! - [`interpolate`]: scalar interpolation primitives
//! - [`ops`]: filters as composable [`Operation`]s and [`Pipeline`]s
//!
//! ## Example
//! ```ignore
//! use planar_imgproc::{filters::sharpen::UnsharpParams, ops::Unsharp, Operation, PlanarImage};
//!
//! let img = PlanarImage::from_decoded(&image::open("in.png")?)?;
//! let out = Unsharp(UnsharpParams::default()).apply(&img)?;
//! out.to_encodable()?.save("out.png")?;
//! ```

pub mod error;
pub mod filters;
pub mod interpolate;
pub mod ops;
pub mod planar;

pub use error::{Error, Result};
pub use ops::{Operation, Pipeline};
pub use planar::PlanarImage;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::Error;
    use crate::filters::convolve::{convolve, EdgePolicy};
    use crate::filters::kernel::{gaussian_filter, mean_filter};
    use crate::filters::resample::{self, Interpolation, ScaleParams};
    use crate::filters::sharpen::{self as sharpen_mod, UnsharpParams};
    use crate::planar::PlanarImage;

    impl From<Error> for PyErr {
        fn from(err: Error) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    fn edge_policy(wrap: bool) -> EdgePolicy {
        if wrap {
            EdgePolicy::Wrap
        } else {
            EdgePolicy::Clamp
        }
    }

    /// Convert the input, run `f`, and convert back to an RGBA u8 array.
    fn run<'py, F>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        f: F,
    ) -> PyResult<Bound<'py, PyArray3<u8>>>
    where
        F: FnOnce(&PlanarImage) -> crate::Result<PlanarImage>,
    {
        let planar = PlanarImage::from_interleaved_u8(image.as_array())?;
        let result = f(&planar)?;
        Ok(result.to_interleaved_u8().into_pyarray(py))
    }

    // ========================================================================
    // Sharpening
    // ========================================================================

    /// Unsharp mask on an RGB(A) u8 image.
    ///
    /// # Arguments
    /// * `image` - Input image (height, width, 3 or 4)
    /// * `radius` - Gaussian kernel radius
    /// * `amount` - Gaussian variance
    /// * `threshold` - Minimum difference to sharpen, on the 16-bit scale
    ///
    /// Returns an RGBA u8 image with opaque alpha.
    #[pyfunction]
    #[pyo3(signature = (image, radius=2, amount=1.0, threshold=0.0))]
    pub fn unsharp_mask<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        radius: usize,
        amount: f64,
        threshold: f64,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let params = UnsharpParams {
            radius,
            amount,
            threshold,
        };
        run(py, image, |img| sharpen_mod::unsharp(img, &params))
    }

    /// Laplacian sharpen on an RGB(A) u8 image.
    #[pyfunction]
    pub fn sharpen_laplace<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run(py, image, sharpen_mod::sharpen_laplace)
    }

    // ========================================================================
    // Convolution
    // ========================================================================

    /// Mean filter of the given radius.
    #[pyfunction]
    #[pyo3(signature = (image, radius=1, wrap=false))]
    pub fn convolve_mean<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        radius: usize,
        wrap: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let kernel = mean_filter(radius)?;
        run(py, image, |img| convolve(img, &kernel, &edge_policy(wrap)))
    }

    /// Gaussian blur with the given kernel radius and variance.
    #[pyfunction]
    #[pyo3(signature = (image, radius=2, variance=1.0, wrap=false))]
    pub fn convolve_gaussian<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        radius: usize,
        variance: f64,
        wrap: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let kernel = gaussian_filter(radius, variance)?;
        run(py, image, |img| convolve(img, &kernel, &edge_policy(wrap)))
    }

    // ========================================================================
    // Resampling
    // ========================================================================

    /// Scale by `x_factor` and `y_factor`.
    ///
    /// `method` is `"bicubic"` (default) or `"bilinear"`.
    #[pyfunction]
    #[pyo3(signature = (image, x_factor=2.0, y_factor=2.0, method="bicubic"))]
    pub fn scale<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        x_factor: f64,
        y_factor: f64,
        method: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let method = match method {
            "bicubic" => Interpolation::Bicubic,
            "bilinear" => Interpolation::Bilinear,
            other => {
                return Err(PyValueError::new_err(format!(
                    "unknown interpolation method '{other}', expected 'bicubic' or 'bilinear'"
                )))
            }
        };
        let params = ScaleParams {
            x_factor,
            y_factor,
            method,
        };
        run(py, image, |img| resample::scale(img, &params))
    }

    /// Planar image processing extension module
    #[pymodule]
    pub fn planar_imgproc(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Sharpening
        m.add_function(wrap_pyfunction!(unsharp_mask, m)?)?;
        m.add_function(wrap_pyfunction!(sharpen_laplace, m)?)?;

        // Convolution
        m.add_function(wrap_pyfunction!(convolve_mean, m)?)?;
        m.add_function(wrap_pyfunction!(convolve_gaussian, m)?)?;

        // Resampling
        m.add_function(wrap_pyfunction!(scale, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::planar_imgproc;
