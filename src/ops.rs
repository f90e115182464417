//! Composable image operations.
//!
//! Every filter is wrapped as a value implementing [`Operation`], so callers
//! can build a [`Pipeline`] once and run it over many images.
//!
//! ```ignore
//! use planar_imgproc::ops::{Pipeline, Scale, Unsharp};
//!
//! let pipeline = Pipeline::new()
//!     .then(Scale(Default::default()))
//!     .then(Unsharp(Default::default()));
//! let sharpened = pipeline.apply(&image)?;
//! ```

use std::fmt::Debug;

use crate::error::Result;
use crate::filters::convolve::{convolve, EdgePolicy};
use crate::filters::kernel::ConvKernel;
use crate::filters::resample::{scale, ScaleParams};
use crate::filters::sharpen::{sharpen_laplace_in_place, unsharp_in_place, UnsharpParams};
use crate::planar::PlanarImage;

/// An image-to-image transformation.
pub trait Operation: Send + Sync + Debug {
    /// Short name, used in logs.
    fn name(&self) -> &'static str;

    /// Transform `image`, replacing its contents.
    fn apply_in_place(&self, image: &mut PlanarImage) -> Result<()>;

    /// Transform a copy of `image`.
    fn apply(&self, image: &PlanarImage) -> Result<PlanarImage> {
        let mut result = image.clone();
        self.apply_in_place(&mut result)?;
        Ok(result)
    }
}

/// Leaves the image unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Operation for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn apply_in_place(&self, _image: &mut PlanarImage) -> Result<()> {
        Ok(())
    }
}

/// Convolution with a fixed kernel and edge policy.
#[derive(Debug, Clone)]
pub struct Convolve {
    pub kernel: ConvKernel,
    pub edge: EdgePolicy,
}

impl Operation for Convolve {
    fn name(&self) -> &'static str {
        "convolve"
    }

    fn apply_in_place(&self, image: &mut PlanarImage) -> Result<()> {
        *image = self.apply(image)?;
        Ok(())
    }

    fn apply(&self, image: &PlanarImage) -> Result<PlanarImage> {
        convolve(image, &self.kernel, &self.edge)
    }
}

/// Unsharp mask.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsharp(pub UnsharpParams);

impl Operation for Unsharp {
    fn name(&self) -> &'static str {
        "unsharp"
    }

    fn apply_in_place(&self, image: &mut PlanarImage) -> Result<()> {
        unsharp_in_place(image, &self.0)
    }
}

/// Laplacian sharpen.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharpenLaplace;

impl Operation for SharpenLaplace {
    fn name(&self) -> &'static str {
        "sharpen_laplace"
    }

    fn apply_in_place(&self, image: &mut PlanarImage) -> Result<()> {
        sharpen_laplace_in_place(image)
    }
}

/// Resize by constant factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scale(pub ScaleParams);

impl Operation for Scale {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn apply_in_place(&self, image: &mut PlanarImage) -> Result<()> {
        *image = scale(image, &self.0)?;
        Ok(())
    }

    fn apply(&self, image: &PlanarImage) -> Result<PlanarImage> {
        scale(image, &self.0)
    }
}

/// Operations applied one after another.
///
/// `Pipeline::new().then(f).then(g)` runs `f` first. An empty pipeline leaves
/// the image unchanged. The first failing step stops the pipeline and its
/// error is returned.
#[derive(Debug, Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Operation>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `op` as the last step.
    pub fn then<O: Operation + 'static>(mut self, op: O) -> Self {
        self.push(Box::new(op));
        self
    }

    pub fn push(&mut self, op: Box<dyn Operation>) {
        self.steps.push(op);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|op| op.name()).collect()
    }
}

impl Operation for Pipeline {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn apply_in_place(&self, image: &mut PlanarImage) -> Result<()> {
        for (index, op) in self.steps.iter().enumerate() {
            tracing::debug!(
                step = index,
                op = op.name(),
                width = image.width(),
                height = image.height(),
                "pipeline step"
            );
            op.apply_in_place(image)?;
        }
        Ok(())
    }
}
