pub mod batch;
pub mod cifar_dataset;
pub mod error;
pub mod labels;
pub mod preprocess;

use ndarray::NdFloat;

/// Element type for decoded image tensors (`f32` or `f64`).
///
/// Plays the role of a `dtype` argument: the caller picks the float type at
/// the call site, e.g. `load::<f32>(..)`.
pub trait Pixel: NdFloat + From<u8> + From<f32> + Into<f64> {}

impl<T: NdFloat + From<u8> + From<f32> + Into<f64>> Pixel for T {}
