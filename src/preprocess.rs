use ndarray::{Array4, Axis};
use serde::{Deserialize, Serialize};

use crate::batch::IMG_CHANNELS;
use crate::Pixel;

/// Per-channel mean of the CIFAR-10 training set, computed offline.
pub const CIFAR10_MEAN: [f32; 3] = [125.3, 123.0, 113.9];
/// Per-channel standard deviation of the CIFAR-10 training set.
pub const CIFAR10_STD: [f32; 3] = [63.0, 62.1, 66.7];

/// Named per-channel normalization statistics.
///
/// Other datasets, or freshly measured splits, can supply their own numbers
/// in place of the stock CIFAR-10 constants.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl ChannelStats {
    /// The stock CIFAR-10 training-set statistics.
    pub fn cifar10() -> ChannelStats {
        ChannelStats {
            mean: CIFAR10_MEAN,
            std: CIFAR10_STD,
        }
    }

    /// Measures mean and population standard deviation per channel.
    ///
    /// This is how the stock constants were produced from the 50,000
    /// training images. Panics on an empty tensor.
    pub fn measure<F: Pixel>(images: &Array4<F>) -> ChannelStats {
        assert_eq!(
            images.len_of(Axis(3)),
            IMG_CHANNELS,
            "expected a channel-last (n, h, w, 3) tensor"
        );
        assert!(
            !images.is_empty(),
            "cannot measure statistics of an empty tensor"
        );

        let mut stats = ChannelStats {
            mean: [0.0; 3],
            std: [0.0; 3],
        };
        for channel in 0..IMG_CHANNELS {
            let plane = images.index_axis(Axis(3), channel);
            let n = plane.len() as f64;
            let mut sum = 0.0;
            let mut sum_sq = 0.0;
            for &v in plane.iter() {
                let v: f64 = v.into();
                sum += v;
                sum_sq += v * v;
            }
            let mean = sum / n;
            stats.mean[channel] = mean as f32;
            stats.std[channel] = (sum_sq / n - mean * mean).max(0.0).sqrt() as f32;
        }
        stats
    }

    /// Normalizes `images` in place: per channel, subtract the mean and
    /// divide by the standard deviation, broadcast over the last axis.
    pub fn normalize<F: Pixel>(&self, images: &mut Array4<F>) {
        assert_eq!(
            images.len_of(Axis(3)),
            IMG_CHANNELS,
            "expected a channel-last (n, h, w, 3) tensor"
        );
        for channel in 0..IMG_CHANNELS {
            let mean: F = self.mean[channel].into();
            let std: F = self.std[channel].into();
            images
                .index_axis_mut(Axis(3), channel)
                .mapv_inplace(|v| (v - mean) / std);
        }
    }

    /// Copying variant of [`normalize`](Self::normalize); the input tensor
    /// is left untouched.
    pub fn normalized<F: Pixel>(&self, images: &Array4<F>) -> Array4<F> {
        let mut out = images.clone();
        self.normalize(&mut out);
        out
    }
}

/// Normalizes an image tensor in place with the stock CIFAR-10 statistics.
///
/// Mutates its argument: applying this twice re-normalizes already
/// normalized data, so keep track of which tensors have been preprocessed.
pub fn preprocess<F: Pixel>(images: &mut Array4<F>) {
    ChannelStats::cifar10().normalize(images);
}
