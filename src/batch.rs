use std::fs;
use std::path::Path;

use log::debug;
use ndarray::Array2;

use crate::error::CifarError;
use crate::Pixel;

pub const IMG_HEIGHT: usize = 32;
pub const IMG_WIDTH: usize = 32;
pub const IMG_CHANNELS: usize = 3;
/// Pixel bytes per record: 3 channel planes of 32x32, channel-first.
pub const IMG_BYTES: usize = IMG_CHANNELS * IMG_HEIGHT * IMG_WIDTH;
/// One serialized record: a label byte followed by the pixel bytes.
pub const RECORD_BYTES: usize = 1 + IMG_BYTES;

/// One deserialized batch file.
#[derive(Debug)]
pub struct RawBatch<F> {
    /// Flat pixel rows, shape `(n, 3072)`, channel-first within each row.
    pub data: Array2<F>,
    /// Integer class labels, one per row of `data`.
    pub labels: Vec<u8>,
}

impl<F> RawBatch<F> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Reads one binary CIFAR-10 batch file.
///
/// The file must be a whole number of 3073-byte records; the sample count is
/// derived from the file length. Pixel bytes are cast to `F` on the way in.
pub fn read_batch<F: Pixel>(path: &Path) -> Result<RawBatch<F>, CifarError> {
    let bytes = fs::read(path).map_err(|source| CifarError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.len() % RECORD_BYTES != 0 {
        return Err(CifarError::MalformedBatch {
            path: path.to_path_buf(),
            len: bytes.len(),
        });
    }

    let n = bytes.len() / RECORD_BYTES;
    let mut labels = Vec::with_capacity(n);
    let mut pixels: Vec<F> = Vec::with_capacity(n * IMG_BYTES);
    for record in bytes.chunks_exact(RECORD_BYTES) {
        labels.push(record[0]);
        pixels.extend(record[1..].iter().map(|&b| -> F { b.into() }));
    }
    let data = Array2::from_shape_vec((n, IMG_BYTES), pixels)?;

    debug!("read {} samples from {}", n, path.display());
    Ok(RawBatch { data, labels })
}

/// Builds batch-file bytes from `(label, pixels)` samples (useful for tests).
///
/// Each pixel vector must be exactly [`IMG_BYTES`] long.
pub fn build_batch_bytes(samples: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(samples.len() * RECORD_BYTES);
    for (label, pixels) in samples {
        assert_eq!(
            pixels.len(),
            IMG_BYTES,
            "an image must hold {IMG_BYTES} pixel bytes"
        );
        buf.push(*label);
        buf.extend_from_slice(pixels);
    }
    buf
}
