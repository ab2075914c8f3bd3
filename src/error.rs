use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while reading CIFAR-10 batch files.
///
/// Precondition violations (a `valid_ratio` outside `[0, 1)`, a directory
/// without exactly five training batches) panic instead of returning a
/// variant here: those are caller bugs, not runtime conditions.
#[derive(Debug, Error)]
pub enum CifarError {
    #[error("failed to read batch file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt batch file {}: {len} bytes is not a whole number of 3073-byte records", path.display())]
    MalformedBatch { path: PathBuf, len: usize },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}
