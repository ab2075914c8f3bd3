use std::fs;
use std::path::Path;

use log::info;
use ndarray::{s, Array1, Array2, Array4, Axis};
use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::batch::{read_batch, RawBatch, IMG_BYTES, IMG_CHANNELS, IMG_HEIGHT, IMG_WIDTH};
use crate::error::CifarError;
use crate::labels::one_hotify;
use crate::Pixel;

/// Number of training batch files in a CIFAR-10 directory.
pub const TRAIN_BATCHES: usize = 5;

/// Labels of one split: integer classes or one-hot rows.
#[derive(Debug, Clone)]
pub enum Labels<F> {
    Integer(Array1<u8>),
    /// `(n, num_classes)`, exactly one `1` per row.
    OneHot(Array2<F>),
}

impl<F> Labels<F> {
    pub fn len(&self) -> usize {
        match self {
            Labels::Integer(labels) => labels.len(),
            Labels::OneHot(matrix) => matrix.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One of the train/valid/test splits returned by [`load`].
#[derive(Debug, Clone)]
pub struct DatasetSplit<F> {
    /// Image tensor, shape `(n, 32, 32, 3)`, channel-last.
    pub data: Array4<F>,
    pub labels: Labels<F>,
}

impl<F> DatasetSplit<F> {
    pub fn len(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loads the CIFAR-10 batch files found in `data_dir`.
///
/// Reads `data_batch_1` .. `data_batch_5`, optionally shuffles the combined
/// samples, and holds out the last `valid_ratio` fraction as the validation
/// set. The test batch is read independently and is never shuffled or split.
/// Returns `(train_set, valid_set, test_set)`.
///
/// Panics when `valid_ratio` is outside `[0, 1)` or when `data_dir` does not
/// hold exactly five `data_batch_*` files. I/O and deserialization failures
/// come back as [`CifarError`]; any failure aborts the whole load.
pub fn load<F: Pixel>(
    data_dir: impl AsRef<Path>,
    valid_ratio: f32,
    one_hot: bool,
    shuffle: bool,
) -> Result<(DatasetSplit<F>, DatasetSplit<F>, DatasetSplit<F>), CifarError> {
    assert!(
        (0.0..1.0).contains(&valid_ratio),
        "valid_ratio must be in [0, 1), got {valid_ratio}"
    );

    let dir = data_dir.as_ref();
    let found = count_train_batches(dir);
    assert_eq!(
        found, TRAIN_BATCHES,
        "expected {TRAIN_BATCHES} data_batch_* files in {}, found {found}",
        dir.display()
    );

    // The count check above is prefix-based while the reads below address
    // explicit indices, so five differently-suffixed batch files pass the
    // count and then fail here with a not-found error.
    let mut batches = Vec::with_capacity(TRAIN_BATCHES);
    for i in 1..=TRAIN_BATCHES {
        batches.push(read_batch::<F>(&dir.join(format!("data_batch_{i}")))?);
    }

    // Single allocation, one index-range write per batch.
    let total: usize = batches.iter().map(RawBatch::len).sum();
    let mut data = Array2::<F>::zeros((total, IMG_BYTES));
    let mut labels = Vec::with_capacity(total);
    let mut offset = 0;
    for batch in &batches {
        let n = batch.len();
        data.slice_mut(s![offset..offset + n, ..]).assign(&batch.data);
        labels.extend_from_slice(&batch.labels);
        offset += n;
    }

    if shuffle {
        let mut order: Vec<usize> = (0..total).collect();
        order.shuffle(&mut thread_rng());
        data = data.select(Axis(0), &order);
        labels = order.iter().map(|&i| labels[i]).collect();
    }

    // The one-hot width is inferred once over the whole training set so an
    // empty validation split still gets a well-formed (0, k) matrix.
    let num_classes = if one_hot {
        labels.iter().max().map(|&max| usize::from(max) + 1)
    } else {
        None
    };

    let split_at = ((1.0 - f64::from(valid_ratio)) * total as f64) as usize;
    let (train_rows, valid_rows) = data.view().split_at(Axis(0), split_at);
    let train_set = DatasetSplit {
        data: into_images(train_rows.to_owned())?,
        labels: encode_labels(&labels[..split_at], one_hot, num_classes),
    };
    let valid_set = DatasetSplit {
        data: into_images(valid_rows.to_owned())?,
        labels: encode_labels(&labels[split_at..], one_hot, num_classes),
    };

    let test_batch = read_batch::<F>(&dir.join("test_batch"))?;
    let test_labels = encode_labels(&test_batch.labels, one_hot, None);
    let test_set = DatasetSplit {
        data: into_images(test_batch.data)?,
        labels: test_labels,
    };

    info!(
        "loaded CIFAR-10 from {}: {} train / {} valid / {} test samples",
        dir.display(),
        train_set.len(),
        valid_set.len(),
        test_set.len()
    );
    Ok((train_set, valid_set, test_set))
}

/// Counts `data_batch_*`-prefixed entries. An unreadable or missing
/// directory counts zero, like an empty glob.
fn count_train_batches(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("data_batch_")
        })
        .count()
}

/// Reinterprets flat `(n, 3072)` rows as channel-first `(n, 3, 32, 32)`
/// images and transposes them to channel-last `(n, 32, 32, 3)`.
fn into_images<F: Pixel>(rows: Array2<F>) -> Result<Array4<F>, CifarError> {
    let n = rows.nrows();
    let images = rows
        .into_shape_with_order((n, IMG_CHANNELS, IMG_HEIGHT, IMG_WIDTH))?
        .permuted_axes([0, 2, 3, 1]);
    Ok(images.as_standard_layout().to_owned())
}

fn encode_labels<F: Pixel>(labels: &[u8], one_hot: bool, num_classes: Option<usize>) -> Labels<F> {
    if one_hot {
        Labels::OneHot(one_hotify(labels, num_classes))
    } else {
        Labels::Integer(Array1::from_vec(labels.to_vec()))
    }
}
