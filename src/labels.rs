use ndarray::Array2;

use crate::Pixel;

/// Converts integer class labels to one-hot vectors.
///
/// Each row of the returned `(len, num_classes)` matrix is zero except for a
/// single `1` at the column indexed by that row's label. With
/// `num_classes: None` the class count is inferred as `max(labels) + 1`,
/// which needs at least one label.
///
/// Panics when a label falls outside `[0, num_classes)` or when the class
/// count has to be inferred from an empty slice.
pub fn one_hotify<F: Pixel>(labels: &[u8], num_classes: Option<usize>) -> Array2<F> {
    let num_classes = num_classes.unwrap_or_else(|| {
        let max = labels
            .iter()
            .max()
            .expect("cannot infer the class count from an empty label sequence");
        usize::from(*max) + 1
    });

    let mut one_hot = Array2::zeros((labels.len(), num_classes));
    for (row, &label) in labels.iter().enumerate() {
        let label = usize::from(label);
        assert!(
            label < num_classes,
            "label {label} out of range for {num_classes} classes"
        );
        one_hot[[row, label]] = F::one();
    }
    one_hot
}
