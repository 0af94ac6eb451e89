//! Feature scaling applied before embedding

use ndarray::{Array2, ArrayView2, Axis};

/// Rescale every column to [0, 1].
///
/// Constant columns carry no information for the embedding and map to 0.
pub fn min_max_scale(data: ArrayView2<f64>) -> Array2<f64> {
    let mut scaled = data.to_owned();
    for mut column in scaled.axis_iter_mut(Axis(1)) {
        let min = column.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        if range > 0.0 {
            column.mapv_inplace(|v| (v - min) / range);
        } else {
            column.fill(0.0);
        }
    }
    scaled
}
