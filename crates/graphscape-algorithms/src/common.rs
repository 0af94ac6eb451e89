//! Shared utilities for the numeric kernels
//!
//! Every algorithm in this crate works on a dense, row-major `Array2<f64>`
//! (one row per observation). These helpers build and validate that view.

use crate::error::{AlgoError, AlgoResult};
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Stack equally sized rows into a dense matrix.
///
/// Fails with `DimensionMismatch` on the first row whose length differs from
/// row 0, and with `NonFinite` on NaN/inf cells.
pub fn stack_rows<R: AsRef<[f64]>>(rows: &[R]) -> AlgoResult<Array2<f64>> {
    let first = rows
        .first()
        .ok_or_else(|| AlgoError::EmptyInput("no rows to stack".to_string()))?;
    let dim = first.as_ref().len();

    let mut flat = Vec::with_capacity(rows.len() * dim);
    for (row_idx, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != dim {
            return Err(AlgoError::DimensionMismatch {
                row: row_idx,
                expected: dim,
                got: row.len(),
            });
        }
        flat.extend_from_slice(row);
    }

    let matrix = Array2::from_shape_vec((rows.len(), dim), flat).map_err(|e| {
        AlgoError::InvalidParameter {
            name: "rows",
            reason: e.to_string(),
        }
    })?;
    ensure_finite(matrix.view())?;
    Ok(matrix)
}

/// Reject matrices containing NaN or infinite values
pub fn ensure_finite(data: ArrayView2<f64>) -> AlgoResult<()> {
    for ((row, column), value) in data.indexed_iter() {
        if !value.is_finite() {
            return Err(AlgoError::NonFinite { row, column });
        }
    }
    Ok(())
}

/// Squared Euclidean distance between two rows
#[inline]
pub fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Index of the closest centroid and the squared distance to it.
///
/// Equidistant centroids resolve to the lowest index.
pub fn nearest_centroid(point: ArrayView1<f64>, centroids: ArrayView2<f64>) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, centroid) in centroids.outer_iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best_dist {
            best_idx = idx;
            best_dist = dist;
        }
    }
    (best_idx, best_dist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_stack_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let m = stack_rows(&rows).unwrap();
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m[[2, 1]], 6.0);
    }

    #[test]
    fn test_stack_rows_dimension_mismatch() {
        let rows = vec![vec![1.0, 2.0], vec![3.0], vec![5.0, 6.0]];
        let err = stack_rows(&rows).unwrap_err();
        assert_eq!(
            err,
            AlgoError::DimensionMismatch {
                row: 1,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_stack_rows_rejects_nan() {
        let rows = vec![vec![1.0, f64::NAN]];
        assert_eq!(
            stack_rows(&rows).unwrap_err(),
            AlgoError::NonFinite { row: 0, column: 1 }
        );
    }

    #[test]
    fn test_stack_rows_empty() {
        let rows: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(stack_rows(&rows), Err(AlgoError::EmptyInput(_))));
    }

    #[test]
    fn test_nearest_centroid_tie_breaks_low() {
        let centroids = array![[1.0, 0.0], [-1.0, 0.0], [0.0, 5.0]];
        let point = array![0.0, 0.0];
        let (idx, dist) = nearest_centroid(point.view(), centroids.view());
        assert_eq!(idx, 0);
        assert!((dist - 1.0).abs() < 1e-12);
    }
}
