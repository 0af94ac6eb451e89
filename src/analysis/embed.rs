//! Embedder: feature table -> 2D points

use super::EmbeddingParams;
use crate::error::AnalysisResult;
use crate::table::FeatureTable;
use graphscape_algorithms::{stack_rows, tsne};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Embedded position of one graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedPoint {
    pub graph_id: String,
    pub x: f64,
    pub y: f64,
}

/// Project every row of `table` to 2D.
///
/// The result has one point per row, in row order. The layout is fully
/// determined by the input and `params.seed`; different seeds give layouts
/// that differ in position and orientation but keep the same neighborhoods.
pub fn embed(table: &FeatureTable, params: &EmbeddingParams) -> AnalysisResult<Vec<EmbeddedPoint>> {
    let features: Vec<&[f64]> = table.rows().iter().map(|r| r.features.as_slice()).collect();
    let matrix = stack_rows(&features)?;

    info!(
        "Embedding {} rows x {} features (perplexity {}, learning rate {}, {} iterations, seed {})",
        matrix.nrows(),
        matrix.ncols(),
        params.perplexity,
        params.learning_rate,
        params.n_iter,
        params.seed
    );
    let result = tsne(matrix.view(), params)?;
    info!(
        "Embedding finished: KL divergence {:.4}, effective perplexity {:.2}",
        result.kl_divergence, result.effective_perplexity
    );

    Ok(table
        .rows()
        .iter()
        .zip(result.embedding.outer_iter())
        .map(|(row, pos)| EmbeddedPoint {
            graph_id: row.graph_id.clone(),
            x: pos[0],
            y: pos[1],
        })
        .collect())
}

/// Dense `n x 2` view of embedded points
pub(crate) fn points_matrix(points: &[EmbeddedPoint]) -> Array2<f64> {
    Array2::from_shape_fn((points.len(), 2), |(i, d)| {
        if d == 0 {
            points[i].x
        } else {
            points[i].y
        }
    })
}
