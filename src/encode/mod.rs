//! Visual encoding
//!
//! Joins embedding coordinates, category labels and cluster assignments into
//! one record per graph and assigns its visual channels: color encodes the
//! category, marker shape encodes the cluster. Mappings are strict; a category
//! or cluster without an entry fails the whole encode.

pub mod palette;

pub use palette::{ColorMap, Marker, MarkerMap, CATEGORY20};

use crate::analysis::{ClusterAssignment, EmbeddedPoint};
use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

/// Renderable view of one graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualRecord {
    pub graph_id: String,
    pub category: String,
    pub cluster_label: usize,
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub marker: Marker,
}

/// Build one `VisualRecord` per row, in row order.
///
/// All three row-aligned inputs must have the same length and agree on
/// graph identity. Every category needs a color and every cluster label a
/// marker; nothing is returned unless all rows can be encoded.
pub fn encode<S: AsRef<str>>(
    points: &[EmbeddedPoint],
    categories: &[S],
    assignments: &[ClusterAssignment],
    color_map: &ColorMap,
    marker_map: &MarkerMap,
) -> AnalysisResult<Vec<VisualRecord>> {
    if points.len() != categories.len() || points.len() != assignments.len() {
        return Err(AnalysisError::Alignment(format!(
            "{} points, {} categories, {} assignments",
            points.len(),
            categories.len(),
            assignments.len()
        )));
    }

    points
        .iter()
        .zip(categories)
        .zip(assignments)
        .enumerate()
        .map(|(row, ((point, category), assignment))| {
            if point.graph_id != assignment.graph_id {
                return Err(AnalysisError::Alignment(format!(
                    "row {}: point '{}' vs assignment '{}'",
                    row, point.graph_id, assignment.graph_id
                )));
            }
            let category = category.as_ref();
            let color = color_map
                .get(category)
                .ok_or_else(|| AnalysisError::UnmappedCategory(category.to_string()))?;
            let marker = marker_map
                .get(assignment.cluster_label)
                .ok_or(AnalysisError::UnmappedCluster(assignment.cluster_label))?;

            Ok(VisualRecord {
                graph_id: point.graph_id.clone(),
                category: category.to_string(),
                cluster_label: assignment.cluster_label,
                x: point.x,
                y: point.y,
                color: color.to_string(),
                marker,
            })
        })
        .collect()
}
