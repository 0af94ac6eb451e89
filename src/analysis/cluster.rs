//! Clusterer: embedded points -> cluster labels and centroids

use super::embed::{points_matrix, EmbeddedPoint};
use super::ClusterParams;
use crate::error::AnalysisResult;
use graphscape_algorithms::kmeans;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Cluster label of one graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub graph_id: String,
    pub cluster_label: usize,
}

/// Mean position of a cluster's members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub cluster_label: usize,
    pub x: f64,
    pub y: f64,
    /// Number of member points (0 for an empty cluster)
    pub size: usize,
}

/// Output of one clustering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clustering {
    /// One assignment per input point, in input order
    pub assignments: Vec<ClusterAssignment>,
    /// One centroid per cluster, indexed by label
    pub centroids: Vec<Centroid>,
    pub inertia: f64,
    pub iterations: usize,
    pub converged: bool,
    /// Labels in `[0, k)` that received no points
    pub empty_clusters: Vec<usize>,
}

impl Clustering {
    /// Configured number of clusters
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Label per row, in row order
    pub fn labels(&self) -> Vec<usize> {
        self.assignments.iter().map(|a| a.cluster_label).collect()
    }

    /// Member count per cluster
    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.centroids.iter().map(|c| c.size).collect()
    }
}

/// Partition `points` into `params.k` clusters.
///
/// Fails with `InvalidClusterCount` unless `1 <= k <= points.len()`.
pub fn cluster(points: &[EmbeddedPoint], params: &ClusterParams) -> AnalysisResult<Clustering> {
    params.validate(points.len())?;

    let data = points_matrix(points);
    let result = kmeans(data.view(), params)?;

    let empty_clusters = result.empty_clusters();
    if !empty_clusters.is_empty() {
        warn!("Clusters with no members: {:?}", empty_clusters);
    }
    if !result.converged {
        warn!(
            "k-means did not converge within {} iterations, using best-effort result",
            params.max_iterations
        );
    }
    info!(
        "Clustered {} points into {} clusters: inertia {:.4}, sizes {:?}",
        points.len(),
        params.k,
        result.inertia,
        result.cluster_sizes
    );

    let assignments = points
        .iter()
        .zip(&result.labels)
        .map(|(point, &label)| ClusterAssignment {
            graph_id: point.graph_id.clone(),
            cluster_label: label,
        })
        .collect();

    let centroids = result
        .centroids
        .outer_iter()
        .enumerate()
        .map(|(label, pos)| Centroid {
            cluster_label: label,
            x: pos[0],
            y: pos[1],
            size: result.cluster_sizes[label],
        })
        .collect();

    Ok(Clustering {
        assignments,
        centroids,
        inertia: result.inertia,
        iterations: result.iterations,
        converged: result.converged,
        empty_clusters,
    })
}
