//! K-Means clustering
//!
//! Lloyd's algorithm with k-means++ seeding. `n_init` independent restarts are
//! run in parallel, each with its own seed derived from `KMeansConfig::seed`,
//! and the restart with the lowest inertia wins (ties go to the earliest
//! restart). Assignment ties between equidistant centroids go to the lowest
//! cluster index.

use crate::common::{ensure_finite, nearest_centroid, squared_distance};
use crate::error::{AlgoError, AlgoResult};
use ndarray::{Array2, ArrayView2, Axis};
use rand::prelude::*;
use rayon::prelude::*;
use tracing::debug;

/// K-Means configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,
    /// Iteration cap for a single Lloyd run
    pub max_iterations: usize,
    /// Number of restarts with different seeds
    pub n_init: usize,
    /// Convergence threshold on centroid movement, relative to the mean feature variance
    pub tolerance: f64,
    /// Base seed for k-means++ seeding
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 8,
            max_iterations: 300,
            n_init: 10,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

impl KMeansConfig {
    /// Same configuration with a different cluster count
    pub fn with_k(&self, k: usize) -> Self {
        Self { k, ..self.clone() }
    }

    /// Check `k` against the number of points and the remaining parameters
    pub fn validate(&self, n_points: usize) -> AlgoResult<()> {
        if self.k == 0 || self.k > n_points {
            return Err(AlgoError::InvalidClusterCount {
                k: self.k,
                max: n_points,
            });
        }
        if self.max_iterations == 0 {
            return Err(AlgoError::InvalidParameter {
                name: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.n_init == 0 {
            return Err(AlgoError::InvalidParameter {
                name: "n_init",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(AlgoError::InvalidParameter {
                name: "tolerance",
                reason: format!("must be a non-negative number, got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

/// Result of a K-Means fit
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Cluster index per input row
    pub labels: Vec<usize>,
    /// `k x d` centroid matrix, mean of each cluster's members
    pub centroids: Array2<f64>,
    /// Sum of squared distances from each row to its assigned centroid
    pub inertia: f64,
    /// Lloyd iterations used by the winning restart
    pub iterations: usize,
    /// Whether the winning restart converged before `max_iterations`
    pub converged: bool,
    /// Member count per cluster
    pub cluster_sizes: Vec<usize>,
}

impl KMeansResult {
    /// Cluster indices with no members
    pub fn empty_clusters(&self) -> Vec<usize> {
        self.cluster_sizes
            .iter()
            .enumerate()
            .filter(|(_, size)| **size == 0)
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Fit K-Means to the rows of `data`
pub fn kmeans(data: ArrayView2<f64>, config: &KMeansConfig) -> AlgoResult<KMeansResult> {
    let n = data.nrows();
    if n == 0 {
        return Err(AlgoError::EmptyInput("k-means needs at least one point".to_string()));
    }
    config.validate(n)?;
    ensure_finite(data)?;

    let tol = config.tolerance * mean_variance(data);

    let runs: Vec<KMeansResult> = (0..config.n_init)
        .into_par_iter()
        .map(|run| {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(run as u64));
            let initial = kmeans_plus_plus(data, config.k, &mut rng);
            lloyd(data, initial, config.max_iterations, tol)
        })
        .collect();

    let mut best: Option<KMeansResult> = None;
    for (run, result) in runs.into_iter().enumerate() {
        debug!(
            "k-means k={} restart {}: inertia {:.6} after {} iterations",
            config.k, run, result.inertia, result.iterations
        );
        let improves = best
            .as_ref()
            .map_or(true, |current| result.inertia < current.inertia);
        if improves {
            best = Some(result);
        }
    }

    best.ok_or_else(|| AlgoError::InvalidParameter {
        name: "n_init",
        reason: "no restart produced a result".to_string(),
    })
}

/// Fit one model per `k` and return `(k, inertia)` in input order
pub fn inertia_sweep(
    data: ArrayView2<f64>,
    ks: &[usize],
    base: &KMeansConfig,
) -> AlgoResult<Vec<(usize, f64)>> {
    // Validate the whole range before doing any work
    for &k in ks {
        base.with_k(k).validate(data.nrows())?;
    }
    ks.iter()
        .map(|&k| kmeans(data, &base.with_k(k)).map(|r| (k, r.inertia)))
        .collect()
}

/// Assign each row to its nearest centroid, returning labels and inertia
pub fn assign(data: ArrayView2<f64>, centroids: ArrayView2<f64>) -> (Vec<usize>, f64) {
    let mut inertia = 0.0;
    let labels = data
        .outer_iter()
        .map(|point| {
            let (label, dist) = nearest_centroid(point, centroids);
            inertia += dist;
            label
        })
        .collect();
    (labels, inertia)
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the closest chosen centroid.
fn kmeans_plus_plus(data: ArrayView2<f64>, k: usize, rng: &mut StdRng) -> Array2<f64> {
    let n = data.nrows();
    let mut chosen = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..n));

    let mut min_dist: Vec<f64> = data
        .outer_iter()
        .map(|p| squared_distance(p, data.row(chosen[0])))
        .collect();

    while chosen.len() < k {
        let total: f64 = min_dist.iter().sum();
        let next = if total > 0.0 {
            let threshold = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut pick = n - 1;
            for (idx, &d) in min_dist.iter().enumerate() {
                cumulative += d;
                if cumulative >= threshold && d > 0.0 {
                    pick = idx;
                    break;
                }
            }
            pick
        } else {
            // All remaining points coincide with a chosen centroid
            rng.gen_range(0..n)
        };
        chosen.push(next);

        for (idx, p) in data.outer_iter().enumerate() {
            let d = squared_distance(p, data.row(next));
            if d < min_dist[idx] {
                min_dist[idx] = d;
            }
        }
    }

    data.select(Axis(0), &chosen)
}

fn lloyd(
    data: ArrayView2<f64>,
    mut centroids: Array2<f64>,
    max_iterations: usize,
    tol: f64,
) -> KMeansResult {
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        let (labels, _) = assign(data, centroids.view());
        let (updated, _) = member_means(data, &labels, &centroids);

        let shift: f64 = updated
            .outer_iter()
            .zip(centroids.outer_iter())
            .map(|(a, b)| squared_distance(a, b))
            .sum();
        centroids = updated;

        if shift <= tol {
            converged = true;
            break;
        }
    }

    // Final assignment, then centroids become the mean of their members
    let (labels, _) = assign(data, centroids.view());
    let (centroids, cluster_sizes) = member_means(data, &labels, &centroids);
    let inertia = labels
        .iter()
        .zip(data.outer_iter())
        .map(|(&label, point)| squared_distance(point, centroids.row(label)))
        .sum();

    KMeansResult {
        labels,
        centroids,
        inertia,
        iterations,
        converged,
        cluster_sizes,
    }
}

/// Mean of each cluster's members. Empty clusters keep their previous position.
fn member_means(
    data: ArrayView2<f64>,
    labels: &[usize],
    previous: &Array2<f64>,
) -> (Array2<f64>, Vec<usize>) {
    let (k, dim) = previous.dim();
    let mut sums = Array2::<f64>::zeros((k, dim));
    let mut counts = vec![0usize; k];

    for (point, &label) in data.outer_iter().zip(labels) {
        let mut row = sums.row_mut(label);
        row += &point;
        counts[label] += 1;
    }

    for (label, &count) in counts.iter().enumerate() {
        if count == 0 {
            sums.row_mut(label).assign(&previous.row(label));
        } else {
            sums.row_mut(label).mapv_inplace(|v| v / count as f64);
        }
    }

    (sums, counts)
}

fn mean_variance(data: ArrayView2<f64>) -> f64 {
    if data.ncols() == 0 {
        return 0.0;
    }
    data.var_axis(Axis(0), 0.0).mean().unwrap_or(0.0)
}
