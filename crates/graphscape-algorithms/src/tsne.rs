//! t-SNE embedding
//!
//! Exact t-distributed stochastic neighbor embedding into two dimensions.
//!
//! 1. Pairwise squared distances in feature space
//! 2. Per-row Gaussian bandwidth found by binary search on the target perplexity
//! 3. Symmetrized joint probabilities P
//! 4. Gradient descent on KL(P || Q) where Q uses a Student-t kernel, with early
//!    exaggeration, momentum and adaptive gains
//!
//! The initial layout is drawn from a `StdRng` seeded by `TsneConfig::seed`, so
//! two runs with the same seed and input produce identical layouts. Per-row work
//! is spread over rayon; all reductions run sequentially to keep that guarantee.

use crate::common::{ensure_finite, squared_distance};
use crate::error::{AlgoError, AlgoResult};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::prelude::*;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Number of output dimensions
pub const EMBEDDING_DIM: usize = 2;

const MACHINE_EPSILON: f64 = 1e-12;
const MIN_GAIN: f64 = 0.01;
const BINARY_SEARCH_STEPS: usize = 100;
const ENTROPY_TOLERANCE: f64 = 1e-5;
const INITIAL_MOMENTUM: f64 = 0.5;
const FINAL_MOMENTUM: f64 = 0.8;
const INIT_SCALE: f64 = 1e-4;

/// t-SNE configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TsneConfig {
    /// Effective number of neighbors (local vs global tradeoff, usually 5-50)
    pub perplexity: f64,
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Total number of gradient descent iterations
    pub n_iter: usize,
    /// Multiplier applied to P during the first `exaggeration_iters` iterations
    pub early_exaggeration: f64,
    /// Length of the early exaggeration phase
    pub exaggeration_iters: usize,
    /// Seed for the initial layout
    pub seed: u64,
}

impl Default for TsneConfig {
    fn default() -> Self {
        Self {
            perplexity: 30.0,
            learning_rate: 200.0,
            n_iter: 1000,
            early_exaggeration: 12.0,
            exaggeration_iters: 250,
            seed: 42,
        }
    }
}

impl TsneConfig {
    /// Check hyperparameter ranges
    pub fn validate(&self) -> AlgoResult<()> {
        if !self.perplexity.is_finite() || self.perplexity <= 0.0 {
            return Err(AlgoError::InvalidParameter {
                name: "perplexity",
                reason: format!("must be a positive number, got {}", self.perplexity),
            });
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(AlgoError::InvalidParameter {
                name: "learning_rate",
                reason: format!("must be a positive number, got {}", self.learning_rate),
            });
        }
        if self.n_iter == 0 {
            return Err(AlgoError::InvalidParameter {
                name: "n_iter",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.early_exaggeration.is_finite() || self.early_exaggeration < 1.0 {
            return Err(AlgoError::InvalidParameter {
                name: "early_exaggeration",
                reason: format!("must be >= 1.0, got {}", self.early_exaggeration),
            });
        }
        Ok(())
    }
}

/// Result of a t-SNE run
#[derive(Debug, Clone)]
pub struct TsneResult {
    /// `n x 2` layout, row order matches the input
    pub embedding: Array2<f64>,
    /// Final KL(P || Q)
    pub kl_divergence: f64,
    /// Perplexity actually used after clamping to the sample count
    pub effective_perplexity: f64,
    /// Iterations performed
    pub iterations: usize,
}

/// Largest usable perplexity for `n_samples` points.
///
/// Each point needs roughly `3 * perplexity` neighbors for the bandwidth search
/// to be meaningful, so the request is capped at `(n - 1) / 3` and floored at 1.
pub fn effective_perplexity(requested: f64, n_samples: usize) -> f64 {
    let limit = n_samples.saturating_sub(1) as f64 / 3.0;
    requested.min(limit).max(1.0)
}

/// Embed the rows of `data` into two dimensions
pub fn tsne(data: ArrayView2<f64>, config: &TsneConfig) -> AlgoResult<TsneResult> {
    config.validate()?;

    let n = data.nrows();
    if n == 0 {
        return Err(AlgoError::EmptyInput("t-SNE needs at least one row".to_string()));
    }
    ensure_finite(data)?;

    let perplexity = effective_perplexity(config.perplexity, n);
    if perplexity < config.perplexity {
        warn!(
            "Perplexity {} too large for {} samples, using {:.3}",
            config.perplexity, n, perplexity
        );
    }

    if n == 1 {
        return Ok(TsneResult {
            embedding: Array2::zeros((1, EMBEDDING_DIM)),
            kl_divergence: 0.0,
            effective_perplexity: perplexity,
            iterations: 0,
        });
    }

    let distances = pairwise_sq_distances(data);
    let conditional = conditional_probabilities(&distances, perplexity);
    let p = joint_probabilities(&conditional);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut y = Array2::from_shape_fn((n, EMBEDDING_DIM), |_| {
        rng.gen_range(-INIT_SCALE..INIT_SCALE)
    });
    let mut velocity = Array2::<f64>::zeros((n, EMBEDDING_DIM));
    let mut gains = Array2::<f64>::from_elem((n, EMBEDDING_DIM), 1.0);

    for iter in 0..config.n_iter {
        let exaggerating = iter < config.exaggeration_iters;
        let exaggeration = if exaggerating { config.early_exaggeration } else { 1.0 };
        let momentum = if exaggerating { INITIAL_MOMENTUM } else { FINAL_MOMENTUM };

        let (num, sum_num) = student_t_kernel(&y);
        let grad = kl_gradient(&p, &num, sum_num, &y, exaggeration);

        for i in 0..n {
            for d in 0..EMBEDDING_DIM {
                let g = grad[[i, d]];
                let gain = &mut gains[[i, d]];
                *gain = if (g > 0.0) != (velocity[[i, d]] > 0.0) {
                    *gain + 0.2
                } else {
                    *gain * 0.8
                };
                if *gain < MIN_GAIN {
                    *gain = MIN_GAIN;
                }
                velocity[[i, d]] = momentum * velocity[[i, d]] - config.learning_rate * *gain * g;
                y[[i, d]] += velocity[[i, d]];
            }
        }

        if let Some(mean) = y.mean_axis(Axis(0)) {
            y -= &mean;
        }

        if (iter + 1) % 100 == 0 {
            debug!(
                "t-SNE iteration {}: KL divergence {:.5}",
                iter + 1,
                kl_divergence(&p, &num, sum_num)
            );
        }
    }

    let (num, sum_num) = student_t_kernel(&y);
    let kl = kl_divergence(&p, &num, sum_num);

    Ok(TsneResult {
        embedding: y,
        kl_divergence: kl,
        effective_perplexity: perplexity,
        iterations: config.n_iter,
    })
}

fn pairwise_sq_distances(data: ArrayView2<f64>) -> Array2<f64> {
    let n = data.nrows();
    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .map(|j| squared_distance(data.row(i), data.row(j)))
                .collect()
        })
        .collect();
    Array2::from_shape_fn((n, n), |(i, j)| rows[i][j])
}

fn conditional_probabilities(distances: &Array2<f64>, perplexity: f64) -> Array2<f64> {
    let n = distances.nrows();
    let target_entropy = perplexity.ln();
    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| row_probabilities(distances.row(i), i, target_entropy))
        .collect();
    Array2::from_shape_fn((n, n), |(i, j)| rows[i][j])
}

/// P(j|i) for a single row, with the bandwidth chosen so the row entropy
/// matches `target_entropy`.
fn row_probabilities(dist: ArrayView1<f64>, i: usize, target_entropy: f64) -> Vec<f64> {
    let n = dist.len();
    // Shifting by the nearest-neighbor distance leaves the normalized
    // distribution unchanged and keeps exp() away from underflow.
    let min_dist = dist
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .map(|(_, &d)| d)
        .fold(f64::INFINITY, f64::min);

    let mut beta = 1.0;
    let mut beta_min = f64::NEG_INFINITY;
    let mut beta_max = f64::INFINITY;
    let mut probs = vec![0.0; n];

    for _ in 0..BINARY_SEARCH_STEPS {
        let mut sum = 0.0;
        let mut weighted = 0.0;
        for j in 0..n {
            if j == i {
                probs[j] = 0.0;
                continue;
            }
            let shifted = dist[j] - min_dist;
            let p = (-beta * shifted).exp();
            probs[j] = p;
            sum += p;
            weighted += shifted * p;
        }

        // sum >= 1: the nearest neighbor contributes exp(0)
        let entropy = sum.ln() + beta * weighted / sum;
        let diff = entropy - target_entropy;
        if diff.abs() < ENTROPY_TOLERANCE {
            break;
        }

        if diff > 0.0 {
            beta_min = beta;
            beta = if beta_max.is_infinite() { beta * 2.0 } else { (beta + beta_max) / 2.0 };
        } else {
            beta_max = beta;
            beta = if beta_min.is_infinite() { beta / 2.0 } else { (beta + beta_min) / 2.0 };
        }
    }

    let total: f64 = probs.iter().sum();
    if total > 0.0 {
        for p in probs.iter_mut() {
            *p /= total;
        }
    }
    probs
}

fn joint_probabilities(conditional: &Array2<f64>) -> Array2<f64> {
    let n = conditional.nrows();
    let norm = 2.0 * n as f64;
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            0.0
        } else {
            ((conditional[[i, j]] + conditional[[j, i]]) / norm).max(MACHINE_EPSILON)
        }
    })
}

/// Unnormalized Student-t affinities `1 / (1 + |y_i - y_j|^2)` and their sum
fn student_t_kernel(y: &Array2<f64>) -> (Array2<f64>, f64) {
    let n = y.nrows();
    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        0.0
                    } else {
                        1.0 / (1.0 + squared_distance(y.row(i), y.row(j)))
                    }
                })
                .collect()
        })
        .collect();
    let sum: f64 = rows.iter().map(|r| r.iter().sum::<f64>()).sum();
    (Array2::from_shape_fn((n, n), |(i, j)| rows[i][j]), sum)
}

fn kl_gradient(
    p: &Array2<f64>,
    num: &Array2<f64>,
    sum_num: f64,
    y: &Array2<f64>,
    exaggeration: f64,
) -> Array2<f64> {
    let n = y.nrows();
    let rows: Vec<[f64; EMBEDDING_DIM]> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut g = [0.0; EMBEDDING_DIM];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let q = (num[[i, j]] / sum_num).max(MACHINE_EPSILON);
                let factor = 4.0 * (exaggeration * p[[i, j]] - q) * num[[i, j]];
                for (d, g_d) in g.iter_mut().enumerate() {
                    *g_d += factor * (y[[i, d]] - y[[j, d]]);
                }
            }
            g
        })
        .collect();
    Array2::from_shape_fn((n, EMBEDDING_DIM), |(i, d)| rows[i][d])
}

fn kl_divergence(p: &Array2<f64>, num: &Array2<f64>, sum_num: f64) -> f64 {
    let mut kl = 0.0;
    for ((i, j), &p_ij) in p.indexed_iter() {
        if i == j {
            continue;
        }
        let q_ij = (num[[i, j]] / sum_num).max(MACHINE_EPSILON);
        kl += p_ij * (p_ij / q_ij).ln();
    }
    kl
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn two_groups(per_group: usize, dim: usize, offset: f64) -> Array2<f64> {
        Array2::from_shape_fn((2 * per_group, dim), |(i, j)| {
            let base = if i < per_group { 0.0 } else { offset };
            base + ((i * 7 + j * 3) % 5) as f64 * 0.1
        })
    }

    fn fast_config() -> TsneConfig {
        TsneConfig {
            learning_rate: 50.0,
            n_iter: 400,
            ..TsneConfig::default()
        }
    }

    #[test]
    fn test_output_shape_and_finite() {
        let data = two_groups(6, 4, 10.0);
        let result = tsne(data.view(), &fast_config()).unwrap();
        assert_eq!(result.embedding.dim(), (12, EMBEDDING_DIM));
        assert!(result.embedding.iter().all(|v| v.is_finite()));
        assert!(result.kl_divergence.is_finite());
        assert_eq!(result.iterations, 400);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let data = two_groups(5, 3, 8.0);
        let a = tsne(data.view(), &fast_config()).unwrap();
        let b = tsne(data.view(), &fast_config()).unwrap();
        assert_eq!(a.embedding, b.embedding);
    }

    #[test]
    fn test_different_seed_different_layout() {
        let data = two_groups(5, 3, 8.0);
        let a = tsne(data.view(), &fast_config()).unwrap();
        let b = tsne(
            data.view(),
            &TsneConfig {
                seed: 7,
                ..fast_config()
            },
        )
        .unwrap();
        assert_ne!(a.embedding, b.embedding);
    }

    #[test]
    fn test_separates_groups() {
        let per_group = 10;
        let data = two_groups(per_group, 5, 20.0);
        let y = tsne(data.view(), &fast_config()).unwrap().embedding;

        let centroid = |range: std::ops::Range<usize>| {
            let len = range.len() as f64;
            let (sx, sy) = range.fold((0.0, 0.0), |(sx, sy), i| (sx + y[[i, 0]], sy + y[[i, 1]]));
            (sx / len, sy / len)
        };
        let (ax, ay) = centroid(0..per_group);
        let (bx, by) = centroid(per_group..2 * per_group);
        let between = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();

        let spread = (0..per_group)
            .map(|i| ((y[[i, 0]] - ax).powi(2) + (y[[i, 1]] - ay).powi(2)).sqrt())
            .fold(0.0, f64::max);
        assert!(
            between > spread,
            "groups overlap: centroid gap {} vs spread {}",
            between,
            spread
        );
    }

    #[test]
    fn test_single_row() {
        let data = Array2::from_shape_vec((1, 3), vec![1.0, 2.0, 3.0]).unwrap();
        let result = tsne(data.view(), &TsneConfig::default()).unwrap();
        assert_eq!(result.embedding.dim(), (1, 2));
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_empty_input() {
        let data = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            tsne(data.view(), &TsneConfig::default()),
            Err(AlgoError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        let data = two_groups(3, 2, 5.0);
        for config in [
            TsneConfig { perplexity: 0.0, ..TsneConfig::default() },
            TsneConfig { learning_rate: -1.0, ..TsneConfig::default() },
            TsneConfig { n_iter: 0, ..TsneConfig::default() },
            TsneConfig { early_exaggeration: 0.5, ..TsneConfig::default() },
        ] {
            assert!(matches!(
                tsne(data.view(), &config),
                Err(AlgoError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_effective_perplexity() {
        assert_eq!(effective_perplexity(30.0, 1000), 30.0);
        assert!((effective_perplexity(30.0, 31) - 10.0).abs() < 1e-12);
        assert_eq!(effective_perplexity(30.0, 2), 1.0);
    }

    #[test]
    fn test_row_probabilities_match_perplexity() {
        let dist = ndarray::array![0.0, 1.0, 4.0, 9.0, 16.0, 25.0, 36.0];
        let target = 3.0_f64;
        let probs = row_probabilities(dist.view(), 0, target.ln());

        let total: f64 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(probs[0], 0.0);

        let entropy: f64 = probs
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| -p * p.ln())
            .sum();
        assert!((entropy.exp() - target).abs() < 1e-3);
    }
}
