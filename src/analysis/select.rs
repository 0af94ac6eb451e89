//! Cluster count selection support
//!
//! Sweeps k and reports inertia so the elbow can be picked by eye. Nothing
//! here chooses k; the clustering stage always takes k from configuration.

use super::embed::{points_matrix, EmbeddedPoint};
use super::ClusterParams;
use crate::error::{AnalysisError, AnalysisResult};
use graphscape_algorithms::inertia_sweep;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Inertia of the best fit for one candidate k
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertiaPoint {
    pub k: usize,
    pub inertia: f64,
    /// Inertia went up compared to the previous k (unstable fit)
    pub regression: bool,
}

/// Fit one model per k in `k_range` and record its inertia.
///
/// `k_range` must be strictly increasing. Inertia is expected to be
/// non-increasing in k; a rise is logged and flagged, never an error.
pub fn sweep_inertia(
    points: &[EmbeddedPoint],
    k_range: &[usize],
    params: &ClusterParams,
) -> AnalysisResult<Vec<InertiaPoint>> {
    if k_range.windows(2).any(|w| w[0] >= w[1]) {
        return Err(AnalysisError::InvalidParameter {
            name: "k_range".to_string(),
            reason: format!("must be strictly increasing, got {:?}", k_range),
        });
    }

    let data = points_matrix(points);
    let sweep = inertia_sweep(data.view(), k_range, params)?;
    Ok(flag_regressions(&sweep))
}

/// Mark every k whose inertia rose above the previous k's.
///
/// A rise means the fit at that k was unstable; it is logged and flagged,
/// never an error.
pub fn flag_regressions(sweep: &[(usize, f64)]) -> Vec<InertiaPoint> {
    let mut result = Vec::with_capacity(sweep.len());
    let mut previous: Option<f64> = None;
    for &(k, inertia) in sweep {
        let regression = match previous {
            Some(prev) => inertia > prev + 1e-9 * prev.abs().max(1.0),
            None => false,
        };
        if regression {
            warn!(
                "Inertia increased from {:.4} to {:.4} at k={}; the fit may be unstable",
                previous.unwrap_or_default(),
                inertia,
                k
            );
        }
        info!("k={:<3} inertia={:.4}", k, inertia);
        result.push(InertiaPoint { k, inertia, regression });
        previous = Some(inertia);
    }
    result
}
