//! Analysis stages
//!
//! The numeric kernels live in the `graphscape-algorithms` crate. This module
//! is the adapter layer: it feeds them dense views of the feature table and
//! turns their output back into row-identified tables.

pub mod cluster;
pub mod crosstab;
pub mod embed;
pub mod select;

// Re-export algorithm configuration
pub use graphscape_algorithms::{KMeansConfig, TsneConfig};

pub use cluster::{cluster, Centroid, ClusterAssignment, Clustering};
pub use crosstab::{cross_tab, CrossTab, CrossTabCell};
pub use embed::{embed, EmbeddedPoint};
pub use select::{flag_regressions, sweep_inertia, InertiaPoint};

/// Embedding hyperparameters
pub type EmbeddingParams = TsneConfig;

/// Clustering hyperparameters
pub type ClusterParams = KMeansConfig;
