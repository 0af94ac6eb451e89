//! Graphscape
//!
//! Exploratory analysis of graph feature tables: each graph is described by a
//! vector of structural metrics and a category label. The pipeline projects the
//! vectors to 2-D with t-SNE, clusters the projection with k-means, compares
//! clusters against categories and renders an interactive scatter plot.
//!
//! # Stages
//!
//! - `table`: `FeatureTable` and CSV loading
//! - `analysis`: embedding, inertia sweep, clustering, cross-tabulation
//! - `encode`: category colors and cluster markers per graph
//! - `render`: self-contained HTML scatter plot
//! - `pipeline`: runs all of the above from one `AnalysisConfig`
//!
//! ## Example Usage
//!
//! ```rust
//! use graphscape::{AnalysisConfig, FeatureTable, Pipeline, Row};
//!
//! let rows = (0..6)
//!     .map(|i| {
//!         let (category, base) = if i < 3 { ("A", 0.0) } else { ("B", 10.0) };
//!         Row::new(format!("g{}", i), category, vec![base + i as f64 * 0.1; 4])
//!     })
//!     .collect();
//! let table = FeatureTable::from_rows(rows).unwrap();
//!
//! let mut config = AnalysisConfig::default();
//! config.embedding.perplexity = 1.5;
//! config.clustering.k = 2;
//!
//! let report = Pipeline::new(config).run(&table).unwrap();
//! assert_eq!(report.crosstab.total(), 6);
//! ```

pub mod analysis;
pub mod config;
pub mod encode;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod render;
pub mod table;

pub use analysis::{
    cluster, cross_tab, embed, sweep_inertia, Centroid, ClusterAssignment, ClusterParams,
    Clustering, CrossTab, CrossTabCell, EmbeddedPoint, EmbeddingParams, InertiaPoint,
};
pub use config::{AnalysisConfig, EncodingConfig, PreprocessConfig, Scaling, SelectionConfig};
pub use encode::{encode, ColorMap, Marker, MarkerMap, VisualRecord, CATEGORY20};
pub use error::{AnalysisError, AnalysisResult};
pub use pipeline::{AnalysisReport, Pipeline};
pub use render::{render_html, HoverField, LegendLocation, PlotOptions};
pub use table::{load_csv, read_csv, FeatureTable, InputConfig, Row};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
