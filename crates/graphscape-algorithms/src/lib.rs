pub mod common;
pub mod error;
pub mod kmeans;
pub mod scaling;
pub mod tsne;

pub use common::{nearest_centroid, squared_distance, stack_rows};
pub use error::{AlgoError, AlgoResult};
pub use kmeans::{assign, inertia_sweep, kmeans, KMeansConfig, KMeansResult};
pub use scaling::min_max_scale;
pub use tsne::{effective_perplexity, tsne, TsneConfig, TsneResult, EMBEDDING_DIM};
