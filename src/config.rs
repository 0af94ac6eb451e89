//! Analysis configuration
//!
//! One YAML document drives a whole run. Every section and every field has a
//! default, so an empty document is a valid configuration.

use crate::analysis::{ClusterParams, EmbeddingParams};
use crate::encode::{ColorMap, Marker, MarkerMap};
use crate::error::{AnalysisError, AnalysisResult};
use crate::render::PlotOptions;
use crate::table::InputConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Feature scaling applied before embedding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    #[default]
    None,
    /// Rescale each column to [0, 1]
    MinMax,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub scaling: Scaling,
}

/// Inertia sweep range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub enabled: bool,
    pub k_min: usize,
    pub k_max: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            k_min: 1,
            k_max: 19,
        }
    }
}

impl SelectionConfig {
    /// Candidate k values for a table with `row_count` rows.
    ///
    /// `k_max` is capped at the row count.
    pub fn k_range(&self, row_count: usize) -> AnalysisResult<Vec<usize>> {
        self.check(row_count)?;
        let k_max = if self.k_max > row_count {
            warn!(
                "Inertia sweep capped at k={} (only {} rows, requested k_max={})",
                row_count, row_count, self.k_max
            );
            row_count
        } else {
            self.k_max
        };
        Ok((self.k_min..=k_max).collect())
    }

    /// Range errors only; `k_max` above the row count is not an error
    fn check(&self, row_count: usize) -> AnalysisResult<()> {
        if self.k_min == 0 || self.k_min > self.k_max {
            return Err(AnalysisError::InvalidParameter {
                name: "selection".to_string(),
                reason: format!(
                    "need 1 <= k_min <= k_max, got k_min={} k_max={}",
                    self.k_min, self.k_max
                ),
            });
        }
        if self.k_min > row_count {
            return Err(AnalysisError::InvalidClusterCount {
                k: self.k_min,
                max: row_count,
            });
        }
        Ok(())
    }
}

/// Explicit visual mappings; anything left unset falls back to the palettes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub colors: Option<ColorMap>,
    /// `markers[i]` is the marker of cluster `i`
    pub markers: Option<Vec<Marker>>,
}

impl EncodingConfig {
    /// Color map for the given categories (first-appearance order)
    pub fn color_map<S: AsRef<str>>(&self, categories: &[S]) -> AnalysisResult<ColorMap> {
        match &self.colors {
            Some(colors) => Ok(colors.clone()),
            None => ColorMap::from_palette(categories),
        }
    }

    /// Marker map for `k` clusters
    pub fn marker_map(&self, k: usize) -> AnalysisResult<MarkerMap> {
        match &self.markers {
            Some(markers) => MarkerMap::from_markers(markers),
            None => Ok(MarkerMap::default_for(k)),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input: InputConfig,
    pub preprocess: PreprocessConfig,
    pub embedding: EmbeddingParams,
    pub clustering: ClusterParams,
    pub selection: SelectionConfig,
    pub encoding: EncodingConfig,
    pub plot: PlotOptions,
}

impl AnalysisConfig {
    pub fn from_yaml_str(yaml: &str) -> AnalysisResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> AnalysisResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check parameters against a table of `row_count` rows.
    ///
    /// Runs before any embedding so a bad k fails fast.
    pub fn validate(&self, row_count: usize) -> AnalysisResult<()> {
        self.embedding.validate()?;
        self.clustering.validate(row_count)?;
        if self.selection.enabled {
            self.selection.check(row_count)?;
        }
        // A shorter marker list is allowed; clusters without a marker fail at encode time
        if let Some(markers) = &self.encoding.markers {
            MarkerMap::from_markers(markers)?;
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(AnalysisError::InvalidParameter {
                name: "plot".to_string(),
                reason: "width and height must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::LegendLocation;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.clustering.k, 8);
        assert_eq!(config.embedding.perplexity, 30.0);
        assert_eq!(config.selection.k_min, 1);
        assert_eq!(config.selection.k_max, 19);
        assert_eq!(config.preprocess.scaling, Scaling::None);
        assert_eq!(config.plot.width, 1000);
        assert_eq!(config.input.exclude_categories, vec!["Temporal Reachability"]);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AnalysisConfig::from_yaml_str("").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r##"
preprocess:
  scaling: min_max
clustering:
  k: 4
  seed: 7
encoding:
  markers: [circle, square, triangle, star]
  colors:
    Web Graphs: "#ff0000"
plot:
  legend_location: bottom_right
"##;
        let config = AnalysisConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.preprocess.scaling, Scaling::MinMax);
        assert_eq!(config.clustering.k, 4);
        assert_eq!(config.clustering.seed, 7);
        assert_eq!(config.clustering.max_iterations, 300);
        assert_eq!(config.embedding.learning_rate, 200.0);
        assert_eq!(config.plot.legend_location, LegendLocation::BottomRight);

        let markers = config.encoding.marker_map(4).unwrap();
        assert_eq!(markers.get(1), Some(Marker::Square));
        let colors = config.encoding.color_map(&["ignored"]).unwrap();
        assert_eq!(colors.get("Web Graphs"), Some("#ff0000"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AnalysisConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(AnalysisConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_validate_cluster_count() {
        let config = AnalysisConfig::default();
        assert!(matches!(
            config.validate(5),
            Err(AnalysisError::InvalidClusterCount { k: 8, max: 5 })
        ));
        assert!(config.validate(100).is_ok());
    }

    #[test]
    fn test_validate_short_marker_list() {
        let mut config = AnalysisConfig::default();
        config.clustering.k = 3;
        config.encoding.markers = Some(vec![Marker::Circle, Marker::Square]);
        assert!(config.validate(100).is_ok());

        let markers = config.encoding.marker_map(3).unwrap();
        assert_eq!(markers.get(1), Some(Marker::Square));
        assert_eq!(markers.get(2), None);

        config.encoding.markers = Some(vec![Marker::Circle, Marker::Circle]);
        assert!(matches!(
            config.validate(100),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_validate_does_not_cap_sweep() {
        let config = AnalysisConfig {
            clustering: ClusterParams { k: 2, ..Default::default() },
            ..Default::default()
        };
        // k_max=19 over 4 rows is capped later by k_range, not rejected
        assert!(config.validate(4).is_ok());
        assert_eq!(config.selection.check(4).ok(), Some(()));
    }

    #[test]
    fn test_k_range_capped() {
        let selection = SelectionConfig::default();
        assert_eq!(selection.k_range(4).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(selection.k_range(50).unwrap().len(), 19);

        let bad = SelectionConfig {
            enabled: true,
            k_min: 5,
            k_max: 3,
        };
        assert!(bad.k_range(10).is_err());

        let too_high = SelectionConfig {
            enabled: true,
            k_min: 6,
            k_max: 10,
        };
        assert!(matches!(
            too_high.k_range(4),
            Err(AnalysisError::InvalidClusterCount { k: 6, max: 4 })
        ));
    }

    #[test]
    fn test_unknown_scaling_rejected() {
        let err = AnalysisConfig::from_yaml_str("preprocess:\n  scaling: zscore\n").unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }
}
