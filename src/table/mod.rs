//! In-memory feature table
//!
//! One row per graph: a unique identifier, a category label and a fixed-length
//! numeric feature vector. The table is the root snapshot of a run; every
//! derived table is computed from it and it is never modified in place.

pub mod loader;

pub use loader::{load_csv, read_csv, InputConfig};

use crate::error::{AnalysisError, AnalysisResult};
use graphscape_algorithms::min_max_scale;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One graph instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub graph_id: String,
    pub category: String,
    pub features: Vec<f64>,
}

impl Row {
    pub fn new(graph_id: impl Into<String>, category: impl Into<String>, features: Vec<f64>) -> Self {
        Self {
            graph_id: graph_id.into(),
            category: category.into(),
            features,
        }
    }
}

/// Validated set of rows sharing one feature schema
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    feature_names: Vec<String>,
    rows: Vec<Row>,
}

impl FeatureTable {
    /// Build a table, enforcing:
    /// - at least one row
    /// - every feature vector has `feature_names.len()` finite values
    /// - graph ids are unique
    pub fn new(feature_names: Vec<String>, rows: Vec<Row>) -> AnalysisResult<Self> {
        if rows.is_empty() {
            return Err(AnalysisError::EmptyTable("feature table has no rows".to_string()));
        }

        let dim = feature_names.len();
        let mut seen = HashSet::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if row.features.len() != dim {
                return Err(AnalysisError::DimensionMismatch {
                    row: idx,
                    expected: dim,
                    got: row.features.len(),
                });
            }
            if let Some(col) = row.features.iter().position(|v| !v.is_finite()) {
                return Err(AnalysisError::MissingValue {
                    row: idx,
                    column: feature_names[col].clone(),
                });
            }
            if !seen.insert(row.graph_id.as_str()) {
                return Err(AnalysisError::DuplicateGraphId(row.graph_id.clone()));
            }
        }

        Ok(Self { feature_names, rows })
    }

    /// Build a table with generated feature names (`f0`, `f1`, ...) taken
    /// from the first row's length
    pub fn from_rows(rows: Vec<Row>) -> AnalysisResult<Self> {
        let dim = rows.first().map(|r| r.features.len()).unwrap_or(0);
        let names = (0..dim).map(|i| format!("f{}", i)).collect();
        Self::new(names, rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of features per row
    pub fn dim(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn graph_ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.graph_id.as_str()).collect()
    }

    /// Category per row, in row order
    pub fn categories(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.category.as_str()).collect()
    }

    /// Distinct categories in order of first appearance
    pub fn distinct_categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| r.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Dense `rows x features` matrix
    pub fn feature_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), self.dim()), |(i, j)| self.rows[i].features[j])
    }

    /// New table without the rows whose category is listed in `excluded`
    pub fn without_categories(&self, excluded: &[String]) -> AnalysisResult<Self> {
        let rows = self
            .rows
            .iter()
            .filter(|r| !excluded.iter().any(|c| c == &r.category))
            .cloned()
            .collect::<Vec<_>>();
        if rows.is_empty() {
            return Err(AnalysisError::EmptyTable(format!(
                "no rows left after excluding categories {:?}",
                excluded
            )));
        }
        Self::new(self.feature_names.clone(), rows)
    }

    /// New table with every feature column rescaled to [0, 1]
    pub fn min_max_scaled(&self) -> Self {
        let scaled = min_max_scale(self.feature_matrix().view());
        let rows = self
            .rows
            .iter()
            .zip(scaled.outer_iter())
            .map(|(row, values)| Row {
                graph_id: row.graph_id.clone(),
                category: row.category.clone(),
                features: values.to_vec(),
            })
            .collect();
        Self {
            feature_names: self.feature_names.clone(),
            rows,
        }
    }
}
