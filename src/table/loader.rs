//! CSV ingestion
//!
//! Expected layout: a header row, one identifier column, one category column
//! and any number of numeric feature columns. Columns listed in
//! `ignore_columns` and unnamed columns (a leading index written by
//! dataframe tools) are skipped.

use super::{FeatureTable, Row};
use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Input schema configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Column holding the unique graph identifier
    pub id_column: String,
    /// Column holding the category label
    pub category_column: String,
    /// Non-feature columns to drop
    pub ignore_columns: Vec<String>,
    /// Categories removed before analysis
    pub exclude_categories: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            id_column: "Graph Name".to_string(),
            category_column: "Category Name".to_string(),
            ignore_columns: vec!["Category Number".to_string()],
            exclude_categories: vec!["Temporal Reachability".to_string()],
        }
    }
}

/// Load a feature table from a CSV file
pub fn load_csv<P: AsRef<Path>>(path: P, config: &InputConfig) -> AnalysisResult<FeatureTable> {
    let path = path.as_ref();
    info!("Loading feature table from {}", path.display());
    let file = std::fs::File::open(path)?;
    read_csv(file, config)
}

/// Parse a feature table from any CSV source
pub fn read_csv<R: Read>(reader: R, config: &InputConfig) -> AnalysisResult<FeatureTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column_index = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
    };
    let id_idx = column_index(&config.id_column)?;
    let category_idx = column_index(&config.category_column)?;

    let feature_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, name)| {
            *idx != id_idx
                && *idx != category_idx
                && !name.is_empty()
                && !config.ignore_columns.iter().any(|c| c.as_str() == *name)
        })
        .map(|(idx, name)| (idx, name.to_string()))
        .collect();
    debug!(
        "Detected {} feature columns: {:?}",
        feature_columns.len(),
        feature_columns.iter().map(|(_, n)| n).collect::<Vec<_>>()
    );

    let mut rows = Vec::new();
    let mut excluded = 0usize;
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(AnalysisError::DimensionMismatch {
                row: row_idx,
                expected: headers.len(),
                got: record.len(),
            });
        }

        let category = record[category_idx].to_string();
        if config.exclude_categories.iter().any(|c| c == &category) {
            excluded += 1;
            continue;
        }

        let features = feature_columns
            .iter()
            .map(|(idx, name)| parse_feature(&record[*idx], row_idx, name))
            .collect::<AnalysisResult<Vec<f64>>>()?;

        rows.push(Row {
            graph_id: record[id_idx].to_string(),
            category,
            features,
        });
    }

    if excluded > 0 {
        info!("Excluded {} rows by category filter", excluded);
    }
    if rows.is_empty() {
        return Err(AnalysisError::EmptyTable("input contains no usable rows".to_string()));
    }

    let names = feature_columns.into_iter().map(|(_, name)| name).collect();
    let table = FeatureTable::new(names, rows)?;
    info!("Loaded {} rows with {} features", table.len(), table.dim());
    Ok(table)
}

fn parse_feature(cell: &str, row: usize, column: &str) -> AnalysisResult<f64> {
    if cell.is_empty() {
        return Err(AnalysisError::MissingValue {
            row,
            column: column.to_string(),
        });
    }
    let value: f64 = cell.parse().map_err(|_| AnalysisError::InvalidValue {
        row,
        column: column.to_string(),
        value: cell.to_string(),
    })?;
    if !value.is_finite() {
        return Err(AnalysisError::MissingValue {
            row,
            column: column.to_string(),
        });
    }
    Ok(value)
}
