//! Category x cluster contingency table

use super::cluster::ClusterAssignment;
use crate::error::{AnalysisError, AnalysisResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One non-zero cell of a `CrossTab`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTabCell {
    pub category: String,
    pub cluster: usize,
    pub count: usize,
}

/// Counts of (category, cluster label) pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossTab {
    counts: IndexMap<(String, usize), usize>,
    categories: Vec<String>,
    num_clusters: usize,
}

impl CrossTab {
    /// Count for a pair; absent pairs are 0
    pub fn get(&self, category: &str, cluster: usize) -> usize {
        self.counts
            .get(&(category.to_string(), cluster))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all counts (equals the number of rows tabulated)
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Categories in order of first appearance
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of cluster columns (highest label + 1)
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// Widen the table to at least `k` cluster columns, so trailing empty
    /// clusters still show up as zero columns
    pub fn with_num_clusters(mut self, k: usize) -> Self {
        self.num_clusters = self.num_clusters.max(k);
        self
    }

    /// Counts for one category across clusters `0..num_clusters`
    pub fn row(&self, category: &str) -> Vec<usize> {
        (0..self.num_clusters).map(|c| self.get(category, c)).collect()
    }

    /// Total per cluster
    pub fn column_totals(&self) -> Vec<usize> {
        let mut totals = vec![0; self.num_clusters];
        for ((_, cluster), count) in &self.counts {
            totals[*cluster] += count;
        }
        totals
    }

    /// Non-zero cells
    pub fn cells(&self) -> Vec<CrossTabCell> {
        self.counts
            .iter()
            .map(|((category, cluster), &count)| CrossTabCell {
                category: category.clone(),
                cluster: *cluster,
                count,
            })
            .collect()
    }

    /// Fraction of rows that belong to their cluster's majority category
    pub fn purity(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let majority: usize = (0..self.num_clusters)
            .map(|c| {
                self.categories
                    .iter()
                    .map(|cat| self.get(cat, c))
                    .max()
                    .unwrap_or(0)
            })
            .sum();
        majority as f64 / total as f64
    }
}

impl fmt::Display for CrossTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .categories
            .iter()
            .map(|c| c.len())
            .max()
            .unwrap_or(0)
            .max("category".len());

        write!(f, "{:<width$}", "category", width = width)?;
        for c in 0..self.num_clusters {
            write!(f, " {:>5}", c)?;
        }
        writeln!(f)?;

        for category in &self.categories {
            write!(f, "{:<width$}", category, width = width)?;
            for count in self.row(category) {
                write!(f, " {:>5}", count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Cross-tabulate category labels against cluster assignments.
///
/// Both inputs are aligned by row index and must have the same length.
pub fn cross_tab<S: AsRef<str>>(
    categories: &[S],
    assignments: &[ClusterAssignment],
) -> AnalysisResult<CrossTab> {
    if categories.len() != assignments.len() {
        return Err(AnalysisError::Alignment(format!(
            "{} categories vs {} cluster assignments",
            categories.len(),
            assignments.len()
        )));
    }

    let mut table = CrossTab::default();
    for (category, assignment) in categories.iter().zip(assignments) {
        let category = category.as_ref();
        if !table.categories.iter().any(|c| c == category) {
            table.categories.push(category.to_string());
        }
        table.num_clusters = table.num_clusters.max(assignment.cluster_label + 1);
        *table
            .counts
            .entry((category.to_string(), assignment.cluster_label))
            .or_insert(0) += 1;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignments(labels: &[usize]) -> Vec<ClusterAssignment> {
        labels
            .iter()
            .enumerate()
            .map(|(i, &l)| ClusterAssignment {
                graph_id: format!("g{}", i),
                cluster_label: l,
            })
            .collect()
    }

    #[test]
    fn test_cross_tab_counts() {
        let categories = ["Web", "Web", "Social", "Bio", "Social", "Web"];
        let ct = cross_tab(&categories, &assignments(&[0, 1, 1, 2, 1, 0])).unwrap();

        assert_eq!(ct.get("Web", 0), 2);
        assert_eq!(ct.get("Web", 1), 1);
        assert_eq!(ct.get("Social", 1), 2);
        assert_eq!(ct.get("Bio", 2), 1);
        assert_eq!(ct.get("Bio", 0), 0);
        assert_eq!(ct.get("Unknown", 0), 0);
        assert_eq!(ct.categories(), &["Web", "Social", "Bio"]);
        assert_eq!(ct.num_clusters(), 3);
        assert_eq!(ct.row("Web"), vec![2, 1, 0]);
        assert_eq!(ct.column_totals(), vec![2, 3, 1]);
        assert_eq!(ct.total(), categories.len());
        assert!((ct.purity() - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_total_equals_rows() {
        for n in 1..20 {
            let categories: Vec<String> = (0..n).map(|i| format!("c{}", i % 4)).collect();
            let labels: Vec<usize> = (0..n).map(|i| (i * 7) % 5).collect();
            let ct = cross_tab(&categories, &assignments(&labels)).unwrap();
            assert_eq!(ct.total(), n);
            assert_eq!(ct.cells().iter().map(|c| c.count).sum::<usize>(), n);
        }
    }

    #[test]
    fn test_trailing_empty_cluster_kept() {
        let ct = cross_tab(&["A", "B", "A"], &assignments(&[0, 1, 0]))
            .unwrap()
            .with_num_clusters(4);
        assert_eq!(ct.num_clusters(), 4);
        assert_eq!(ct.row("A"), vec![2, 0, 0, 0]);
        assert_eq!(ct.column_totals(), vec![2, 1, 0, 0]);
        assert_eq!(ct.total(), 3);
        assert_eq!(ct.to_string().lines().next().map(|h| h.split_whitespace().count()), Some(5));

        // never narrows
        let ct = ct.with_num_clusters(2);
        assert_eq!(ct.num_clusters(), 4);
    }

    #[test]
    fn test_alignment_error() {
        let err = cross_tab(&["A", "B"], &assignments(&[0])).unwrap_err();
        assert!(matches!(err, AnalysisError::Alignment(_)));
    }

    #[test]
    fn test_display() {
        let ct = cross_tab(&["A", "B", "A"], &assignments(&[0, 1, 0])).unwrap();
        let text = ct.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("category"));
        assert!(lines[1].starts_with("A"));
        assert!(lines[1].trim_end().ends_with('0'));
    }
}
