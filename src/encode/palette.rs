//! Visual channels: category colors and cluster markers

use crate::error::{AnalysisError, AnalysisResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// d3 Category20 palette
pub const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Scatter marker shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Triangle,
    Circle,
    Diamond,
    Asterisk,
    Cross,
    Square,
    InvertedTriangle,
    Hex,
    X,
    Star,
}

impl Marker {
    /// Default marker order, one distinct shape per cluster
    pub const PALETTE: [Marker; 10] = [
        Marker::Triangle,
        Marker::Circle,
        Marker::Diamond,
        Marker::Asterisk,
        Marker::Cross,
        Marker::Square,
        Marker::InvertedTriangle,
        Marker::Hex,
        Marker::X,
        Marker::Star,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Marker::Triangle => "triangle",
            Marker::Circle => "circle",
            Marker::Diamond => "diamond",
            Marker::Asterisk => "asterisk",
            Marker::Cross => "cross",
            Marker::Square => "square",
            Marker::InvertedTriangle => "inverted_triangle",
            Marker::Hex => "hex",
            Marker::X => "x",
            Marker::Star => "star",
        }
    }

    /// Line-only shapes are drawn with a stroke instead of a fill
    pub fn is_stroked(&self) -> bool {
        matches!(self, Marker::Asterisk | Marker::Cross | Marker::X)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Category -> CSS color
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorMap(IndexMap<String, String>);

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign Category20 colors in the given order.
    ///
    /// Fails if there are more categories than palette entries, since reusing a
    /// color would make two categories indistinguishable.
    pub fn from_palette<S: AsRef<str>>(categories: &[S]) -> AnalysisResult<Self> {
        if categories.len() > CATEGORY20.len() {
            return Err(AnalysisError::InvalidParameter {
                name: "colors".to_string(),
                reason: format!(
                    "{} categories exceed the {}-color palette; configure colors explicitly",
                    categories.len(),
                    CATEGORY20.len()
                ),
            });
        }
        Ok(categories
            .iter()
            .zip(CATEGORY20.iter())
            .map(|(c, color)| (c.as_ref().to_string(), color.to_string()))
            .collect())
    }

    pub fn insert(&mut self, category: impl Into<String>, color: impl Into<String>) {
        self.0.insert(category.into(), color.into());
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.0.get(category).map(String::as_str)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.contains_key(category)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ColorMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ColorMap(iter.into_iter().collect())
    }
}

/// Cluster label -> marker shape. Every marker appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerMap(IndexMap<usize, Marker>);

impl MarkerMap {
    /// Markers indexed by cluster label: `markers[i]` is the shape of cluster `i`.
    ///
    /// Duplicate markers are rejected.
    pub fn from_markers(markers: &[Marker]) -> AnalysisResult<Self> {
        let mut map = IndexMap::with_capacity(markers.len());
        for (label, &marker) in markers.iter().enumerate() {
            if let Some((&other, _)) = map.iter().find(|(_, m)| **m == marker) {
                return Err(AnalysisError::InvalidParameter {
                    name: "markers".to_string(),
                    reason: format!(
                        "marker '{}' assigned to clusters {} and {}",
                        marker, other, label
                    ),
                });
            }
            map.insert(label, marker);
        }
        Ok(MarkerMap(map))
    }

    /// Default palette for `k` clusters. Clusters past the palette size get no
    /// marker and are rejected at encode time.
    pub fn default_for(k: usize) -> Self {
        MarkerMap(
            Marker::PALETTE
                .iter()
                .take(k)
                .enumerate()
                .map(|(label, &m)| (label, m))
                .collect(),
        )
    }

    pub fn get(&self, cluster: usize) -> Option<Marker> {
        self.0.get(&cluster).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Marker)> + '_ {
        self.0.iter().map(|(&k, &m)| (k, m))
    }
}
