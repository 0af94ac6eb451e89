//! End-to-end analysis run
//!
//! validate -> scale -> embed -> inertia sweep -> cluster -> cross-tabulate ->
//! encode -> render. Stages run strictly in sequence and each one consumes the
//! previous stage's output. Nothing is written to disk until the report exists,
//! so a failure at any stage leaves no partial plot behind.

use crate::analysis::{
    cluster, cross_tab, embed, sweep_inertia, Clustering, CrossTab, EmbeddedPoint, InertiaPoint,
};
use crate::config::{AnalysisConfig, Scaling};
use crate::encode::{encode, VisualRecord};
use crate::error::AnalysisResult;
use crate::export;
use crate::render::render_html;
use crate::table::{load_csv, FeatureTable};
use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub points: Vec<EmbeddedPoint>,
    /// Present when the inertia sweep is enabled
    pub inertia: Option<Vec<InertiaPoint>>,
    pub clustering: Clustering,
    pub crosstab: CrossTab,
    pub records: Vec<VisualRecord>,
    pub html: String,
}

impl AnalysisReport {
    pub fn write_html<P: AsRef<Path>>(&self, path: P) -> AnalysisResult<()> {
        std::fs::write(path, &self.html)?;
        Ok(())
    }

    pub fn write_labels_csv<P: AsRef<Path>>(&self, path: P) -> AnalysisResult<()> {
        export::write_labels_csv(path, &self.records)
    }

    /// Write the label table (if requested) and then the plot.
    ///
    /// The plot goes last, so a failed label write leaves no plot behind.
    pub fn write_outputs(
        &self,
        html_path: &Path,
        labels_path: Option<&Path>,
    ) -> AnalysisResult<()> {
        if let Some(labels_path) = labels_path {
            self.write_labels_csv(labels_path)?;
            info!("Labels written to {}", labels_path.display());
        }
        self.write_html(html_path)?;
        info!("Plot written to {}", html_path.display());
        Ok(())
    }
}

/// Configured analysis pipeline
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load a feature table using the configured input schema
    pub fn load_table<P: AsRef<Path>>(&self, path: P) -> AnalysisResult<FeatureTable> {
        load_csv(path, &self.config.input)
    }

    /// Run every stage and build the report
    pub fn run(&self, table: &FeatureTable) -> AnalysisResult<AnalysisReport> {
        let start = Instant::now();
        self.config.validate(table.len())?;

        let table = self.preprocess(table);
        let points = embed(&table, &self.config.embedding)?;

        let inertia = if self.config.selection.enabled {
            let k_range = self.config.selection.k_range(points.len())?;
            Some(sweep_inertia(&points, &k_range, &self.config.clustering)?)
        } else {
            None
        };

        let clustering = cluster(&points, &self.config.clustering)?;
        let categories = table.categories();
        let crosstab =
            cross_tab(&categories, &clustering.assignments)?.with_num_clusters(clustering.k());

        let color_map = self.config.encoding.color_map(&table.distinct_categories())?;
        let marker_map = self.config.encoding.marker_map(clustering.k())?;
        let records = encode(
            &points,
            &categories,
            &clustering.assignments,
            &color_map,
            &marker_map,
        )?;

        let html = render_html(&records, &clustering.centroids, &self.config.plot);

        info!(
            "Analysis of {} graphs finished in {:?} (k={}, purity {:.3})",
            records.len(),
            start.elapsed(),
            clustering.k(),
            crosstab.purity()
        );

        Ok(AnalysisReport {
            points,
            inertia,
            clustering,
            crosstab,
            records,
            html,
        })
    }

    /// Embed and sweep only, for choosing k
    pub fn sweep(&self, table: &FeatureTable) -> AnalysisResult<Vec<InertiaPoint>> {
        self.config.embedding.validate()?;
        let k_range = self.config.selection.k_range(table.len())?;
        let table = self.preprocess(table);
        let points = embed(&table, &self.config.embedding)?;
        sweep_inertia(&points, &k_range, &self.config.clustering)
    }

    fn preprocess<'a>(&self, table: &'a FeatureTable) -> Cow<'a, FeatureTable> {
        match self.config.preprocess.scaling {
            Scaling::None => Cow::Borrowed(table),
            Scaling::MinMax => {
                info!("Applying min-max scaling to {} features", table.dim());
                Cow::Owned(table.min_max_scaled())
            }
        }
    }
}
