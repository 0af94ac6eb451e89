//! Graphscape CLI: run the graph feature analysis from the command line

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use graphscape::{AnalysisConfig, AnalysisReport, CrossTab, InertiaPoint, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "graphscape", version, about = "Graph feature embedding and clustering")]
struct Cli {
    /// YAML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Output format for tables printed to stdout
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Debug-level logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed, cluster and plot a feature table
    Analyze {
        /// Input CSV
        input: PathBuf,

        /// HTML plot destination
        #[arg(long, short, default_value = "tsne.html")]
        output: PathBuf,

        /// Also write a graph_id,category,cluster,x,y table
        #[arg(long)]
        labels_out: Option<PathBuf>,

        /// Skip the inertia sweep
        #[arg(long)]
        no_sweep: bool,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Print inertia for a range of cluster counts
    Inertia {
        /// Input CSV
        input: PathBuf,

        #[arg(long)]
        k_min: Option<usize>,

        #[arg(long)]
        k_max: Option<usize>,

        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Args)]
struct Overrides {
    /// Number of clusters
    #[arg(long, short)]
    k: Option<usize>,

    /// Seed for both embedding and clustering
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    perplexity: Option<f64>,

    #[arg(long)]
    learning_rate: Option<f64>,

    /// Min-max scale features before embedding
    #[arg(long)]
    scale: bool,
}

impl Overrides {
    fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(k) = self.k {
            config.clustering.k = k;
        }
        if let Some(seed) = self.seed {
            config.embedding.seed = seed;
            config.clustering.seed = seed;
        }
        if let Some(perplexity) = self.perplexity {
            config.embedding.perplexity = perplexity;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.embedding.learning_rate = learning_rate;
        }
        if self.scale {
            config.preprocess.scaling = graphscape::Scaling::MinMax;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    match cli.command {
        Commands::Analyze {
            input,
            output,
            labels_out,
            no_sweep,
            overrides,
        } => {
            overrides.apply(&mut config);
            if no_sweep {
                config.selection.enabled = false;
            }
            let pipeline = Pipeline::new(config);
            let table = pipeline
                .load_table(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let report = pipeline.run(&table)?;

            report
                .write_outputs(&output, labels_out.as_deref())
                .context("writing results")?;
            print_report(&report, &cli.format)
        }
        Commands::Inertia {
            input,
            k_min,
            k_max,
            overrides,
        } => {
            overrides.apply(&mut config);
            if let Some(k_min) = k_min {
                config.selection.k_min = k_min;
            }
            if let Some(k_max) = k_max {
                config.selection.k_max = k_max;
            }
            let pipeline = Pipeline::new(config);
            let table = pipeline
                .load_table(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let sweep = pipeline.sweep(&table)?;
            print_inertia(&sweep, &cli.format)
        }
    }
}

fn print_report(report: &AnalysisReport, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "graphs": report.records.len(),
                "k": report.clustering.k(),
                "inertia": report.clustering.inertia,
                "iterations": report.clustering.iterations,
                "converged": report.clustering.converged,
                "cluster_sizes": report.clustering.cluster_sizes(),
                "empty_clusters": report.clustering.empty_clusters,
                "purity": report.crosstab.purity(),
                "crosstab": report.crosstab.cells(),
                "sweep": report.inertia,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Table => {
            if let Some(sweep) = &report.inertia {
                print_inertia(sweep, &OutputFormat::Table)?;
            }
            println!("{}", crosstab_table(&report.crosstab));
            println!(
                "{} graph(s), k={}, inertia {:.4}, purity {:.3}",
                report.records.len(),
                report.clustering.k(),
                report.clustering.inertia,
                report.crosstab.purity()
            );
            if !report.clustering.empty_clusters.is_empty() {
                println!("Empty clusters: {:?}", report.clustering.empty_clusters);
            }
        }
    }
    Ok(())
}

fn print_inertia(sweep: &[InertiaPoint], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(sweep)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["k", "inertia", ""]);
            for point in sweep {
                table.add_row(vec![
                    point.k.to_string(),
                    format!("{:.4}", point.inertia),
                    if point.regression { "increased".to_string() } else { String::new() },
                ]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}

fn crosstab_table(crosstab: &CrossTab) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["category".to_string()];
    header.extend((0..crosstab.num_clusters()).map(|c| c.to_string()));
    table.set_header(header);
    for category in crosstab.categories() {
        let mut row = vec![category.clone()];
        row.extend(crosstab.row(category).into_iter().map(|n| n.to_string()));
        table.add_row(row);
    }
    let mut totals = vec!["total".to_string()];
    totals.extend(crosstab.column_totals().into_iter().map(|n| n.to_string()));
    table.add_row(totals);
    table
}
