//! CensusAlign CLI
//!
//! Fetches source datasets, tabulates precinct votes onto census geography,
//! and builds dual graphs for districting analysis.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use censusalign::{
    Blockify, Catalog, Contiguity, Cultivate, Harvest, Level, ManualEdge, TallyRow,
};

/// CensusAlign - census/precinct alignment for districting analysis
#[derive(Parser, Debug)]
#[command(name = "censusalign")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download all datasets for a vintage and store them locally
    Fetch {
        /// Election year (bundled catalogs only)
        #[arg(long, default_value_t = 2022)]
        year: u16,

        /// Directory to store the datasets in
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Aggregate precinct votes to census geography from local files
    Tabulate {
        /// Statement-of-vote CSV/TXT file
        #[arg(long)]
        election_file: PathBuf,

        /// Precinct-to-block conversion CSV file
        #[arg(long)]
        conversion_file: PathBuf,

        /// Contest name from the catalog
        #[arg(long, default_value = "governor")]
        election: String,

        /// Aggregation level: block, blockgroup, tract, or county
        #[arg(long, default_value = "blockgroup")]
        level: Level,

        /// Election year (selects the catalog's contest columns)
        #[arg(long, default_value_t = 2022)]
        year: u16,

        /// Output CSV path
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Build the dual graph and write node-link JSON
    Graph {
        /// Election year
        #[arg(long, default_value_t = 2022)]
        year: u16,

        /// Contest name from the catalog
        #[arg(long, default_value = "governor")]
        election: String,

        /// Run offline from a directory written by `fetch`
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Contiguity rule: rook or queen
        #[arg(long, default_value_t = Contiguity::Rook)]
        contiguity: Contiguity,

        /// Extra manual edges (JSON array of {from, to, note})
        #[arg(long)]
        edges: Option<PathBuf>,

        /// Output JSON path
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fetch { year, out } => fetch(year, &out).await,
        Command::Tabulate {
            election_file,
            conversion_file,
            election,
            level,
            year,
            out,
        } => tabulate(&election_file, &conversion_file, &election, level, year, &out),
        Command::Graph {
            year,
            election,
            data_dir,
            contiguity,
            edges,
            out,
        } => graph(year, &election, data_dir.as_deref(), contiguity, edges.as_deref(), &out).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn fetch(year: u16, out: &Path) -> Result<()> {
    let harvest = Harvest::new(year)?;
    harvest
        .fetch_and_store(out)
        .await
        .with_context(|| format!("fetching datasets for {year}"))?;
    println!("stored {year} datasets in {}", out.display());
    Ok(())
}

fn tabulate(
    election_file: &Path,
    conversion_file: &Path,
    election: &str,
    level: Level,
    year: u16,
    out: &Path,
) -> Result<()> {
    let catalog = Catalog::for_year(year)?;
    let columns = catalog.election(election)?;

    let blockify = Blockify::from_files(
        election_file,
        conversion_file,
        &columns.dem_column,
        &columns.rep_column,
    )
    .context("loading election and conversion data")?;
    let rows = blockify.rollup(level)?;

    write_rollup_csv(&rows, out).context("writing rollup CSV")?;
    println!("wrote {} {level} rows to {}", rows.len(), out.display());
    Ok(())
}

async fn graph(
    year: u16,
    election: &str,
    data_dir: Option<&Path>,
    contiguity: Contiguity,
    edges: Option<&Path>,
    out: &Path,
) -> Result<()> {
    let cultivate = match data_dir {
        Some(dir) => Cultivate::from_local(dir, year, election)
            .with_context(|| format!("loading stored datasets from {}", dir.display()))?,
        None => Cultivate::new(year, election).await?,
    };

    let extra_edges = match edges {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading manual edges from {}", path.display()))?;
            serde_json::from_str::<Vec<ManualEdge>>(&json).context("parsing manual edges")?
        }
        None => Vec::new(),
    };

    let (graph, stats) = cultivate.graphify_with_edges(contiguity, extra_edges)?;
    graph.write_json_file(out)?;

    if stats.isolated_nodes > 0 {
        info!(
            isolated = stats.isolated_nodes,
            "some units are unreachable; the sampler will reject them"
        );
    }
    println!(
        "wrote graph with {} nodes, {} spatial edges, {} manual edges to {}",
        stats.nodes,
        stats.spatial_edges,
        stats.manual_edges_added,
        out.display()
    );
    Ok(())
}

fn write_rollup_csv(rows: &[TallyRow], out: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(out)?;
    writer.write_record(["geoid", "total_vote", "dem_vote", "rep_vote"])?;
    for row in rows {
        let total = row.votes.total().to_string();
        let dem = row.votes.dem.to_string();
        let rep = row.votes.rep.to_string();
        writer.write_record([row.geoid.as_str(), &total, &dem, &rep])?;
    }
    writer.flush()?;
    Ok(())
}
