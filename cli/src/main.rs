//! hetkg CLI: build the knowledge graph and run neighborhood queries against it

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use hetkg::graph::{NodeType, TypedGraph};
use hetkg::persistence::{GraphContext, GraphSource};
use hetkg::query::{degree_summary, DisplayQuota, QueryEngine, QueryOutcome, QueryRequest, SeedSet};
use hetkg::AppConfig;
use std::path::PathBuf;
use tracing::info;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "hetkg", version, about = "Heterogeneous knowledge-graph neighborhood queries")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "HETKG_CONFIG")]
    config: Option<PathBuf>,

    /// Tab-separated triples file (overrides the configuration)
    #[arg(long, global = true)]
    links: Option<PathBuf>,

    /// Cache directory (overrides the configuration)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Download the raw archive if neither cache nor triples are present
    #[arg(long, global = true)]
    fetch: bool,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

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
    /// Rebuild the graph from the triples file and refresh the cache
    Build {
        /// Keep raw relation labels instead of simplifying them
        #[arg(long)]
        raw_relations: bool,
    },
    /// Show graph statistics, or the degree breakdown of one node
    Stats {
        /// Node to inspect, as type=name (e.g. protein=P05091)
        #[arg(long)]
        node: Option<String>,
    },
    /// Extract the neighborhood of seed entities
    Query {
        /// Seeds as type=name1,name2 (repeatable)
        #[arg(long = "seed", required = true)]
        seeds: Vec<String>,

        /// Neighborhood depth
        #[arg(long)]
        depth: Option<usize>,

        /// Display quota as type=N, type=inf or type=-1 (repeatable, overrides configured caps)
        #[arg(long = "limit")]
        limits: Vec<String>,

        /// Results directory for triples.txt and entities.json
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Skip writing the report files
        #[arg(long)]
        no_report: bool,

        /// Write the display graph as JSON to this file
        #[arg(long)]
        display_out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_yaml_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(links) = cli.links {
        config.links_path = links;
    }
    if let Some(cache_dir) = cli.cache_dir {
        config.cache_dir = cache_dir;
    }

    match cli.command {
        Commands::Build { raw_relations } => {
            if raw_relations {
                config.simplify_relations = false;
            }
            if cli.fetch && !config.links_path.exists() {
                hetkg::persistence::fetch_archive(
                    &config.archive_url,
                    config.links_dir(),
                    config.fetch_timeout(),
                )
                .await?;
            }
            let build_config = config.clone();
            let context =
                tokio::task::spawn_blocking(move || GraphContext::build(&build_config)).await??;
            print_statistics(context.graph(), &cli.format)
        }
        Commands::Stats { node } => {
            let context = load(&config, cli.fetch).await?;
            match node {
                Some(spec) => print_degree(context.graph(), &spec, &cli.format),
                None => print_statistics(context.graph(), &cli.format),
            }
        }
        Commands::Query {
            seeds,
            depth,
            limits,
            results_dir,
            no_report,
            display_out,
        } => {
            let mut seed_set = SeedSet::new();
            for spec in &seeds {
                seed_set.insert_spec(spec)?;
            }
            let mut quota: DisplayQuota = config.display.clone();
            for spec in &limits {
                quota.insert_spec(spec)?;
            }
            let request = QueryRequest::new(seed_set, depth.unwrap_or(config.default_depth))
                .with_quota(quota);

            let context = load(&config, cli.fetch).await?;
            let outcome = QueryEngine::with_max_depth(config.max_depth)
                .execute(&request, context.graph())?;

            if !no_report {
                let dir = results_dir.unwrap_or_else(|| config.results_dir.clone());
                let triples = outcome.report.save(&dir)?;
                info!("Report written to {:?}", triples);
            }
            if let Some(path) = display_out {
                std::fs::write(&path, serde_json::to_vec_pretty(&outcome.display)?)?;
                info!("Display graph written to {:?}", path);
            }
            print_outcome(&outcome, &cli.format)
        }
    }
}

async fn load(config: &AppConfig, fetch: bool) -> CliResult<GraphContext> {
    let context = if fetch {
        GraphContext::prepare(config).await?
    } else {
        let config = config.clone();
        tokio::task::spawn_blocking(move || GraphContext::load_or_build(&config)).await??
    };
    if context.source() == GraphSource::Built {
        info!("Graph rebuilt from {:?}", config.links_path);
    }
    Ok(context)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn print_statistics(graph: &TypedGraph, format: &OutputFormat) -> CliResult<()> {
    let stats = graph.statistics();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Table => {
            let mut nodes = new_table(vec!["Node type", "Count"]);
            for (node_type, count) in &stats.nodes_by_type {
                nodes.add_row(vec![node_type.clone(), count.to_string()]);
            }
            println!("{}", nodes);

            let mut edges = new_table(vec!["Edge type", "Count"]);
            for (relation, count) in &stats.edges_by_relation {
                edges.add_row(vec![relation.clone(), count.to_string()]);
            }
            println!("{}", edges);
            println!("{} nodes, {} edges", stats.total_nodes, stats.total_edges);
        }
    }
    Ok(())
}

fn print_degree(graph: &TypedGraph, spec: &str, format: &OutputFormat) -> CliResult<()> {
    let (node_type, name) = spec
        .split_once('=')
        .ok_or_else(|| format!("expected type=name, got {:?}", spec))?;
    let degree = degree_summary(graph, &NodeType::new(node_type.trim()), name.trim())?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&degree)?);
        }
        OutputFormat::Table => {
            println!(
                "{} {} (id {}): out-degree {}, in-degree {}",
                degree.node_type, degree.name, degree.id, degree.total_out, degree.total_in
            );
            let mut table = new_table(vec!["Direction", "Edge type", "Count"]);
            for (relation, count) in &degree.out_by_relation {
                table.add_row(vec!["out".to_string(), relation.clone(), count.to_string()]);
            }
            for (relation, count) in &degree.in_by_relation {
                table.add_row(vec!["in".to_string(), relation.clone(), count.to_string()]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}

fn print_outcome(outcome: &QueryOutcome, format: &OutputFormat) -> CliResult<()> {
    let subgraph = outcome.subgraph.graph();
    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "nodes": subgraph.total_nodes(),
                "edges": subgraph.total_edges(),
                "statistics": subgraph.statistics(),
                "connectivity": outcome.connectivity.flatten(),
                "display": outcome.display,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["Seed", "Neighbor / edge type", "Count"]);
            for (seed, counts) in outcome.connectivity.flatten() {
                for (label, count) in counts {
                    table.add_row(vec![seed.clone(), label, count.to_string()]);
                }
            }
            println!("{}", table);

            let mut nodes = new_table(vec!["Node type", "In subgraph", "Shown"]);
            for (node_type, partition) in subgraph.partitions() {
                let shown = outcome.display.visible_ids(node_type).len();
                nodes.add_row(vec![
                    node_type.to_string(),
                    partition.len().to_string(),
                    shown.to_string(),
                ]);
            }
            println!("{}", nodes);
            println!(
                "Subgraph: {} nodes, {} edges ({} nodes, {} edges shown)",
                subgraph.total_nodes(),
                subgraph.total_edges(),
                outcome.display.nodes.len(),
                outcome.display.edges.len()
            );
        }
    }
    Ok(())
}
