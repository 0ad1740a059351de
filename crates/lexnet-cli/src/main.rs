mod serve;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use lexnet_core::{
    BuilderRequest, Config, DataSource, MatchLogic, RankingMode, SearchField, Session, TimeScope,
};

use serve::ServeConfig;

#[derive(Parser)]
#[command(name = "lexnet")]
#[command(about = "Explore legal knowledge graphs across time scopes", long_about = None)]
struct Cli {
    /// Config file to use instead of ./lexnet.toml or the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset directory or base URL
    #[arg(long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the titles in the manifest
    Titles,
    /// Build a network around nodes matching the search terms
    Search {
        /// Title id to search
        title: String,
        /// Search terms
        #[arg(required = true)]
        terms: Vec<String>,
        /// Time scope (defaults to the configured scope)
        #[arg(long)]
        scope: Option<String>,
        /// Field to match against; repeat for several
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<SearchField>,
        /// Match nodes containing any term rather than all of them
        #[arg(long)]
        any: bool,
        /// Expansion depth
        #[arg(long)]
        depth: Option<usize>,
        /// Neighbours admitted per expanded node
        #[arg(long)]
        per_expansion: Option<usize>,
        /// Overall node cap
        #[arg(long)]
        max_nodes: Option<usize>,
        /// Ranking mode: global or subgraph
        #[arg(long, value_parser = parse_ranking)]
        ranking: Option<RankingMode>,
    },
    /// Show a node with its incoming and outgoing links
    Node {
        /// Title id
        title: String,
        /// Node id
        id: String,
        /// Time scope (defaults to the configured scope)
        #[arg(long)]
        scope: Option<String>,
    },
    /// Start the local JSON API
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Title to load at startup
        #[arg(long)]
        title: Option<String>,
        /// Open the API root in a browser
        #[arg(long)]
        open: bool,
    },
    /// Print a default config file, to save as lexnet.toml
    Config,
}

fn parse_field(s: &str) -> Result<SearchField, String> {
    SearchField::parse(s).ok_or_else(|| {
        format!("unknown field '{}' (text, full_name, display_label, definition, node_kind)", s)
    })
}

fn parse_ranking(s: &str) -> Result<RankingMode, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "global" => Ok(RankingMode::Global),
        "subgraph" | "local" => Ok(RankingMode::Subgraph),
        _ => Err(format!("unknown ranking mode '{}' (global, subgraph)", s)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(data) = cli.data {
        config.data.source = data;
    }

    match cli.command {
        Commands::Config => {
            print!("{}", Config::default_config_string());
        }
        Commands::Titles => {
            let session = Session::from_config(&config);
            for entry in session.titles().await? {
                match entry.label {
                    Some(label) => println!("{:>6}  {}", entry.id, label),
                    None => println!("{:>6}", entry.id),
                }
            }
        }
        Commands::Search {
            title,
            terms,
            scope,
            fields,
            any,
            depth,
            per_expansion,
            max_nodes,
            ranking,
        } => {
            let session = Session::from_config(&config);
            load_title(&session, &title).await?;
            if let Some(scope) = scope {
                session.switch_scope(scope).await?;
            }

            let mut request = BuilderRequest::from_config(&config.builder, terms);
            if !fields.is_empty() {
                request = request.with_fields(fields);
            }
            if any {
                request = request.with_logic(MatchLogic::Disjunctive);
            }
            if let Some(depth) = depth {
                request.expansion_depth = depth;
            }
            if let Some(per) = per_expansion {
                request.max_nodes_per_expansion = per;
            }
            if let Some(max) = max_nodes {
                request.max_total_nodes = max;
            }
            if let Some(ranking) = ranking {
                request.ranking = ranking;
            }

            let result = session
                .search(request)
                .await?
                .applied()
                .ok_or_else(|| eyre!("search was superseded"))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Node { title, id, scope } => {
            let session = Session::from_config(&config);
            load_title(&session, &title).await?;

            let scope = scope
                .map(TimeScope::new)
                .unwrap_or_else(|| config.scopes.default_scope());
            let detail = session.node_detail(&id, &scope).await;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        Commands::Serve { port, title, open } => {
            let serve_config = ServeConfig {
                port: port.unwrap_or(config.server.port),
                open_browser: open || config.server.open_browser,
                title,
            };
            serve::start_server(serve_config, config).await?;
        }
    }

    Ok(())
}

/// Load a title behind a spinner.
async fn load_title<S: DataSource>(session: &Session<S>, title: &str) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("Loading title {}...", title));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let loaded = session.load_title(title).await;
    spinner.finish_and_clear();

    loaded?;
    Ok(())
}
