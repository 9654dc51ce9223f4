//! # Prospector CLI
//!
//! Ask questions about a university prospectus.
//!
//! Usage:
//!   prospector init                              # Write a default config
//!   prospector ingest data/raw/prospectus.pdf    # Build the graph and the index
//!   prospector ask "Which Safety related programs are offered?"
//!   prospector serve --port 8000                 # Start the HTTP gateway

use anyhow::Result;
use clap::{Parser, Subcommand};
use prospector_agent::Orchestrator;
use prospector_core::config::{ProspectorConfig, expand_path};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "prospector",
    version,
    about = "🎓 Prospector - prospectus question answering"
)]
struct Cli {
    /// Config file (default: ~/.prospector/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway
    Serve {
        /// Port override
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ingest a document (default: [ingest] document_path)
    Ingest { path: Option<String> },
    /// Answer a question
    Ask {
        question: String,
        /// Generation endpoint override
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Raw vector search over the chunk index
    Search {
        query: String,
        #[arg(long, default_value = "10")]
        top_k: usize,
    },
    /// Show entity-graph facts for a query
    Graph { query: String },
    /// Show knowledge store sizes
    Stats,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(ProspectorConfig::default_path)
}

fn load_config(cli: &Cli) -> Result<ProspectorConfig> {
    let path = config_path(cli);
    let config = if path.exists() {
        ProspectorConfig::load_from(&path)?
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        ProspectorConfig::default()
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "prospector=debug,prospector_agent=debug,prospector_knowledge=debug,tower_http=debug"
    } else {
        "prospector=info,prospector_agent=info,prospector_knowledge=info,prospector_gateway=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    if let Command::Init { force } = cli.command {
        let path = config_path(&cli);
        if path.exists() && !force {
            println!("⚠️  Config already exists at {} (use --force to overwrite)", path.display());
            return Ok(());
        }
        ProspectorConfig::default().save_to(&path)?;
        println!("✅ Config written to {}", path.display());
        return Ok(());
    }

    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            println!("🎓 Prospector v{}", env!("CARGO_PKG_VERSION"));
            println!("   🌐 Gateway:   http://{}:{}", config.gateway.host, config.gateway.port);
            println!("   📂 Data Dir:  {}", config.data_path().display());
            println!("   🤖 Model:     {}", config.generation.model);
            println!();
            prospector_gateway::start(config).await?;
        }
        Command::Ingest { path } => {
            let path = path.unwrap_or_else(|| config.ingest.document_path.clone());
            let orchestrator = Orchestrator::from_config(config)?;
            println!("{}", orchestrator.ingest(&expand_path(&path)).await);
        }
        Command::Ask { question, api_url } => {
            let endpoint = api_url.unwrap_or_else(|| config.generation.endpoint.clone());
            let orchestrator = Orchestrator::from_config(config)?;
            println!("{}", orchestrator.answer(&question, &endpoint).await);
        }
        Command::Search { query, top_k } => {
            let orchestrator = Orchestrator::from_config(config)?;
            let results = orchestrator.search(&query, top_k).await?;
            if results.is_empty() {
                println!("No results (is the index built? run `prospector ingest`).");
            }
            for (i, chunk) in results.iter().enumerate() {
                println!("[{}] {}\n", i + 1, chunk);
            }
        }
        Command::Graph { query } => {
            let orchestrator = Orchestrator::from_config(config)?;
            let facts = orchestrator.graph_context(&query).await;
            if facts.is_empty() {
                println!("No known entity is mentioned in that query.");
            } else {
                println!("{facts}");
            }
        }
        Command::Stats => {
            let orchestrator = Orchestrator::from_config(config)?;
            let stats = orchestrator.stats().await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Init { .. } => {}
    }

    Ok(())
}
