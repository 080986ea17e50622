mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use edgefetch_lib::{Client, ClientConfig};

use crate::commands::request::Verb;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "edgefetch")]
#[command(about = "JSON HTTP client with a query-string fallback for hosts that drop request bodies")]
struct Cli {
    /// Output format: table, json or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Base URL for requests (overrides EDGEFETCH_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Send POST/PUT payloads as query parameters (overrides EDGEFETCH_EDGE_COMPAT)
    #[arg(long, global = true)]
    edge_compat: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get(commands::request::RequestArgs),
    /// Send a DELETE request
    Delete(commands::request::RequestArgs),
    /// Send a POST request
    Post(commands::request::RequestArgs),
    /// Send a PUT request
    Put(commands::request::RequestArgs),
    /// Check whether request bodies survive the trip to a probe endpoint
    Probe(commands::probe::ProbeArgs),
    /// Serve the probe endpoint
    ServeProbe(commands::probe::ServeArgs),
    /// Remove unneeded packages and engines from a standalone build
    Prune(commands::prune::PruneArgs),
}

fn resolve_config(base_url: Option<&str>, edge_compat: bool) -> ClientConfig {
    let env = ClientConfig::from_env();
    let config = match base_url {
        Some(url) => ClientConfig::new(url)
            .with_edge_compat(env.edge_compat)
            .with_max_url_len(env.max_url_len),
        None => env,
    };
    if edge_compat {
        config.with_edge_compat(true)
    } else {
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("edgefetch=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "markdown" | "md" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let config = resolve_config(cli.base_url.as_deref(), cli.edge_compat);

    match &cli.command {
        Commands::Get(args) => run_request(Verb::Get, args, config, &format).await?,
        Commands::Delete(args) => run_request(Verb::Delete, args, config, &format).await?,
        Commands::Post(args) => run_request(Verb::Post, args, config, &format).await?,
        Commands::Put(args) => run_request(Verb::Put, args, config, &format).await?,
        Commands::Probe(args) => commands::probe::run(args, &config, &format).await?,
        Commands::ServeProbe(args) => commands::probe::serve(args).await?,
        Commands::Prune(args) => commands::prune::run(args, &format)?,
    }

    Ok(())
}

async fn run_request(
    verb: Verb,
    args: &commands::request::RequestArgs,
    config: ClientConfig,
    format: &OutputFormat,
) -> Result<()> {
    let client = Client::new(config)?;
    commands::request::run(verb, args, &client, format).await
}
