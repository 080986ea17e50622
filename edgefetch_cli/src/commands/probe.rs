use std::net::SocketAddr;

use anyhow::Result;
use clap::Args;
use edgefetch_lib::probe::{self, PROBE_PATH};
use edgefetch_lib::{validation, ClientConfig};

use crate::output::{print_json, print_probe_markdown, print_probe_table, OutputFormat};

#[derive(Args)]
pub struct ProbeArgs {
    /// Probe endpoint path
    #[arg(long, default_value = PROBE_PATH)]
    pub path: String,

    /// Payload to send as a JSON object
    #[arg(long, default_value = r#"{"probe":true,"nested":{"n":1}}"#)]
    pub json: String,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,
}

pub async fn run(args: &ProbeArgs, config: &ClientConfig, format: &OutputFormat) -> Result<()> {
    let path = validation::validate_path(&args.path)?;
    let payload = validation::build_params(Some(&args.json), &[])?;

    let comparison = probe::compare(config, &path, &payload).await?;

    match format {
        OutputFormat::Table => print_probe_table(&comparison),
        OutputFormat::Json => print_json(&comparison),
        OutputFormat::Markdown => print_probe_markdown(&comparison),
    }

    if comparison.needs_edge_compat() {
        eprintln!("Request bodies are lost on this host; set EDGEFETCH_EDGE_COMPAT=1");
    } else if !comparison.body_delivered() {
        eprintln!("Neither encoding delivered the payload");
    }

    Ok(())
}

pub async fn serve(args: &ServeArgs) -> Result<()> {
    probe::serve(args.bind).await?;
    Ok(())
}
