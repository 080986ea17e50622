use anyhow::Result;
use clap::Args;
use edgefetch_lib::validation;
use edgefetch_lib::{Client, FetchResult};

use crate::output::{print_fetch_markdown, print_fetch_table, print_json, OutputFormat};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Get,
    Delete,
    Post,
    Put,
}

#[derive(Args)]
pub struct RequestArgs {
    /// Request path relative to the base URL (e.g. /api/websites)
    pub path: String,

    /// Parameter as key=value; values that parse as JSON are sent as JSON (repeatable)
    #[arg(long = "param", short = 'p')]
    pub params: Vec<String>,

    /// Parameters as a JSON object; --param values override its keys
    #[arg(long)]
    pub json: Option<String>,

    /// Extra header as "Name: value"; replaces defaults with the same name (repeatable)
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,
}

pub async fn run(verb: Verb, args: &RequestArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let path = validation::validate_path(&args.path)?;
    let params = validation::build_params(args.json.as_deref(), &args.params)?;
    let headers = validation::parse_headers(&args.headers)?;

    let result: FetchResult = match verb {
        Verb::Get => client.get(&path, &params, &headers).await?,
        Verb::Delete => client.delete(&path, &params, &headers).await?,
        Verb::Post => client.post(&path, &params, &headers).await?,
        Verb::Put => client.put(&path, &params, &headers).await?,
    };

    if !result.ok() {
        eprintln!("Request returned status {}", result.status());
    }

    match format {
        OutputFormat::Table => print_fetch_table(&result),
        OutputFormat::Json => print_json(&result),
        OutputFormat::Markdown => print_fetch_markdown(&result),
    }

    Ok(())
}
