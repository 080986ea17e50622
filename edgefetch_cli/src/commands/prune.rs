use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use edgefetch_lib::prune::{prune_standalone, PruneOptions};

use crate::output::{print_json, print_prune_markdown, print_prune_table, OutputFormat};

#[derive(Args)]
pub struct PruneArgs {
    /// Project root containing .next/standalone
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Report what would be removed without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Package to remove from node_modules (repeatable; defaults to sharp and typescript)
    #[arg(long = "package")]
    pub packages: Vec<String>,
}

pub fn run(args: &PruneArgs, format: &OutputFormat) -> Result<()> {
    let mut opts = PruneOptions::for_project(&args.root).with_dry_run(args.dry_run);
    if !args.packages.is_empty() {
        opts = opts.with_packages(args.packages.clone());
    }

    let report = prune_standalone(&opts)?;

    if report.is_empty() {
        eprintln!("Nothing to prune under {}", opts.standalone_dir.display());
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_prune_table(&report),
        OutputFormat::Json => print_json(&report),
        OutputFormat::Markdown => print_prune_markdown(&report),
    }

    Ok(())
}
