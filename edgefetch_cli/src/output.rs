use edgefetch_lib::probe::{ProbeComparison, ProbeReport};
use edgefetch_lib::{FetchResult, PruneReport};
use serde::Serialize;
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Markdown,
}

const PREVIEW_WIDTH: usize = 80;

#[derive(Tabled, Serialize)]
struct FieldRow {
    #[tabled(rename = "Field")]
    #[serde(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Tabled, Serialize)]
struct ProbeRow {
    #[tabled(rename = "Encoding")]
    #[serde(rename = "Encoding")]
    encoding: String,
    #[tabled(rename = "Result")]
    #[serde(rename = "Result")]
    result: String,
    #[tabled(rename = "Source")]
    #[serde(rename = "Source")]
    source: String,
    #[tabled(rename = "Length")]
    #[serde(rename = "Length")]
    length: usize,
    #[tabled(rename = "Preview")]
    #[serde(rename = "Preview")]
    preview: String,
}

#[derive(Tabled, Serialize)]
struct PruneRow {
    #[tabled(rename = "Removed")]
    #[serde(rename = "Removed")]
    path: String,
}

fn build_fetch_rows(result: &FetchResult) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow {
            field: "ok".to_string(),
            value: result.ok().to_string(),
        },
        FieldRow {
            field: "status".to_string(),
            value: result.status().to_string(),
        },
    ];
    let data = match result {
        FetchResult::Success { data, .. } => data,
        FetchResult::Failure(failure) => &failure.data,
    };
    rows.push(FieldRow {
        field: "data".to_string(),
        value: preview_json(data),
    });
    if let Some(resp) = result.error() {
        rows.push(FieldRow {
            field: "error".to_string(),
            value: match &resp.error.code {
                Some(code) => format!("{} ({})", resp.error.message, code),
                None => resp.error.message.clone(),
            },
        });
    }
    rows
}

fn probe_row(encoding: &str, report: &ProbeReport) -> ProbeRow {
    ProbeRow {
        encoding: encoding.to_string(),
        result: enum_label(&report.result),
        source: enum_label(&report.source),
        length: report.body_length,
        preview: truncate(&report.body_preview, PREVIEW_WIDTH),
    }
}

fn build_probe_rows(comparison: &ProbeComparison) -> Vec<ProbeRow> {
    vec![
        probe_row("body", &comparison.body),
        probe_row("query", &comparison.query),
    ]
}

fn build_prune_rows(report: &PruneReport) -> Vec<PruneRow> {
    report
        .removed
        .iter()
        .map(|p| PruneRow {
            path: p.display().to_string(),
        })
        .collect()
}

/// Wire name of a unit enum variant, e.g. `PayloadSource::Query` -> `query`.
fn enum_label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(s)) => s,
        _ => String::new(),
    }
}

fn preview_json(value: &Value) -> String {
    truncate(&value.to_string(), PREVIEW_WIDTH)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

// -- Table output --

pub fn print_fetch_table(result: &FetchResult) {
    println!("{}", Table::new(build_fetch_rows(result)));
}

pub fn print_probe_table(comparison: &ProbeComparison) {
    println!("{}", Table::new(build_probe_rows(comparison)));
}

pub fn print_prune_table(report: &PruneReport) {
    if report.dry_run {
        eprintln!("Dry run: nothing was deleted");
    }
    println!("{}", Table::new(build_prune_rows(report)));
}

// -- Markdown output --

pub fn print_fetch_markdown(result: &FetchResult) {
    let mut table = Table::new(build_fetch_rows(result));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_probe_markdown(comparison: &ProbeComparison) {
    let mut table = Table::new(build_probe_rows(comparison));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_prune_markdown(report: &PruneReport) {
    let mut table = Table::new(build_prune_rows(report));
    table.with(Style::markdown());
    println!("{}", table);
}

// -- JSON output --

pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
