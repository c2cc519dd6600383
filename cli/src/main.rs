use anyhow::Result;
use clap::{Parser, Subcommand};
use recsearch_core::{FieldValue, IndexConfig, Record, SearchHit, SearchIndex, SearchParams};
use serde::Deserialize;
use serde_json::json;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

mod loader;

use loader::load_records;

#[derive(Parser)]
#[command(name = "recsearch")]
#[command(about = "Rank structured records against free-text queries with TF-IDF", long_about = None)]
struct Cli {
    /// Minimum number of documents a term must appear in
    #[arg(long, default_value_t = 1, global = true)]
    min_df: u32,
    /// Cap on vocabulary size, most frequent terms kept
    #[arg(long, global = true)]
    max_features: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read {data, query, limit, min_score} JSON and print ranked results as JSON
    Query {
        /// Read the request from this file instead of stdin
        #[arg(long)]
        request: Option<PathBuf>,
    },
    /// Answer queries typed line by line
    Demo {
        /// Record file or directory of .json/.jsonl files; built-in sample if omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// Results per query
        #[arg(long, default_value_t = 3)]
        k: usize,
    },
    /// Index records and print the ingest report and index statistics
    Stats {
        /// Record file or directory of .json/.jsonl files
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
struct ApiRequest {
    #[serde(default)]
    data: Vec<Record>,
    #[serde(default)]
    query: String,
    #[serde(flatten)]
    params: SearchParams,
}

fn main() -> Result<ExitCode> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let config = IndexConfig { min_df: cli.min_df, max_features: cli.max_features };

    match cli.command {
        Commands::Query { request } => {
            let input = match request {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let (output, ok) = run_api(&input, config);
            println!("{output}");
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Demo { input, k } => {
            let records = match input {
                Some(path) => load_records(&path)?,
                None => sample_records(),
            };
            let mut index = SearchIndex::new(config);
            let stdin = io::stdin();
            run_demo(&mut index, records, k, stdin.lock(), io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Stats { input } => {
            let (output, ok) = run_stats(&input, config);
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}

/// One-shot request/response: ingest `data`, search `query`. Returns the JSON
/// to print and whether the call succeeded.
fn run_api(input: &str, config: IndexConfig) -> (serde_json::Value, bool) {
    let request: ApiRequest = match serde_json::from_str(input) {
        Ok(r) => r,
        Err(e) => return (json!({ "error": format!("Invalid JSON input: {e}") }), false),
    };

    let mut index = SearchIndex::new(config);
    let report = index.ingest(request.data);
    if !report.is_success() {
        return (json!({ "error": report.message }), false);
    }

    match index.search(&request.query, &request.params) {
        Ok(hits) => match serde_json::to_value(&hits) {
            Ok(v) => (v, true),
            Err(e) => (json!({ "error": format!("Search error: {e}") }), false),
        },
        Err(e) => (json!({ "error": format!("Search error: {e}") }), false),
    }
}

/// Ingest the records under `input` and describe the result: the ingest
/// report plus index statistics, or `{"error": ...}` when loading fails.
fn run_stats(input: &Path, config: IndexConfig) -> (serde_json::Value, bool) {
    let records = match load_records(input) {
        Ok(r) => r,
        Err(e) => return (json!({ "error": format!("{e:#}") }), false),
    };
    let mut index = SearchIndex::new(config);
    let report = index.ingest(records);
    let ok = report.is_success();
    (json!({ "ingest": report, "stats": index.stats() }), ok)
}

fn run_demo<R: BufRead, W: Write>(index: &mut SearchIndex, records: Vec<Record>, k: usize, input: R, mut out: W) -> Result<()> {
    let report = index.ingest(records);
    writeln!(out, "=== Record Search Demo ===")?;
    writeln!(out, "Status: {}", report.message)?;
    if !report.is_success() {
        return Ok(());
    }
    writeln!(out, "Vocabulary size: {}", report.vocabulary_size.unwrap_or(0))?;
    writeln!(out, "\nType your query (or 'exit' to quit):\n")?;

    let params = SearchParams::new(k.max(1), 0.0);
    for line in input.lines() {
        let q = line?;
        let q = q.trim();
        if matches!(q.to_lowercase().as_str(), "exit" | "quit" | "q") { break; }
        if q.is_empty() { continue; }

        match index.search(q, &params) {
            Ok(hits) if hits.is_empty() => writeln!(out, "No results found.\n")?,
            Ok(hits) => {
                writeln!(out, "\nTop results:")?;
                for hit in &hits {
                    write_hit(&mut out, hit)?;
                }
            }
            Err(e) => writeln!(out, "Error: {e}\n")?,
        }
    }
    Ok(())
}

fn write_hit<W: Write>(out: &mut W, hit: &SearchHit) -> io::Result<()> {
    let record = &hit.record;
    writeln!(out, "[Rank {} | Score: {:.3}]", hit.rank, hit.score)?;
    writeln!(out, "  Title: {}", field_text(record.get("title")))?;
    let body: String = field_text(record.get("body")).chars().take(80).collect();
    writeln!(out, "  Body: {body}...")?;
    let tags = match record.get("tags") {
        Some(FieldValue::List(items)) => items.iter().map(|t| field_text(Some(t))).collect::<Vec<_>>().join(", "),
        other => field_text(other),
    };
    writeln!(out, "  Tags: {tags}\n")
}

fn field_text(value: Option<&FieldValue>) -> String {
    match value {
        None | Some(FieldValue::Null) => String::new(),
        Some(FieldValue::Text(s)) => s.clone(),
        Some(other) => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn sample_records() -> Vec<Record> {
    let sample = [
        (1, "Refund Policy", "Items can be returned within 30 days for a full refund. Original packaging required.", vec!["refund", "returns", "policy"]),
        (2, "Privacy Statement", "We never share your personal data with third parties. Your information is encrypted and secure.", vec!["privacy", "security", "data-protection"]),
        (3, "Shipping Information", "Worldwide delivery with tracking number. Express shipping available for urgent orders.", vec!["shipping", "delivery", "international"]),
        (4, "AI Search Project", "An open-source system for semantic search on structured data using TF-IDF and cosine similarity.", vec!["AI", "search", "open-source", "machine-learning"]),
        (5, "Customer Support", "24/7 customer support available via email, chat, and phone. Average response time: 2 hours.", vec!["support", "help", "customer-service"]),
    ];
    sample
        .into_iter()
        .map(|(id, title, body, tags)| Record::new().with("id", id).with("title", title).with("body", body).with("tags", tags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_mode_returns_ranked_results() {
        let request = json!({
            "data": [
                {"title": "Refund Policy", "body": "Money back within 30 days", "tags": ["refund"]},
                {"title": "Shipping", "body": "Worldwide delivery"}
            ],
            "query": "refund",
            "limit": 1
        });
        let (out, ok) = run_api(&request.to_string(), IndexConfig::default());
        assert!(ok);
        let arr = out.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["rank"], 1);
        assert_eq!(arr[0]["record"]["title"], "Refund Policy");
    }

    #[test]
    fn api_mode_reports_errors() {
        let (out, ok) = run_api("{not json", IndexConfig::default());
        assert!(!ok);
        assert!(out["error"].as_str().unwrap().starts_with("Invalid JSON input"));

        let (out, ok) = run_api(r#"{"data": [], "query": "x"}"#, IndexConfig::default());
        assert!(!ok);
        assert_eq!(out["error"], "No records provided");

        let (out, ok) = run_api(r#"{"data": [{"title": "Rust"}], "query": "  "}"#, IndexConfig::default());
        assert!(!ok);
        assert_eq!(out["error"], "Search error: Query cannot be empty");
    }

    #[test]
    fn stats_reports_fitted_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), r#"[{"title": "Refund Policy", "body": "Money back"}]"#).unwrap();
        std::fs::write(dir.path().join("b.jsonl"), "{\"title\": \"Shipping\", \"body\": \"Worldwide delivery\"}\n").unwrap();

        let (out, ok) = run_stats(dir.path(), IndexConfig::default());
        assert!(ok);
        assert_eq!(out["ingest"]["status"], "success");
        assert_eq!(out["ingest"]["count"], 2);
        assert_eq!(out["stats"]["status"], "fitted");
        assert_eq!(out["stats"]["total_documents"], 2);
        assert_eq!(out["stats"]["matrix_shape"][0], 2);
    }

    #[test]
    fn stats_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let (out, ok) = run_stats(&dir.path().join("missing.json"), IndexConfig::default());
        assert!(!ok);
        assert!(out["error"].as_str().unwrap().contains("does not exist"));

        let file = dir.path().join("stop.json");
        std::fs::write(&file, r#"[{"title": "the and of"}]"#).unwrap();
        let (out, ok) = run_stats(&file, IndexConfig::default());
        assert!(!ok);
        assert_eq!(out["ingest"]["status"], "error");
        assert_eq!(out["stats"]["status"], "not_fitted");
    }

    #[test]
    fn demo_answers_until_exit() {
        let mut index = SearchIndex::default();
        let input = b"refund\n\nzzz_nothing\nexit\nshipping\n";
        let mut out = Vec::new();
        run_demo(&mut index, sample_records(), 3, &input[..], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Successfully indexed 5 records"));
        assert!(text.contains("[Rank 1 | Score:"));
        assert!(text.contains("Title: Refund Policy"));
        assert!(text.contains("No results found."));
        // nothing after "exit" is answered
        assert_eq!(text.matches("Top results:").count(), 1);
    }
}
