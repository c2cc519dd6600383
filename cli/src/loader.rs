use anyhow::{bail, Context, Result};
use recsearch_core::{parse_records, Record};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Load records from a `.json` / `.jsonl` file, or from every such file under
/// a directory (visited in sorted path order so document ids are stable).
pub fn load_records(input: &Path) -> Result<Vec<Record>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("input path {} does not exist", input.display());
    }

    let mut records = Vec::new();
    for file in files {
        let mut batch = if extension(&file) == Some("jsonl") { read_jsonl(&file)? } else { read_json(&file)? };
        tracing::debug!(file = %file.display(), count = batch.len(), "loaded records");
        records.append(&mut batch);
    }
    Ok(records)
}

fn extension(p: &Path) -> Option<&str> { p.extension().and_then(|s| s.to_str()) }

fn read_jsonl(file: &Path) -> Result<Vec<Record>> {
    let reader = BufReader::new(File::open(file)?);
    let mut records = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let record: Record = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: not a JSON object", file.display(), lineno + 1))?;
        records.push(record);
    }
    Ok(records)
}

fn read_json(file: &Path) -> Result<Vec<Record>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader).with_context(|| format!("reading {}", file.display()))?;
    let json = match json {
        obj @ serde_json::Value::Object(_) => serde_json::Value::Array(vec![obj]),
        other => other,
    };
    parse_records(json).with_context(|| format!("reading {}", file.display()))
}
