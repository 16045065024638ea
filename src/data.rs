//! Row sources: JSON files, directories of JSON files, HTTP endpoints, and
//! the built-in sample. Also owns the on-disk locations used by the app.

use anyhow::Result;
use serde::Serialize;
use serde_json::{Value, json};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Keys under which an object wraps its row array, checked in order.
pub const ROW_ARRAY_KEYS: &[&str] = &["data", "rows", "result"];

/// File name used by the Export bulk action.
pub const EXPORT_FILE_NAME: &str = "selection.json";

/// File name of the application log.
pub const LOG_FILE_NAME: &str = "rowsel.log";

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "rowsel", "rowsel")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
}

pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

/// Extracts the row items from a parsed document.
///
/// Accepts a bare array, or an object holding an array under `data`, `rows`
/// or `result` (the last covers JSON-RPC responses). `result` may itself be
/// such a wrapper. Any other object is a single row.
pub fn rows_from_document(document: Value) -> Vec<Value> {
    match document {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in ROW_ARRAY_KEYS {
                match map.remove(*key) {
                    Some(Value::Array(items)) => return items,
                    Some(inner @ Value::Object(_)) if *key == "result" => {
                        return rows_from_document(inner);
                    }
                    Some(other) => {
                        map.insert((*key).to_string(), other);
                    }
                    None => {}
                }
            }
            vec![Value::Object(map)]
        }
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    }
}

pub fn load_rows_from_file(file_path: &str) -> Result<Vec<Value>> {
    if !Path::new(file_path).exists() {
        anyhow::bail!("File not found: {}", file_path);
    }
    let file = fs::File::open(file_path)?;
    let reader = io::BufReader::new(file);
    let document: Value = serde_json::from_reader(reader)?;
    Ok(rows_from_document(document))
}

/// Loads rows from every `.json` file under `source_dir`, in path order.
///
/// Files that fail to read or parse are skipped and reported in `warnings`.
pub fn load_rows_from_dir(source_dir: &str, warnings: &mut Vec<String>) -> Result<Vec<Value>> {
    let path = Path::new(source_dir);
    if !path.exists() {
        anyhow::bail!("Source directory does not exist: {}", source_dir);
    }
    if !path.is_dir() {
        anyhow::bail!("Source path is not a directory: {}", source_dir);
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warnings.push(format!("Skipping unreadable entry: {}", err));
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut rows = Vec::new();
    for file in files {
        let parsed = fs::read_to_string(&file)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str::<Value>(&content).map_err(Into::into));
        match parsed {
            Ok(document) => rows.extend(rows_from_document(document)),
            Err(err) => {
                log::warn!("skipping {}: {}", file.display(), err);
                warnings.push(format!("{}: {}", file.display(), err));
            }
        }
    }
    Ok(rows)
}

/// Fetches rows from an HTTP endpoint returning JSON.
pub fn fetch_rows(url: &str) -> Result<Vec<Value>> {
    let client = reqwest::blocking::Client::builder().build()?;
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        anyhow::bail!("Failed to fetch {}: {}", url, response.status());
    }
    let body = response.text()?;
    let document: Value = serde_json::from_str(&body)?;
    Ok(rows_from_document(document))
}

/// On-disk shape of an export. `rows` is one of [`ROW_ARRAY_KEYS`], so an
/// export can be loaded back with `--file`.
#[derive(Serialize)]
struct SelectionExport<'a> {
    count: usize,
    rows: &'a [Value],
}

/// Writes `items` as pretty JSON to `dir/selection.json`.
pub fn export_items(dir: &Path, items: &[Value]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILE_NAME);
    let export = SelectionExport {
        count: items.len(),
        rows: items,
    };
    let content = serde_json::to_string_pretty(&export)?;
    fs::write(&path, content)?;
    Ok(path)
}

/// Validator rows shown when no source is given.
pub fn sample_rows() -> Vec<Value> {
    vec![
        json!({"id": "validator-01", "moniker": "aurora", "stake": 182000, "uptime": 99.98, "online": true}),
        json!({"id": "validator-02", "moniker": "basalt", "stake": 96500, "uptime": 99.71, "online": true}),
        json!({"id": "validator-03", "moniker": "cinder", "stake": 54000, "uptime": 87.20, "online": false}),
        json!({"id": "validator-04", "moniker": "drift", "stake": 231400, "uptime": 99.99, "online": true}),
        json!({"id": "validator-05", "moniker": "ember", "stake": 12000, "uptime": 64.05, "online": false}),
        json!({"id": "validator-06", "moniker": "fjord", "stake": 78800, "uptime": 98.40, "online": true}),
        json!({"id": "validator-07", "moniker": "glacier", "stake": 143250, "uptime": 99.12, "online": true}),
        json!({"moniker": "unregistered", "stake": 0, "uptime": 0.0, "online": false}),
    ]
}
