// JSONL snapshot of the business collection: one record per line.

use domain::Business;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// Reads every parsable record from `path`. A missing file is an empty store;
/// unreadable lines are skipped with a warning.
pub async fn load(path: &Path) -> std::io::Result<Vec<Business>> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(file = ?path, "No snapshot found, starting with an empty store");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut records = Vec::new();
    for (line_num, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Business>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse snapshot line, skipping"
                );
            }
        }
    }
    info!(file = ?path, count = records.len(), "Snapshot loaded");
    Ok(records)
}

/// Writes all records to a temporary sibling file, then renames it over `path`.
pub async fn write(path: &Path, records: &[Business]) -> std::io::Result<()> {
    let mut contents = String::new();
    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;
        contents.push_str(&line);
        contents.push('\n');
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let tmp_path = path.with_extension("jsonl.tmp");
    fs::write(&tmp_path, contents).await?;
    fs::rename(&tmp_path, path).await?;
    info!(file = ?path, count = records.len(), "Snapshot written");
    Ok(())
}
