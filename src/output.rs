use crate::error::{InsightsError, Result};
use crate::report::render_table;
use crate::types::RunSummary;
use std::path::Path;
use tabled::Tabled;
use tracing::info;

/// Write the rendered report, replacing any previous one.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| InsightsError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = content.len(), "insights saved");
    Ok(())
}

pub fn summary_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(|e| InsightsError::Format {
        section: "run summary",
        reason: e.to_string(),
    })
}

/// Print the first `max_rows` rows of a report table to stdout.
pub fn preview_table_rows<T: Tabled>(rows: &[T], max_rows: usize) {
    let slice = &rows[..rows.len().min(max_rows)];
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_table(slice));
}
