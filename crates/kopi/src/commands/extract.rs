//! Diagnostic extraction of a saved model response.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use kopi_extract::ResponseExtractor;
use serde_json::json;

/// Run the extract command.
pub async fn run(file: &Path) -> Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!("{}", render(&raw)?);

    Ok(())
}

/// Extract a record from `raw` and describe it as pretty-printed JSON.
fn render(raw: &str) -> Result<String> {
    let extraction = ResponseExtractor::new().extract(raw)?;
    let slug = extraction.record.slug();

    let report = json!({
        "record": extraction.record,
        "slug": slug,
        "tier": extraction.tier,
        "defaulted": extraction.defaulted,
    });

    Ok(serde_json::to_string_pretty(&report)?)
}
