//! Screenshot capture command.

use std::path::Path;

use anyhow::Result;
use kopi_gen::{capture_all, find_components, ChromeRenderer};

use crate::config::load_config;

/// Run the screenshots command.
pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    let targets = find_components(&config.content.dir);
    if targets.is_empty() {
        tracing::info!(
            "No components found in {}",
            config.content.dir.display()
        );
        return Ok(());
    }

    tracing::info!("Capturing screenshots for {} components", targets.len());

    let renderer = ChromeRenderer::new(config.capture_settings());
    let report = capture_all(&renderer, &targets).await;

    tracing::info!(
        "Screenshots complete: {} captured, {} failed",
        report.captured,
        report.failed.len()
    );

    Ok(())
}
