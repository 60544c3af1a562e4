//! Component enhancement command.

use std::path::Path;

use anyhow::Result;
use kopi_gen::ComponentEnhancer;

use crate::config::load_config;

/// Run the enhance command.
pub async fn run(config_path: &Path, minutes: Option<u64>) -> Result<()> {
    let config = load_config(config_path)?;
    let window = config.enhance_window(minutes);

    tracing::info!(
        "Enhancing components modified in the last {} minutes",
        window.as_secs() / 60
    );

    let enhanced = ComponentEnhancer::new().enhance_recent(&config.content.dir, window);

    tracing::info!("Enhanced {} components", enhanced);

    Ok(())
}
