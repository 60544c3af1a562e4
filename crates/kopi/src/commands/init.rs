//! Initialize kopi in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing kopi...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    tracing::info!(
        "Set {} and {} (and {} for --github) in the environment or .env.",
        crate::config::ACCOUNT_ID_VAR,
        crate::config::API_TOKEN_VAR,
        crate::config::GITHUB_TOKEN_VAR
    );
    tracing::info!("Run 'kopi generate' to create your first components.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Kopi Configuration

[ai]
# Workers AI model
model = "@cf/meta/llama-3.1-70b-instruct"

# Pause after each successful request (ms)
request_delay_ms = 2000

[content]
# Root of stored component entries ({dir}/{year}/{slug})
dir = "src/content/tailwind-components"

[generation]
# Components per run
count = 2

# Enhance markup modified within this many minutes
enhance_minutes = 5

[screenshots]
enabled = true

# Chrome or Chromium executable
browser = "chromium"

width = 1920
height = 1080
max_height = 3000

# Time allowed for scripts and fonts to settle (ms)
settle_ms = 4000

[github]
owner = "arryanggaputra"
repo = "kopidev-astro"
base_path = "src/content/tailwind-components/auto-generated"
# branch = "main"

[site]
title = "Kopidev"
url = "https://kopi.dev"
dev_host = "localhost"
dev_port = 4321
ad_publisher_id = "pub-9343099184243971"
"#;
