//! Crawler file generation command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use kopi_site::{ads_txt, robots_txt, SiteConfig};

use crate::config::load_config;

/// Run the site-files command.
pub async fn run(config_path: &Path, out: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    write_site_files(&config.site, out)?;
    tracing::info!("Site files written to {}", out.display());
    Ok(())
}

fn write_site_files(site: &SiteConfig, out: &Path) -> Result<()> {
    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    let robots = out.join("robots.txt");
    fs::write(&robots, robots_txt(site))
        .with_context(|| format!("Failed to write {}", robots.display()))?;
    tracing::info!("Created {}", robots.display());

    let ads = out.join("ads.txt");
    fs::write(&ads, ads_txt(site)).with_context(|| format!("Failed to write {}", ads.display()))?;
    tracing::info!("Created {}", ads.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_both_files() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("public");

        write_site_files(&SiteConfig::default(), &out).unwrap();

        let robots = fs::read_to_string(out.join("robots.txt")).unwrap();
        assert!(robots.contains("Sitemap: https://kopi.dev/sitemap.xml"));
        let ads = fs::read_to_string(out.join("ads.txt")).unwrap();
        assert!(ads.starts_with("google.com, pub-9343099184243971"));
    }
}
