//! Configuration file (kopi.toml) and credentials.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use kopi_gen::{client, github, CaptureSettings, GithubConfig, WorkersAiConfig};
use kopi_site::SiteConfig;
use serde::Deserialize;

pub const ACCOUNT_ID_VAR: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const API_TOKEN_VAR: &str = "CLOUDFLARE_API_TOKEN";
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Configuration file structure (kopi.toml).
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub ai: AiSection,
    #[serde(default)]
    pub content: ContentSection,
    #[serde(default)]
    pub generation: GenerationSection,
    #[serde(default)]
    pub screenshots: ScreenshotSection,
    #[serde(default)]
    pub github: GithubSection,
    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct AiSection {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    /// Pause after each successful request, in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ContentSection {
    /// Root directory of stored component entries
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct GenerationSection {
    #[serde(default = "default_count")]
    pub count: usize,
    /// Files modified within this many minutes get enhanced
    #[serde(default = "default_enhance_minutes")]
    pub enhance_minutes: u64,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ScreenshotSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_browser")]
    pub browser: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct GithubSection {
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    pub branch: Option<String>,
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

fn default_model() -> String {
    client::DEFAULT_MODEL.to_string()
}
fn default_ai_base_url() -> String {
    client::DEFAULT_BASE_URL.to_string()
}
fn default_request_delay_ms() -> u64 {
    2000
}
fn default_content_dir() -> PathBuf {
    PathBuf::from("src/content/tailwind-components")
}
fn default_count() -> usize {
    2
}
fn default_enhance_minutes() -> u64 {
    5
}
fn default_true() -> bool {
    true
}
fn default_browser() -> String {
    CaptureSettings::default().browser
}
fn default_width() -> u32 {
    CaptureSettings::default().width
}
fn default_height() -> u32 {
    CaptureSettings::default().height
}
fn default_max_height() -> u32 {
    CaptureSettings::default().max_height
}
fn default_settle_ms() -> u64 {
    CaptureSettings::default().settle.as_millis() as u64
}
fn default_owner() -> String {
    github::DEFAULT_OWNER.to_string()
}
fn default_repo() -> String {
    github::DEFAULT_REPO.to_string()
}
fn default_base_path() -> String {
    github::DEFAULT_BASE_PATH.to_string()
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_ai_base_url(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
        }
    }
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            count: default_count(),
            enhance_minutes: default_enhance_minutes(),
        }
    }
}

impl Default for ScreenshotSection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            browser: default_browser(),
            width: default_width(),
            height: default_height(),
            max_height: default_max_height(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            repo: default_repo(),
            branch: None,
            base_path: default_base_path(),
        }
    }
}

impl ConfigFile {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.ai.request_delay_ms)
    }

    pub fn enhance_window(&self, minutes: Option<u64>) -> Duration {
        Duration::from_secs(minutes.unwrap_or(self.generation.enhance_minutes) * 60)
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            browser: self.screenshots.browser.clone(),
            width: self.screenshots.width,
            height: self.screenshots.height,
            max_height: self.screenshots.max_height,
            settle: Duration::from_millis(self.screenshots.settle_ms),
        }
    }

    /// Workers AI settings with credentials from the environment.
    pub fn workers_ai(&self) -> Result<WorkersAiConfig> {
        Ok(
            WorkersAiConfig::new(require_env(ACCOUNT_ID_VAR)?, require_env(API_TOKEN_VAR)?)
                .model(&self.ai.model)
                .base_url(&self.ai.base_url),
        )
    }

    /// GitHub target with the token from the environment.
    pub fn github(&self) -> Result<GithubConfig> {
        Ok(GithubConfig {
            owner: self.github.owner.clone(),
            repo: self.github.repo.clone(),
            branch: self.github.branch.clone(),
            base_path: self.github.base_path.clone(),
            ..GithubConfig::new(require_env(GITHUB_TOKEN_VAR)?)
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{} is not set (add it to the environment or .env)", name))
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();

        let config = load_config(&temp.path().join("kopi.toml")).unwrap();

        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.generation.count, 2);
        assert_eq!(config.capture_settings().width, 1920);
        assert_eq!(config.request_delay(), Duration::from_secs(2));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kopi.toml");
        fs::write(
            &path,
            r#"
[content]
dir = "content"

[screenshots]
browser = "google-chrome"

[github]
branch = "main"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.content.dir, PathBuf::from("content"));
        assert_eq!(config.screenshots.browser, "google-chrome");
        assert_eq!(config.screenshots.max_height, 3000);
        assert_eq!(config.github.branch.as_deref(), Some("main"));
        assert_eq!(config.github.repo, "kopidev-astro");
        assert_eq!(config.ai.model, "@cf/meta/llama-3.1-70b-instruct");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kopi.toml");
        fs::write(&path, "[generation\ncount = ").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn enhance_window_prefers_override() {
        let config = ConfigFile::default();

        assert_eq!(config.enhance_window(None), Duration::from_secs(300));
        assert_eq!(config.enhance_window(Some(1)), Duration::from_secs(60));
    }
}
