//! Screenshots of stored component documents.
//!
//! Rendering goes through a [`Renderer`]; [`ChromeRenderer`] drives a
//! headless Chrome or Chromium binary.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use walkdir::WalkDir;

use crate::metadata::read_front_matter;
use crate::store::ComponentPaths;

/// Errors that can occur while capturing a screenshot.
#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("Failed to launch browser {browser}: {message}")]
    Launch { browser: String, message: String },

    #[error("Browser failed to capture {path}: {stderr}")]
    Failed { path: PathBuf, stderr: String },

    #[error("Browser exited without writing {0}")]
    Missing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders an HTML document to a PNG image.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn capture(&self, html: &Path, image: &Path) -> Result<(), ScreenshotError>;
}

/// Viewport and timing for [`ChromeRenderer`].
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Browser executable name or path
    pub browser: String,

    /// Viewport width in pixels
    pub width: u32,

    /// Viewport height in pixels
    pub height: u32,

    /// Upper bound on the captured height
    pub max_height: u32,

    /// Time allowed for scripts, fonts and styles to settle
    pub settle: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            browser: "chromium".to_string(),
            width: 1920,
            height: 1080,
            max_height: 3000,
            settle: Duration::from_millis(4000),
        }
    }
}

/// Room left below measured content, in pixels.
const CONTENT_MARGIN: u32 = 100;

/// Instrumented copy written next to the document so relative assets resolve.
const MEASURE_FILE: &str = ".measure.html";

const MEASURE_SCRIPT: &str = r#"<script>window.addEventListener("load", function () { var root = document.body || document.documentElement; document.documentElement.setAttribute("data-kopi-height", String(root.scrollHeight)); });</script>"#;

static MEASURED_HEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-kopi-height="(\d+)""#).expect("Invalid measured height regex")
});

/// Captures screenshots with a headless Chrome or Chromium process.
///
/// Each capture loads the document twice: once to measure the rendered
/// content height, then to take the screenshot with the window sized to it.
pub struct ChromeRenderer {
    settings: CaptureSettings,
}

impl ChromeRenderer {
    pub fn new(settings: CaptureSettings) -> Self {
        Self { settings }
    }

    /// Window height for a page whose content is `content` pixels tall.
    ///
    /// Content taller than the viewport grows the window by a margin, up to
    /// `max_height`. Unknown or shorter content keeps the viewport height.
    pub fn capture_height(&self, content: Option<u32>) -> u32 {
        let viewport = self.settings.height.min(self.settings.max_height);
        match content {
            Some(total) if total > viewport => total
                .saturating_add(CONTENT_MARGIN)
                .min(self.settings.max_height),
            _ => viewport,
        }
    }

    fn browser_args(&self, height: u32) -> Vec<String> {
        vec![
            "--headless=new".to_string(),
            "--no-sandbox".to_string(),
            "--disable-gpu".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--hide-scrollbars".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!("--window-size={},{}", self.settings.width, height),
            format!("--virtual-time-budget={}", self.settings.settle.as_millis()),
        ]
    }

    fn measure_args(&self, html: &Path) -> Vec<String> {
        let mut args = self.browser_args(self.settings.height.min(self.settings.max_height));
        args.push("--dump-dom".to_string());
        args.push(format!("file://{}", html.display()));
        args
    }

    fn args(&self, html: &Path, image: &Path, height: u32) -> Vec<String> {
        let mut args = self.browser_args(height);
        args.push(format!("--screenshot={}", image.display()));
        args.push(format!("file://{}", html.display()));
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<Output, ScreenshotError> {
        tokio::process::Command::new(&self.settings.browser)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ScreenshotError::Launch {
                browser: self.settings.browser.clone(),
                message: e.to_string(),
            })
    }

    /// Rendered content height of `html`, if the browser reported one.
    async fn measure(&self, html: &Path) -> Result<Option<u32>, ScreenshotError> {
        let source = tokio::fs::read_to_string(html).await?;
        let instrumented = html.with_file_name(MEASURE_FILE);
        tokio::fs::write(&instrumented, instrument(&source)).await?;

        let output = self.run(self.measure_args(&instrumented)).await;
        if let Err(e) = tokio::fs::remove_file(&instrumented).await {
            tracing::warn!("Failed to remove {}: {}", instrumented.display(), e);
        }
        let output = output?;

        if !output.status.success() {
            tracing::debug!("Measuring {} failed; using viewport height", html.display());
            return Ok(None);
        }
        Ok(measured_height(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn instrument(source: &str) -> String {
    match source.rfind("</body>") {
        Some(at) => format!("{}{}{}", &source[..at], MEASURE_SCRIPT, &source[at..]),
        None => format!("{}{}", source, MEASURE_SCRIPT),
    }
}

fn measured_height(dom: &str) -> Option<u32> {
    MEASURED_HEIGHT_RE
        .captures(dom)
        .and_then(|caps| caps[1].parse().ok())
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn capture(&self, html: &Path, image: &Path) -> Result<(), ScreenshotError> {
        let html = tokio::fs::canonicalize(html).await?;
        if let Some(parent) = image.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let image = std::path::absolute(image)?;

        let height = self.capture_height(self.measure(&html).await?);
        tracing::debug!(
            "Capturing {} at {}x{}",
            html.display(),
            self.settings.width,
            height
        );

        let output = self.run(self.args(&html, &image, height)).await?;

        if !output.status.success() {
            return Err(ScreenshotError::Failed {
                path: html,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !tokio::fs::try_exists(&image).await? {
            return Err(ScreenshotError::Missing(image));
        }

        Ok(())
    }
}

/// A stored entry to capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTarget {
    pub slug: String,
    pub title: String,
    pub html: PathBuf,
    pub image: PathBuf,
}

impl ComponentTarget {
    /// Target for an entry at `paths`.
    pub fn new(slug: &str, title: &str, paths: &ComponentPaths) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            html: paths.markup.clone(),
            image: paths.screenshot.clone(),
        }
    }
}

/// Find every stored entry under `content_dir` that has a markup document.
///
/// Titles come from the entry's front matter; entries without readable
/// front matter fall back to the slug with hyphens replaced by spaces.
pub fn find_components(content_dir: &Path) -> Vec<ComponentTarget> {
    let mut targets: Vec<ComponentTarget> = WalkDir::new(content_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "index.html")
        .filter_map(|e| {
            let code_dir = e.path().parent()?;
            if code_dir.file_name()? != "code" {
                return None;
            }
            let entry_dir = code_dir.parent()?;
            let slug = entry_dir.file_name()?.to_str()?.to_string();
            let title = entry_title(entry_dir, &slug);
            let paths = ComponentPaths::new(entry_dir.to_path_buf(), &slug);
            Some(ComponentTarget::new(&slug, &title, &paths))
        })
        .collect();

    targets.sort_by(|a, b| a.html.cmp(&b.html));
    targets
}

fn entry_title(entry_dir: &Path, slug: &str) -> String {
    let metadata = entry_dir.join("index.mdx");
    match std::fs::read_to_string(&metadata).map(|source| read_front_matter(&source)) {
        Ok(Ok(Some(meta))) => meta.title,
        Ok(Err(e)) => {
            tracing::warn!("Invalid front matter in {}: {}", metadata.display(), e);
            slug.replace('-', " ")
        }
        _ => slug.replace('-', " "),
    }
}

/// Outcome of a screenshot batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub captured: usize,
    /// Slug and error message for each failed capture
    pub failed: Vec<(String, String)>,
}

/// Capture every target in order.
///
/// A failed capture is logged and recorded; the batch continues. A browser
/// that cannot be launched ends the batch.
pub async fn capture_all(renderer: &dyn Renderer, targets: &[ComponentTarget]) -> BatchReport {
    let mut report = BatchReport::default();

    for target in targets {
        tracing::info!("Capturing screenshot for {}", target.title);
        match renderer.capture(&target.html, &target.image).await {
            Ok(()) => {
                tracing::info!("Screenshot saved: {}", target.image.display());
                report.captured += 1;
            }
            Err(e @ ScreenshotError::Launch { .. }) => {
                tracing::warn!("{}; skipping remaining screenshots", e);
                report.failed.push((target.slug.clone(), e.to_string()));
                break;
            }
            Err(e) => {
                tracing::error!("Failed to capture {}: {}", target.slug, e);
                report.failed.push((target.slug.clone(), e.to_string()));
            }
        }
    }

    report
}
