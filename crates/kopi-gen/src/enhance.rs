//! Styling pass applied to freshly generated markup documents.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};

use rayon::prelude::*;
use regex::Regex;
use walkdir::WalkDir;

/// Files modified within this window count as fresh.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);

struct Rule {
    pattern: Regex,
    replacement: &'static str,
    description: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str, description: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("Invalid enhancement regex"),
            replacement,
            description,
        }
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            r#"(<div[^>]*class="[^"]*)(">)"#,
            "$1 hover:shadow-lg transition-all duration-300$2",
            "hover effects and transitions",
        ),
        Rule::new(
            r#"(<button[^>]*class="[^"]*)(">)"#,
            "$1 transform hover:scale-105 active:scale-95 transition-all duration-200$2",
            "interactive button effects",
        ),
        Rule::new(
            r"(bg-)(blue|green|purple|red|yellow)(-500)",
            "bg-gradient-to-r from-$2-400 to-$2-600",
            "gradients for solid colors",
        ),
        Rule::new(
            r#"(<div[^>]*class="[^"]*p-4[^"]*)(">)"#,
            "$1 rounded-xl shadow-lg border border-gray-200$2",
            "container styling",
        ),
    ]
});

const ANIMATION_CSS: &str = r#"
    <style>
      @keyframes float {
        0%, 100% { transform: translateY(0px); }
        50% { transform: translateY(-10px); }
      }
      .animate-float { animation: float 6s ease-in-out infinite; }

      @keyframes pulse-glow {
        0%, 100% { box-shadow: 0 0 5px rgba(59, 130, 246, 0.5); }
        50% { box-shadow: 0 0 20px rgba(59, 130, 246, 0.8); }
      }
      .animate-pulse-glow { animation: pulse-glow 2s ease-in-out infinite; }

      .glass-effect {
        background: rgba(255, 255, 255, 0.1);
        backdrop-filter: blur(10px);
        border: 1px solid rgba(255, 255, 255, 0.2);
      }
    </style>"#;

const FONT_LINKS: &str = r#"<link rel="preconnect" href="https://fonts.googleapis.com">
      <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
      <link href="https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap" rel="stylesheet">"#;

const BODY_FONT: &str = r#"<body style="font-family: 'Inter', sans-serif;""#;

/// Marker left by a previous pass.
const ENHANCED_MARKER: &str = "@keyframes pulse-glow";

/// Rewrites component markup with richer Tailwind styling.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentEnhancer;

impl ComponentEnhancer {
    pub fn new() -> Self {
        Self
    }

    /// Whether `html` has already been through [`enhance`](Self::enhance).
    pub fn is_enhanced(&self, html: &str) -> bool {
        html.contains(ENHANCED_MARKER)
    }

    /// Apply the styling rules, animation styles and font links to `html`.
    pub fn enhance(&self, html: &str) -> String {
        let mut enhanced = html.to_string();

        for rule in RULES.iter() {
            let replaced = rule.pattern.replace_all(&enhanced, rule.replacement);
            if let std::borrow::Cow::Owned(replaced) = replaced {
                tracing::debug!("Applied {}", rule.description);
                enhanced = replaced;
            }
        }

        if enhanced.contains("</head>") {
            enhanced = enhanced.replacen("</head>", &format!("{}</head>", ANIMATION_CSS), 1);
        } else {
            // No head section; the styles still carry the marker
            let at = enhanced.find("<body").unwrap_or(0);
            enhanced.insert_str(at, ANIMATION_CSS);
        }

        if !enhanced.contains("fonts.googleapis.com") {
            enhanced = enhanced.replacen("</head>", &format!("{}</head>", FONT_LINKS), 1);
            enhanced = enhanced.replacen("<body", BODY_FONT, 1);
        }

        enhanced
    }

    /// Enhance every `code/index.html` under `content_dir` modified within
    /// `window`. Returns the number of files rewritten.
    ///
    /// Files already enhanced are left alone. Unreadable or unwritable files
    /// are logged and skipped.
    pub fn enhance_recent(&self, content_dir: &Path, window: Duration) -> usize {
        if !content_dir.exists() {
            tracing::warn!("Components directory not found: {}", content_dir.display());
            return 0;
        }

        let now = SystemTime::now();
        let fresh: Vec<PathBuf> = WalkDir::new(content_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file()
                    && e.file_name() == "index.html"
                    && e.path().parent().and_then(Path::file_name) == Some(OsStr::new("code"))
            })
            .filter(|e| {
                e.metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .and_then(|modified| now.duration_since(modified).ok())
                    .is_some_and(|age| age <= window)
            })
            .map(|e| e.into_path())
            .collect();

        fresh
            .par_iter()
            .filter(|path| match self.enhance_file(path) {
                Ok(changed) => changed,
                Err(e) => {
                    tracing::warn!("Failed to enhance {}: {}", path.display(), e);
                    false
                }
            })
            .count()
    }

    fn enhance_file(&self, path: &Path) -> std::io::Result<bool> {
        let html = std::fs::read_to_string(path)?;
        if self.is_enhanced(&html) {
            return Ok(false);
        }

        std::fs::write(path, self.enhance(&html))?;
        tracing::info!("Enhanced: {}", path.display());
        Ok(true)
    }
}
