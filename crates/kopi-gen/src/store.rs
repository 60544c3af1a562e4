//! Persisting generated components as content entries.
//!
//! Each entry is a directory named after the component slug:
//!
//! ```text
//! {slug}/
//!   index.mdx            front matter + description
//!   code/index.html      previewable document
//!   images/              screenshots
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, SecondsFormat, Utc};

use crate::generator::GeneratedComponent;
use crate::templates::{DocumentTemplates, MetadataContext, LOCAL_BODY_CLASS, LOCAL_PROVENANCE};

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written; `location` identifies the entry
    Saved { location: String },
    /// An entry with the same slug already existed
    Skipped,
}

/// Errors that can occur while storing a component.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot store '{0}': title produces an empty slug")]
    EmptySlug(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render document: {0}")]
    Template(#[from] minijinja::Error),

    #[error("GitHub API error {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A place generated components are saved to.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Whether an entry for `slug` already exists.
    async fn exists(&self, slug: &str) -> Result<bool, StoreError>;

    /// Save `component` unless an entry with its slug exists.
    async fn save(&self, component: &GeneratedComponent) -> Result<SaveOutcome, StoreError>;
}

/// Stored file locations for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentPaths {
    pub dir: PathBuf,
    pub metadata: PathBuf,
    pub markup: PathBuf,
    pub images: PathBuf,
    pub screenshot: PathBuf,
}

impl ComponentPaths {
    /// Layout for the entry at `dir`, whose last component is the slug.
    pub fn new(dir: PathBuf, slug: &str) -> Self {
        let images = dir.join("images");
        Self {
            metadata: dir.join("index.mdx"),
            markup: dir.join("code").join("index.html"),
            screenshot: images.join(screenshot_file_name(slug)),
            images,
            dir,
        }
    }
}

/// File name of the screenshot for `slug`.
pub fn screenshot_file_name(slug: &str) -> String {
    format!("tailwind-component-{}.png", slug)
}

/// ISO-8601 timestamp in UTC with millisecond precision.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stores entries on disk under `{content_dir}/{year}/{slug}`.
pub struct LocalStore {
    content_dir: PathBuf,
    year: i32,
    templates: DocumentTemplates,
}

impl LocalStore {
    /// Store under the current year.
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            year: Utc::now().year(),
            templates: DocumentTemplates::new(),
        }
    }

    /// Override the year directory.
    pub fn year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// File locations for `slug`.
    pub fn paths(&self, slug: &str) -> ComponentPaths {
        ComponentPaths::new(
            self.content_dir.join(self.year.to_string()).join(slug),
            slug,
        )
    }
}

async fn write_file(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, contents)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl Repository for LocalStore {
    async fn exists(&self, slug: &str) -> Result<bool, StoreError> {
        let path = self.paths(slug).metadata;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|source| StoreError::Io { path, source })
    }

    async fn save(&self, component: &GeneratedComponent) -> Result<SaveOutcome, StoreError> {
        let record = &component.record;
        if component.slug.is_empty() {
            return Err(StoreError::EmptySlug(record.title.clone()));
        }

        if self.exists(&component.slug).await? {
            tracing::info!("Component '{}' already exists, skipping", component.slug);
            return Ok(SaveOutcome::Skipped);
        }

        let paths = self.paths(&component.slug);
        let date = timestamp();

        let metadata = self.templates.render_metadata(&MetadataContext {
            title: &record.title,
            date: &date,
            categories: &record.categories,
            slug: &component.slug,
            description: &record.description,
            generated: false,
            provenance: LOCAL_PROVENANCE,
        })?;
        let markup = self.templates.render_markup(record, LOCAL_BODY_CLASS)?;

        write_file(&paths.markup, &markup).await?;
        tokio::fs::create_dir_all(&paths.images)
            .await
            .map_err(|source| StoreError::Io {
                path: paths.images.clone(),
                source,
            })?;
        // Metadata last: its presence marks the entry as complete.
        write_file(&paths.metadata, &metadata).await?;

        tracing::info!("Saved component: {}", paths.dir.display());

        Ok(SaveOutcome::Saved {
            location: paths.dir.display().to_string(),
        })
    }
}
