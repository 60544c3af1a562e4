//! Publishing entries to the site repository through the GitHub contents API.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use crate::generator::GeneratedComponent;
use crate::store::{timestamp, Repository, SaveOutcome, StoreError};
use crate::templates::{
    DocumentTemplates, MetadataContext, REMOTE_BODY_CLASS, REMOTE_PROVENANCE,
};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_OWNER: &str = "arryanggaputra";
pub const DEFAULT_REPO: &str = "kopidev-astro";
pub const DEFAULT_BASE_PATH: &str = "src/content/tailwind-components/auto-generated";

/// Target repository for [`GithubStore`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Personal access token with contents write access
    pub token: String,

    pub owner: String,

    pub repo: String,

    /// Branch to commit to; the repository default when unset
    pub branch: Option<String>,

    /// Directory inside the repository holding generated entries
    pub base_path: String,

    /// API base URL
    pub api_base: String,
}

impl GithubConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            branch: None,
            base_path: DEFAULT_BASE_PATH.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

/// Commits entries as `{base_path}/{slug}/index.mdx` and
/// `{base_path}/{slug}/code/index.html`.
pub struct GithubStore {
    config: GithubConfig,
    http: reqwest::Client,
    templates: DocumentTemplates,
}

impl GithubStore {
    pub fn new(config: GithubConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            templates: DocumentTemplates::new(),
        }
    }

    fn entry_path(&self, slug: &str) -> String {
        format!("{}/{}", self.config.base_path.trim_end_matches('/'), slug)
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            path
        )
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.contents_url(path))
            .bearer_auth(&self.config.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, "kopi")
    }

    async fn put_file(&self, path: &str, message: &str, contents: &str) -> Result<(), StoreError> {
        let body = PutContents {
            message,
            content: STANDARD.encode(contents.as_bytes()),
            branch: self.config.branch.as_deref(),
        };

        let response = self
            .request(reqwest::Method::PUT, path)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Repository for GithubStore {
    async fn exists(&self, slug: &str) -> Result<bool, StoreError> {
        let path = format!("{}/index.mdx", self.entry_path(slug));
        let mut request = self.request(reqwest::Method::GET, &path);
        if let Some(branch) = &self.config.branch {
            request = request.query(&[("ref", branch)]);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(true)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(StoreError::Remote {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn save(&self, component: &GeneratedComponent) -> Result<SaveOutcome, StoreError> {
        let record = &component.record;
        if component.slug.is_empty() {
            return Err(StoreError::EmptySlug(record.title.clone()));
        }

        if self.exists(&component.slug).await? {
            tracing::info!("Component '{}' already exists in repository, skipping", component.slug);
            return Ok(SaveOutcome::Skipped);
        }

        let date = timestamp();
        let metadata = self.templates.render_metadata(&MetadataContext {
            title: &record.title,
            date: &date,
            categories: &record.categories,
            slug: &component.slug,
            description: &record.description,
            generated: true,
            provenance: REMOTE_PROVENANCE,
        })?;
        let markup = self.templates.render_markup(record, REMOTE_BODY_CLASS)?;

        let entry = self.entry_path(&component.slug);
        self.put_file(
            &format!("{}/index.mdx", entry),
            &format!("Add auto-generated component: {}", record.title),
            &metadata,
        )
        .await?;
        self.put_file(
            &format!("{}/code/index.html", entry),
            &format!("Add HTML code for: {}", record.title),
            &markup,
        )
        .await?;

        tracing::info!("Published component: {}", entry);

        Ok(SaveOutcome::Saved {
            location: format!("{}/{}/{}", self.config.owner, self.config.repo, entry),
        })
    }
}
