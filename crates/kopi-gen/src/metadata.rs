//! Reading stored metadata documents back.

use serde::Deserialize;

/// Front matter of a stored component entry.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ComponentMeta {
    /// Component title (required)
    pub title: String,

    /// Creation timestamp as written
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub categories: Vec<String>,

    /// Markup language of the code document
    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub slug: Option<String>,

    /// Set on entries produced by the publishing pipeline
    #[serde(default)]
    pub generated: bool,
}

/// Parse the front-matter block at the start of `source`.
///
/// Returns `Ok(None)` when the document has no front matter.
pub fn read_front_matter(source: &str) -> Result<Option<ComponentMeta>, MetadataError> {
    let trimmed = source.trim_start();

    let Some(after_open) = trimmed.strip_prefix("---") else {
        return Ok(None);
    };

    let Some(close_pos) = after_open.find("\n---") else {
        return Err(MetadataError::Unclosed);
    };

    let yaml = after_open[..close_pos].trim();
    let meta: ComponentMeta =
        serde_yaml::from_str(yaml).map_err(|e| MetadataError::InvalidYaml(e.to_string()))?;

    Ok(Some(meta))
}

/// Errors that can occur when reading front matter.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Unclosed front matter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in front matter: {0}")]
    InvalidYaml(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_stored_entry() {
        let source = r#"---
title: "Glass Login Form"
date: 2025-03-01T10:00:00.000Z
categories: ["form","glass morphism"]
language: "html"
slug: "glass-login-form"
---

A login form.
"#;

        let meta = read_front_matter(source).unwrap().unwrap();

        assert_eq!(meta.title, "Glass Login Form");
        assert_eq!(meta.date.as_deref(), Some("2025-03-01T10:00:00.000Z"));
        assert_eq!(meta.categories, vec!["form", "glass morphism"]);
        assert_eq!(meta.slug.as_deref(), Some("glass-login-form"));
        assert!(!meta.generated);
    }

    #[test]
    fn missing_front_matter_is_none() {
        assert_eq!(read_front_matter("# Just text").unwrap(), None);
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let result = read_front_matter("---\ntitle: x\n");

        assert!(matches!(result, Err(MetadataError::Unclosed)));
    }

    #[test]
    fn missing_title_is_invalid() {
        let result = read_front_matter("---\nslug: x\n---\n");

        assert!(matches!(result, Err(MetadataError::InvalidYaml(_))));
    }
}
