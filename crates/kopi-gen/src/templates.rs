//! Templates for the stored metadata and markup documents.

use minijinja::Environment;
use serde::Serialize;

use kopi_extract::ComponentRecord;

/// Body classes used when previewing a component locally.
pub const LOCAL_BODY_CLASS: &str = "min-h-screen bg-gray-100 p-8 flex items-center justify-center";

/// Body classes used for components published to the site repository.
pub const REMOTE_BODY_CLASS: &str = "min-h-screen bg-gray-100 p-8";

/// Provenance line appended to locally generated entries.
pub const LOCAL_PROVENANCE: &str =
    "This component was generated using Cloudflare AI for testing purposes.";

/// Provenance line appended to published entries.
pub const REMOTE_PROVENANCE: &str = "This component was automatically generated using Cloudflare AI.";

/// Context for the metadata document.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataContext<'a> {
    pub title: &'a str,
    /// ISO-8601 creation timestamp
    pub date: &'a str,
    pub categories: &'a [String],
    pub slug: &'a str,
    pub description: &'a str,
    /// Marks entries produced by the publishing pipeline
    pub generated: bool,
    pub provenance: &'a str,
}

/// Context for the markup document.
#[derive(Debug, Clone, Serialize)]
pub struct MarkupContext<'a> {
    pub title: &'a str,
    pub code: &'a str,
    pub body_class: &'a str,
}

/// Renders stored documents with minijinja.
pub struct DocumentTemplates {
    env: Environment<'static>,
}

impl DocumentTemplates {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);

        env.add_template_owned("index.mdx".to_string(), METADATA_TEMPLATE.to_string())
            .expect("Failed to add metadata template");

        env.add_template_owned("index.html".to_string(), MARKUP_TEMPLATE.to_string())
            .expect("Failed to add markup template");

        Self { env }
    }

    /// Render the front-matter document.
    pub fn render_metadata(&self, context: &MetadataContext<'_>) -> Result<String, minijinja::Error> {
        self.env.get_template("index.mdx")?.render(context)
    }

    /// Render the previewable HTML document for `record`.
    ///
    /// Code that is already a complete document is stored unchanged.
    pub fn render_markup(
        &self,
        record: &ComponentRecord,
        body_class: &str,
    ) -> Result<String, minijinja::Error> {
        if is_full_document(&record.code) {
            return Ok(record.code.clone());
        }

        self.env.get_template("index.html")?.render(MarkupContext {
            title: &record.title,
            code: &record.code,
            body_class,
        })
    }
}

impl Default for DocumentTemplates {
    fn default() -> Self {
        Self::new()
    }
}

fn is_full_document(code: &str) -> bool {
    let head: String = code.trim_start().chars().take(9).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

const METADATA_TEMPLATE: &str = r#"---
title: {{ title | tojson }}
date: {{ date }}
categories: {{ categories | tojson }}
language: "html"
slug: {{ slug | tojson }}
{%- if generated %}
generated: true
{%- endif %}
---

{{ description }}

{{ provenance }}
"#;

const MARKUP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="{{ body_class }}">
    {{ code | safe }}
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::read_front_matter;
    use pretty_assertions::assert_eq;

    fn record(code: &str) -> ComponentRecord {
        ComponentRecord {
            title: "Say \"Hi\" <Card>".to_string(),
            code: code.to_string(),
            categories: vec!["card".to_string(), "social media".to_string()],
            description: "Greets people.".to_string(),
        }
    }

    #[test]
    fn metadata_round_trips_through_yaml() {
        let record = record("<div></div>");
        let templates = DocumentTemplates::new();

        let doc = templates
            .render_metadata(&MetadataContext {
                title: &record.title,
                date: "2025-01-02T03:04:05.000Z",
                categories: &record.categories,
                slug: "say-hi-card",
                description: &record.description,
                generated: true,
                provenance: REMOTE_PROVENANCE,
            })
            .unwrap();

        let meta = read_front_matter(&doc).unwrap().unwrap();
        assert_eq!(meta.title, "Say \"Hi\" <Card>");
        assert_eq!(meta.categories, record.categories);
        assert_eq!(meta.slug.as_deref(), Some("say-hi-card"));
        assert_eq!(meta.language.as_deref(), Some("html"));
        assert!(meta.generated);
        assert!(doc.ends_with("Greets people.\n\nThis component was automatically generated using Cloudflare AI.\n"));
    }

    #[test]
    fn local_metadata_omits_generated_flag() {
        let record = record("<div></div>");

        let doc = DocumentTemplates::new()
            .render_metadata(&MetadataContext {
                title: &record.title,
                date: "2025-01-02T03:04:05.000Z",
                categories: &record.categories,
                slug: "x",
                description: &record.description,
                generated: false,
                provenance: LOCAL_PROVENANCE,
            })
            .unwrap();

        assert!(!doc.contains("generated: true"));
        assert!(doc.contains("language: \"html\"\nslug: \"x\"\n---\n"));
    }

    #[test]
    fn markup_wraps_code_unescaped() {
        let html = DocumentTemplates::new()
            .render_markup(&record("<button class=\"px-4\">Go</button>"), LOCAL_BODY_CLASS)
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Say &quot;Hi&quot; &lt;Card&gt;</title>"));
        assert!(html.contains("<body class=\"min-h-screen bg-gray-100 p-8 flex items-center justify-center\">"));
        assert!(html.contains("    <button class=\"px-4\">Go</button>\n</body>"));
    }

    #[test]
    fn full_documents_are_stored_as_is() {
        let code = "<!DOCTYPE html><html><body>x</body></html>";

        let html = DocumentTemplates::new()
            .render_markup(&record(code), REMOTE_BODY_CLASS)
            .unwrap();

        assert_eq!(html, code);
    }
}
