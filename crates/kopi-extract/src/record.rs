//! Component records and their field defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::slug::slugify;

/// A UI component recovered from a model response.
///
/// Every record produced by the extractor has a non-empty title and code, at
/// least one category and a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Display title
    pub title: String,

    /// HTML markup for the component
    pub code: String,

    /// Ordered category tags
    pub categories: Vec<String>,

    /// Free-text description
    pub description: String,
}

impl ComponentRecord {
    /// URL slug derived from the title.
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

/// Fallback values substituted for fields a strategy could not recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefaults {
    pub title: &'static str,
    pub code: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

impl FieldDefaults {
    /// Defaults used when a complete object was found.
    pub const STANDARD: FieldDefaults = FieldDefaults {
        title: "Generated Component",
        code: r#"<div class="p-4">Generated content</div>"#,
        category: "widget",
        description: "Auto-generated component",
    };

    /// Defaults used when a truncated response was rebuilt field by field.
    pub const RECONSTRUCTED: FieldDefaults = FieldDefaults {
        title: "Generated Component",
        code: r#"<div class="p-6 bg-gradient-to-r from-blue-500 to-purple-600 text-white rounded-lg shadow-xl hover:shadow-2xl transition-all duration-300 transform hover:scale-105"><h2 class="text-2xl font-bold mb-2">Generated Component</h2><p class="opacity-90">Interactive component with modern design</p></div>"#,
        category: "widget",
        description: "Modern component with interactive features and responsive design",
    };
}

/// Fields a strategy managed to recover; `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub title: Option<String>,
    pub code: Option<String>,
    pub categories: Option<Vec<String>>,
    pub description: Option<String>,
}

impl PartialRecord {
    /// Read the four fields from a parsed JSON value.
    ///
    /// Returns `None` when the value is not an object. Blank strings and
    /// non-string category entries are treated as missing.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        let categories = match object.get("categories") {
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            ),
            Some(Value::String(single)) => Some(vec![single.clone()]),
            _ => None,
        };

        Some(Self {
            title: text("title"),
            code: text("code"),
            categories,
            description: text("description"),
        })
    }

    /// Fill missing fields from `defaults`.
    ///
    /// Returns the complete record and the names of the fields that were
    /// defaulted.
    pub fn into_record(self, defaults: &FieldDefaults) -> (ComponentRecord, Vec<&'static str>) {
        let mut defaulted = Vec::new();

        let title = non_blank(self.title).unwrap_or_else(|| {
            defaulted.push("title");
            defaults.title.to_string()
        });

        let code = non_blank(self.code).unwrap_or_else(|| {
            defaulted.push("code");
            defaults.code.to_string()
        });

        let categories: Vec<String> = self
            .categories
            .unwrap_or_default()
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect();
        let categories = if categories.is_empty() {
            defaulted.push("categories");
            vec![defaults.category.to_string()]
        } else {
            categories
        };

        let description = non_blank(self.description).unwrap_or_else(|| {
            defaulted.push("description");
            defaults.description.to_string()
        });

        (
            ComponentRecord {
                title,
                code,
                categories,
                description,
            },
            defaulted,
        )
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reads_fields_from_object() {
        let value = json!({
            "title": "Card",
            "code": "<div>Hi</div>",
            "categories": ["card", 3, "layout"],
            "description": "x"
        });

        let partial = PartialRecord::from_value(&value).unwrap();

        assert_eq!(partial.title.as_deref(), Some("Card"));
        assert_eq!(
            partial.categories,
            Some(vec!["card".to_string(), "layout".to_string()])
        );
    }

    #[test]
    fn rejects_non_objects() {
        assert!(PartialRecord::from_value(&json!(["title"])).is_none());
        assert!(PartialRecord::from_value(&json!("title")).is_none());
    }

    #[test]
    fn fills_every_missing_field() {
        let (record, defaulted) = PartialRecord::default().into_record(&FieldDefaults::STANDARD);

        assert_eq!(record.title, "Generated Component");
        assert_eq!(record.code, r#"<div class="p-4">Generated content</div>"#);
        assert_eq!(record.categories, vec!["widget".to_string()]);
        assert_eq!(record.description, "Auto-generated component");
        assert_eq!(defaulted, vec!["title", "code", "categories", "description"]);
    }

    #[test]
    fn blank_values_count_as_missing() {
        let partial = PartialRecord {
            title: Some("   ".to_string()),
            code: Some("<p>ok</p>".to_string()),
            categories: Some(vec![" ".to_string()]),
            description: Some(String::new()),
        };

        let (record, defaulted) = partial.into_record(&FieldDefaults::STANDARD);

        assert_eq!(record.code, "<p>ok</p>");
        assert_eq!(defaulted, vec!["title", "categories", "description"]);
    }

    #[test]
    fn present_values_are_kept_verbatim() {
        let value = json!({
            "title": " Card ",
            "code": "<div>Hi</div>",
            "categories": [" card ", "  "],
            "description": "x "
        });

        let (record, defaulted) = PartialRecord::from_value(&value)
            .unwrap()
            .into_record(&FieldDefaults::STANDARD);

        assert_eq!(record.title, " Card ");
        assert_eq!(record.categories, vec![" card ".to_string()]);
        assert_eq!(record.description, "x ");
        assert!(defaulted.is_empty());
    }

    #[test]
    fn record_slug_follows_title() {
        let record = ComponentRecord {
            title: "Pricing Table".to_string(),
            code: "<table></table>".to_string(),
            categories: vec!["pricing".to_string()],
            description: "Plans".to_string(),
        };

        assert_eq!(record.slug(), "pricing-table");
    }
}
