//! Recovery strategies, tried in order until one yields a record.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::candidate::{normalize, Candidate};
use crate::fields::{scan_object, scan_truncated};
use crate::record::{FieldDefaults, PartialRecord};

/// Which strategy produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionTier {
    /// The object parsed as JSON
    Direct,
    /// The object was malformed; fields were matched one by one
    Manual,
    /// The object never closed; fields were rebuilt from fragments
    Reconstructed,
}

impl fmt::Display for ExtractionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Direct => "direct",
            Self::Manual => "manual",
            Self::Reconstructed => "reconstructed",
        };
        f.write_str(name)
    }
}

/// One step of the fallback chain.
pub trait RecoveryStrategy: Send + Sync {
    /// Tier reported when this strategy succeeds.
    fn tier(&self) -> ExtractionTier;

    /// Defaults applied to fields this strategy leaves empty.
    fn defaults(&self) -> &FieldDefaults {
        &FieldDefaults::STANDARD
    }

    /// Attempt recovery. `None` passes the candidate to the next strategy.
    fn recover(&self, candidate: &Candidate<'_>) -> Option<PartialRecord>;
}

/// Parse the object span as JSON, first as-is and then normalized.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectParse;

impl RecoveryStrategy for DirectParse {
    fn tier(&self) -> ExtractionTier {
        ExtractionTier::Direct
    }

    fn recover(&self, candidate: &Candidate<'_>) -> Option<PartialRecord> {
        let object = candidate.object.as_deref()?;

        let value = serde_json::from_str::<Value>(object)
            .or_else(|_| serde_json::from_str::<Value>(&normalize(object)));

        match value {
            Ok(value) => PartialRecord::from_value(&value),
            Err(e) => {
                tracing::debug!("JSON parse failed, trying manual extraction: {}", e);
                None
            }
        }
    }
}

/// Match each field by pattern inside a complete but malformed object.
///
/// Always succeeds once an object span exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualFields;

impl RecoveryStrategy for ManualFields {
    fn tier(&self) -> ExtractionTier {
        ExtractionTier::Manual
    }

    fn recover(&self, candidate: &Candidate<'_>) -> Option<PartialRecord> {
        candidate.object.as_deref().map(scan_object)
    }
}

/// Rebuild a record from output that was cut off mid-object.
///
/// Only applies when no object span closed and the text still carries a
/// `"title"` or `"code"` key. Fails without a title and non-empty code.
#[derive(Debug, Default, Clone, Copy)]
pub struct TruncationRebuild;

impl RecoveryStrategy for TruncationRebuild {
    fn tier(&self) -> ExtractionTier {
        ExtractionTier::Reconstructed
    }

    fn defaults(&self) -> &FieldDefaults {
        &FieldDefaults::RECONSTRUCTED
    }

    fn recover(&self, candidate: &Candidate<'_>) -> Option<PartialRecord> {
        if candidate.object.is_some() {
            return None;
        }
        if !candidate.text.contains("\"title\"") && !candidate.text.contains("\"code\"") {
            return None;
        }

        tracing::info!("Attempting to reconstruct truncated JSON");

        let partial = scan_truncated(&candidate.text, candidate.raw);
        if partial.title.is_none() || partial.code.is_none() {
            tracing::warn!("Truncated response is missing a title or code");
            return None;
        }

        tracing::warn!("Reconstructed component from truncated response");
        Some(partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn direct_parse_needs_an_object() {
        let candidate = Candidate::prepare("no object here");

        assert_eq!(DirectParse.recover(&candidate), None);
        assert_eq!(ManualFields.recover(&candidate), None);
    }

    #[test]
    fn direct_parse_retries_normalized() {
        // Literal newlines inside strings are invalid JSON until normalized.
        let candidate = Candidate::prepare("{\"title\": \"A\", \"code\": \"<p>\n</p>\"}");

        let partial = DirectParse.recover(&candidate).unwrap();

        assert_eq!(partial.code.as_deref(), Some("<p> </p>"));
    }

    #[test]
    fn direct_parse_rejects_malformed_objects() {
        let candidate = Candidate::prepare(r#"{"title": "A", "code": "<p class="x">"}"#);

        assert_eq!(DirectParse.recover(&candidate), None);
        assert!(ManualFields.recover(&candidate).is_some());
    }

    #[test]
    fn rebuild_skips_closed_objects() {
        let candidate = Candidate::prepare(r#"{"title": "A"}"#);

        assert_eq!(TruncationRebuild.recover(&candidate), None);
    }

    #[test]
    fn rebuild_requires_title_and_code() {
        let candidate = Candidate::prepare(r#"{"code": "<div>cut"#);

        assert_eq!(TruncationRebuild.recover(&candidate), None);
    }

    #[test]
    fn tiers_display_lowercase() {
        assert_eq!(ExtractionTier::Reconstructed.to_string(), "reconstructed");
    }
}
